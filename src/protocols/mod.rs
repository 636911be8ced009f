// SPDX-License-Identifier: GPL-3.0-only
//! Display control protocols
//!
//! Each vendor protocol gets its own driver implementing [`DisplayProtocol`],
//! so a host can treat every supported display the same way. Drivers talk to
//! the device through a [`transport::Transport`].

pub mod planar;
pub mod transport;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::display::{DisplayEvent, DisplayState, EventHandler, InputSource, SubscriptionId};
use crate::error::Result;

/// Common capability contract for all display drivers
///
/// Setters only send a command. The matching getter changes later, when the
/// device reports the new value, and a change notification is raised then.
pub trait DisplayProtocol: std::fmt::Debug + Send + Sync {
    /// Get the unique identifier for this display
    fn id(&self) -> String;

    /// Get the human-readable model name
    fn name(&self) -> String;

    fn power(&self) -> bool;
    fn set_power(&self, on: bool) -> Result<()>;

    /// Volume on the 0..=65535 scale
    fn volume(&self) -> u16;
    fn set_volume(&self, level: u16) -> Result<()>;

    fn input(&self) -> InputSource;
    /// Fails with `UnsupportedInput` before sending if the model lacks `input`
    fn set_input(&self, input: InputSource) -> Result<()>;

    fn supports_quad(&self) -> bool;
    fn quad_display(&self) -> bool;
    /// Fails with `UnsupportedCapability` before sending on single-view models
    fn set_quad_display(&self, on: bool) -> Result<()>;

    fn address(&self) -> String;
    /// Takes effect on the next connect
    fn set_address(&self, address: &str);

    /// Open the connection; completion is signalled by a `Connected` event
    fn connect(&self) -> Result<()>;
    fn disconnect(&self);
    fn is_connected(&self) -> bool;

    /// Snapshot of the believed state
    fn state(&self) -> DisplayState;

    fn subscribe(&self, handler: EventHandler) -> SubscriptionId;
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// Receive notifications through a channel instead of a callback
    ///
    /// The subscription ends on its own once the receiver is dropped.
    fn events(&self) -> (SubscriptionId, UnboundedReceiver<DisplayEvent>);
}
