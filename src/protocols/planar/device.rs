// SPDX-License-Identifier: GPL-3.0-only
//! Planar display driver

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::UnboundedReceiver;

use crate::display::{DisplayEvent, DisplayState, EventHandler, InputSource, Observers, SubscriptionId};
use crate::error::{DisplayError, Result};
use crate::protocols::DisplayProtocol;
use crate::protocols::transport::{TcpTransport, Transport, TransportHandler};

use super::codec::{self, Feedback, PlanarCommand};
use super::CONTROL_PORT;

/// State shared between the host-facing setters and the receive path
#[derive(Debug)]
struct Shared {
    model: &'static str,
    state: Mutex<DisplayState>,
    observers: Observers,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, DisplayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply one status line and announce the change
    fn apply_line(&self, line: &str) {
        let feedback = match codec::decode(line) {
            Ok(feedback) => feedback,
            Err(e) if e.is_noise() => {
                trace!("Ignoring status line {:?}: {}", line, e);
                return;
            }
            Err(e) => {
                warn!("{}: dropping status line {:?}: {}", self.model, line, e);
                return;
            }
        };

        // Update under the lock, notify after releasing it
        let event = {
            let mut state = self.state();
            match feedback {
                Feedback::Power(on) => {
                    state.power = on;
                    DisplayEvent::PowerChanged(on)
                }
                Feedback::Volume(level) => {
                    state.volume = level;
                    DisplayEvent::VolumeChanged(level)
                }
                Feedback::QuadView(quad) => {
                    state.quad_display = quad;
                    DisplayEvent::QuadViewChanged(quad)
                }
                Feedback::Input(input) => {
                    state.input = input;
                    DisplayEvent::InputChanged(input)
                }
            }
        };

        debug!("{}: {:?}", self.model, event);
        self.observers.emit(&event);
    }
}

impl TransportHandler for Shared {
    fn on_connected(&self) {
        self.observers.emit(&DisplayEvent::Connected);
    }

    fn on_disconnected(&self) {
        self.observers.emit(&DisplayEvent::Disconnected);
    }

    fn on_line_received(&self, line: &str) {
        self.apply_line(line);
    }
}

/// Driver for Planar displays speaking the ASCII control protocol
///
/// Setters send a command and return; the believed state only changes when
/// the display reports it.
pub struct PlanarDisplay {
    transport: Box<dyn Transport>,
    shared: Arc<Shared>,
}

impl PlanarDisplay {
    /// Create a driver bound to `address` on the Planar control port
    ///
    /// The connection is not opened until [`DisplayProtocol::connect`].
    pub fn new(model: &'static str, address: &str, supports_quad: bool) -> Self {
        Self::with_transport(
            model,
            supports_quad,
            Box::new(TcpTransport::new(address, CONTROL_PORT)),
        )
    }

    /// Create a driver over an existing transport
    pub fn with_transport(
        model: &'static str,
        supports_quad: bool,
        transport: Box<dyn Transport>,
    ) -> Self {
        let shared = Arc::new(Shared {
            model,
            state: Mutex::new(DisplayState::new(transport.address(), supports_quad)),
            observers: Observers::new(),
        });
        transport.set_handler(shared.clone());

        Self { transport, shared }
    }

    fn send(&self, command: PlanarCommand) -> Result<()> {
        let wire = command.to_wire();
        debug!("{}: sending {:?}", self.shared.model, wire);
        self.transport.send(&wire)?;
        Ok(())
    }
}

impl DisplayProtocol for PlanarDisplay {
    fn id(&self) -> String {
        format!("planar-{}", self.address())
    }

    fn name(&self) -> String {
        self.shared.model.to_string()
    }

    fn power(&self) -> bool {
        self.shared.state().power
    }

    fn set_power(&self, on: bool) -> Result<()> {
        self.send(PlanarCommand::power(on))
    }

    fn volume(&self) -> u16 {
        self.shared.state().volume
    }

    fn set_volume(&self, level: u16) -> Result<()> {
        self.send(PlanarCommand::volume(level))
    }

    fn input(&self) -> InputSource {
        self.shared.state().input
    }

    fn set_input(&self, input: InputSource) -> Result<()> {
        let command = PlanarCommand::input(input).ok_or_else(|| DisplayError::UnsupportedInput {
            model: self.name(),
            input,
        })?;
        self.send(command)
    }

    fn supports_quad(&self) -> bool {
        self.shared.state().supports_quad()
    }

    fn quad_display(&self) -> bool {
        self.shared.state().quad_display
    }

    fn set_quad_display(&self, on: bool) -> Result<()> {
        if !self.supports_quad() {
            return Err(DisplayError::UnsupportedCapability {
                model: self.name(),
                capability: "quad view",
            });
        }
        self.send(PlanarCommand::multi_view(on))
    }

    fn address(&self) -> String {
        self.shared.state().address.clone()
    }

    fn set_address(&self, address: &str) {
        self.shared.state().address = address.to_string();
        self.transport.set_address(address);
    }

    fn connect(&self) -> Result<()> {
        info!(
            "{}: connecting to {}:{}",
            self.shared.model,
            self.transport.address(),
            self.transport.port()
        );
        self.transport.connect()?;
        Ok(())
    }

    fn disconnect(&self) {
        self.transport.disconnect();
    }

    fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    fn state(&self) -> DisplayState {
        self.shared.state().clone()
    }

    fn subscribe(&self, handler: EventHandler) -> SubscriptionId {
        self.shared.observers.subscribe(handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.observers.unsubscribe(id)
    }

    fn events(&self) -> (SubscriptionId, UnboundedReceiver<DisplayEvent>) {
        self.shared.observers.channel()
    }
}

impl std::fmt::Debug for PlanarDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PlanarDisplay(id: {}, name: {})", self.id(), self.name())
    }
}
