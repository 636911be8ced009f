// SPDX-License-Identifier: GPL-3.0-only
//! Integer-only projection of a display driver
//!
//! For callers that can only pass 16-bit unsigned integers: booleans become
//! 0/1 (any nonzero value is true on write) and inputs become their ordinal.
//! Nothing is validated or stored here; every call goes straight through to
//! the typed driver.

use std::sync::Arc;

use crate::devices;
use crate::display::{DisplayEvent, InputSource, SubscriptionId};
use crate::error::Result;
use crate::protocols::DisplayProtocol;

fn to_u16(value: bool) -> u16 {
    u16::from(value)
}

/// Notification mirrored with an integer field alongside the typed one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyEvent {
    PowerChanged { state: bool, u_state: u16 },
    VolumeChanged { current_level: u16 },
    InputChanged { current_input: InputSource, u_current_input: u16 },
    QuadViewChanged { state: bool, u_state: u16 },
    Connected,
    Disconnected,
}

impl From<DisplayEvent> for LegacyEvent {
    fn from(event: DisplayEvent) -> Self {
        match event {
            DisplayEvent::PowerChanged(state) => LegacyEvent::PowerChanged {
                state,
                u_state: to_u16(state),
            },
            DisplayEvent::VolumeChanged(current_level) => LegacyEvent::VolumeChanged { current_level },
            DisplayEvent::InputChanged(current_input) => LegacyEvent::InputChanged {
                current_input,
                u_current_input: current_input.ordinal(),
            },
            DisplayEvent::QuadViewChanged(state) => LegacyEvent::QuadViewChanged {
                state,
                u_state: to_u16(state),
            },
            DisplayEvent::Connected => LegacyEvent::Connected,
            DisplayEvent::Disconnected => LegacyEvent::Disconnected,
        }
    }
}

pub type LegacyEventHandler = Arc<dyn Fn(&LegacyEvent) + Send + Sync>;

/// Integer-only facade over any display driver
#[derive(Debug)]
pub struct LegacyDisplay {
    display: Box<dyn DisplayProtocol>,
}

impl LegacyDisplay {
    /// Build the driver registered for `device_type`
    ///
    /// Fails with `UnknownDeviceType` if no driver is registered.
    pub fn initialize(device_type: u16, address: &str) -> Result<Self> {
        let display = devices::create_display(device_type, address)?;
        Ok(Self::wrap(display))
    }

    pub fn wrap(display: Box<dyn DisplayProtocol>) -> Self {
        Self { display }
    }

    /// Forward every driver notification in its mirrored form
    pub fn subscribe(&self, handler: LegacyEventHandler) -> SubscriptionId {
        self.display.subscribe(Arc::new(move |event: &DisplayEvent| {
            handler(&LegacyEvent::from(*event));
        }))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.display.unsubscribe(id)
    }

    pub fn supports_quad(&self) -> u16 {
        to_u16(self.display.supports_quad())
    }

    pub fn power(&self) -> u16 {
        to_u16(self.display.power())
    }

    pub fn set_power(&self, value: u16) -> Result<()> {
        self.display.set_power(value > 0)
    }

    pub fn volume(&self) -> u16 {
        self.display.volume()
    }

    pub fn set_volume(&self, value: u16) -> Result<()> {
        self.display.set_volume(value)
    }

    pub fn input(&self) -> u16 {
        self.display.input().ordinal()
    }

    /// Unknown ordinals select the default input
    pub fn set_input(&self, value: u16) -> Result<()> {
        let input = InputSource::from_ordinal(value).unwrap_or_default();
        self.display.set_input(input)
    }

    pub fn quad_display(&self) -> u16 {
        to_u16(self.display.quad_display())
    }

    pub fn set_quad_display(&self, value: u16) -> Result<()> {
        self.display.set_quad_display(value > 0)
    }

    pub fn address(&self) -> String {
        self.display.address()
    }

    pub fn set_address(&self, address: &str) {
        self.display.set_address(address);
    }

    pub fn connect(&self) -> Result<()> {
        self.display.connect()
    }

    pub fn disconnect(&self) {
        self.display.disconnect();
    }
}
