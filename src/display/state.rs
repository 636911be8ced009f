// SPDX-License-Identifier: GPL-3.0-only
//! Believed state of a single display

use super::InputSource;

/// What the driver currently believes about the display
///
/// Fields only change when the device reports them; a set call sends a
/// command and leaves the state alone until feedback arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    pub power: bool,
    /// 0..=65535, scaled from the device's 0..=100
    pub volume: u16,
    pub input: InputSource,
    supports_quad: bool,
    pub quad_display: bool,
    pub address: String,
}

impl DisplayState {
    pub fn new(address: impl Into<String>, supports_quad: bool) -> Self {
        Self {
            power: false,
            volume: 0,
            input: InputSource::Default,
            supports_quad,
            quad_display: false,
            address: address.into(),
        }
    }

    /// Fixed at construction
    pub fn supports_quad(&self) -> bool {
        self.supports_quad
    }
}
