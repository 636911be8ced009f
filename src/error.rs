// SPDX-License-Identifier: GPL-3.0-only
//! Error types for the display drivers
//!
//! Validation failures are raised synchronously before anything is written
//! to the device. Transport failures wrap the underlying connection error.

use thiserror::Error;

use crate::display::InputSource;
use crate::protocols::transport::TransportError;

/// Main error type returned by drivers, the factory and the legacy shim
#[derive(Error, Debug)]
pub enum DisplayError {
    /// The model has no such input
    #[error("{model} does not support input {input}")]
    UnsupportedInput { model: String, input: InputSource },

    /// The model lacks a capability (e.g. quad view)
    #[error("{model} does not support {capability}")]
    UnsupportedCapability {
        model: String,
        capability: &'static str,
    },

    /// Factory was given a selector with no registered driver
    #[error("Display type {0} not supported")]
    UnknownDeviceType(u16),

    /// Connection level failure
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl DisplayError {
    /// True for local validation failures (nothing was sent to the device)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DisplayError::UnsupportedInput { .. } | DisplayError::UnsupportedCapability { .. }
        )
    }
}

/// Result type alias for DisplayError
pub type Result<T> = std::result::Result<T, DisplayError>;
