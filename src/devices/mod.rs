// SPDX-License-Identifier: GPL-3.0-only
//! Supported display models and the driver factory
//!
//! Each model registers a [`DeviceSpec`] carrying its constructor, so adding
//! a vendor only means adding a spec to [`SUPPORTED`].

pub mod planar;

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::{DisplayError, Result};
use crate::protocols::DisplayProtocol;

/// Device specification for a display model
#[derive(Debug, Clone, Copy)]
pub struct DeviceSpec {
    /// Numeric selector used by integer-only callers
    pub device_type: u16,

    /// Human-readable model name
    pub name: &'static str,

    /// TCP control port the driver connects to
    pub port: u16,

    /// Whether the model can show four sources at once
    pub supports_quad: bool,

    /// Build an unconnected driver for a display at the given address
    pub construct: fn(&DeviceSpec, &str) -> Box<dyn DisplayProtocol>,
}

/// Every model this crate can drive
pub static SUPPORTED: &[DeviceSpec] = &[planar::ultrares::SPEC];

static BY_DEVICE_TYPE: Lazy<HashMap<u16, &'static DeviceSpec>> = Lazy::new(|| {
    SUPPORTED
        .iter()
        .map(|spec| (spec.device_type, spec))
        .collect()
});

/// Get device specification by device type
pub fn get_device_spec(device_type: u16) -> Option<&'static DeviceSpec> {
    BY_DEVICE_TYPE.get(&device_type).copied()
}

/// Get all supported device types
pub fn supported_device_types() -> Vec<u16> {
    SUPPORTED.iter().map(|spec| spec.device_type).collect()
}

/// Construct the driver registered for `device_type`
///
/// The returned driver is not connected yet.
pub fn create_display(device_type: u16, address: &str) -> Result<Box<dyn DisplayProtocol>> {
    let spec = get_device_spec(device_type).ok_or_else(|| {
        warn!("Display type {} not supported", device_type);
        DisplayError::UnknownDeviceType(device_type)
    })?;

    info!("Creating {} driver for {}:{}", spec.name, address, spec.port);
    Ok((spec.construct)(spec, address))
}
