// SPDX-License-Identifier: GPL-3.0-only
//! Planar display control protocol
//!
//! Planar video-wall and large-format displays accept an ASCII command set
//! over TCP and push a status line whenever a property changes.

pub mod codec;
mod device;

pub use device::PlanarDisplay;

/// TCP port Planar displays listen on for control
pub const CONTROL_PORT: u16 = 57;
