// SPDX-License-Identifier: GPL-3.0-only
//! Control and monitor networked flat-panel displays
//!
//! A driver keeps what it believes about a display (power, volume, input,
//! quad view), turns host requests into the vendor's command syntax, and
//! turns the status lines the display pushes back into state changes and
//! [`display::DisplayEvent`] notifications.
//!
//! ```no_run
//! use panel_control::devices;
//! use panel_control::display::{DisplayEvent, InputSource};
//! use panel_control::protocols::DisplayProtocol;
//!
//! # async fn example() -> panel_control::error::Result<()> {
//! let display = devices::create_display(0, "10.0.0.20")?;
//! let (_id, mut events) = display.events();
//! display.connect()?;
//!
//! while let Some(event) = events.recv().await {
//!     if event == DisplayEvent::Connected {
//!         display.set_input(InputSource::Hdmi2)?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate tracing;

pub mod config;
pub mod devices;
pub mod display;
pub mod error;
pub mod legacy;
pub mod protocols;
