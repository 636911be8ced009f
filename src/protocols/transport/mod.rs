// SPDX-License-Identifier: GPL-3.0-only
//! Line-oriented connection to a display
//!
//! Drivers only see this narrow contract: connect, send a line, and three
//! notifications. One notification carries exactly one complete line with
//! the delimiter already stripped.

mod framing;
#[cfg(test)]
pub(crate) mod mock;
mod tcp;

use std::sync::Arc;

use thiserror::Error;

pub use framing::LineFramer;
pub use tcp::TcpTransport;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Not connected")]
    NotConnected,
    #[error("No async runtime available to drive the connection")]
    NoRuntime,
}

/// Receives connection notifications, in arrival order
pub trait TransportHandler: Send + Sync {
    fn on_connected(&self);
    fn on_disconnected(&self);
    fn on_line_received(&self, line: &str);
}

/// Persistent client connection identified by address and port
pub trait Transport: std::fmt::Debug + Send + Sync {
    fn address(&self) -> String;
    /// Takes effect on the next connect
    fn set_address(&self, address: &str);
    fn port(&self) -> u16;

    /// Install the handler that receives notifications
    fn set_handler(&self, handler: Arc<dyn TransportHandler>);

    /// Start connecting; returns before the connection is open
    fn connect(&self) -> Result<(), TransportError>;
    fn disconnect(&self);
    fn is_connected(&self) -> bool;

    /// Queue `text` to be written verbatim
    fn send(&self, text: &str) -> Result<(), TransportError>;
}
