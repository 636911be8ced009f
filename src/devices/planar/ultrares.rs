// SPDX-License-Identifier: GPL-3.0-only
//! Planar UltraRes specifications

use crate::devices::DeviceSpec;
use crate::protocols::DisplayProtocol;
use crate::protocols::planar::{CONTROL_PORT, PlanarDisplay};
use crate::protocols::transport::TcpTransport;

/// Selector for the Planar UltraRes family
pub const DEVICE_TYPE: u16 = 0;

/// Device specification for Planar UltraRes displays
///
/// - 4K large-format LCD, 75" to 98"
/// - One DisplayPort input, four HDMI inputs, OPS slot
/// - Quad view shows four sources at once
pub const SPEC: DeviceSpec = DeviceSpec {
    device_type: DEVICE_TYPE,
    name: "Planar UltraRes",
    port: CONTROL_PORT,
    supports_quad: true,
    construct,
};

fn construct(spec: &DeviceSpec, address: &str) -> Box<dyn DisplayProtocol> {
    Box::new(PlanarDisplay::with_transport(
        spec.name,
        spec.supports_quad,
        Box::new(TcpTransport::new(address, spec.port)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayEvent;
    use std::time::Duration;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_construct_connects_to_spec_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let spec = DeviceSpec {
            port: listener.local_addr().unwrap().port(),
            ..SPEC
        };

        let display = (spec.construct)(&spec, "127.0.0.1");
        let (_id, mut events) = display.events();
        display.connect().unwrap();

        let accepted = tokio::time::timeout(Duration::from_secs(5), listener.accept()).await;
        assert!(matches!(accepted, Ok(Ok(_))));
        let event = tokio::time::timeout(Duration::from_secs(5), events.recv()).await.unwrap();
        assert_eq!(event, Some(DisplayEvent::Connected));
    }
}
