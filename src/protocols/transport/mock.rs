// SPDX-License-Identifier: GPL-3.0-only
//! In-memory transport that records sent lines and replays device input

use std::sync::{Arc, Mutex};

use super::{Transport, TransportError, TransportHandler};

#[derive(Default)]
struct MockState {
    address: String,
    connected: bool,
    connect_calls: usize,
    sent: Vec<String>,
    handler: Option<Arc<dyn TransportHandler>>,
}

/// Cloneable handle; clones share the same recorded state
#[derive(Clone, Default)]
pub struct MockTransport {
    port: u16,
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new(address: &str, port: u16) -> Self {
        let transport = Self {
            port,
            state: Arc::default(),
        };
        transport.state.lock().unwrap().address = address.to_string();
        transport
    }

    pub fn sent(&self) -> Vec<String> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn connect_calls(&self) -> usize {
        self.state.lock().unwrap().connect_calls
    }

    fn handler(&self) -> Arc<dyn TransportHandler> {
        self.state
            .lock()
            .unwrap()
            .handler
            .clone()
            .expect("no handler installed")
    }

    /// Simulate the connection opening
    pub fn open(&self) {
        self.state.lock().unwrap().connected = true;
        self.handler().on_connected();
    }

    /// Simulate the connection dropping
    pub fn drop_connection(&self) {
        self.state.lock().unwrap().connected = false;
        self.handler().on_disconnected();
    }

    /// Simulate the device sending a line
    pub fn feed(&self, line: &str) {
        self.handler().on_line_received(line);
    }
}

impl Transport for MockTransport {
    fn address(&self) -> String {
        self.state.lock().unwrap().address.clone()
    }

    fn set_address(&self, address: &str) {
        self.state.lock().unwrap().address = address.to_string();
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn set_handler(&self, handler: Arc<dyn TransportHandler>) {
        self.state.lock().unwrap().handler = Some(handler);
    }

    fn connect(&self) -> Result<(), TransportError> {
        self.state.lock().unwrap().connect_calls += 1;
        Ok(())
    }

    fn disconnect(&self) {
        let was_connected = std::mem::replace(&mut self.state.lock().unwrap().connected, false);
        if was_connected {
            self.handler().on_disconnected();
        }
    }

    fn is_connected(&self) -> bool {
        self.state.lock().unwrap().connected
    }

    fn send(&self, text: &str) -> Result<(), TransportError> {
        // Records regardless of connection state so tests can inspect encoding
        self.state.lock().unwrap().sent.push(text.to_string());
        Ok(())
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MockTransport({}:{})", self.address(), self.port)
    }
}
