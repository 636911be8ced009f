// SPDX-License-Identifier: GPL-3.0-only
//! TCP client transport
//!
//! A connection task owns the socket: the reader half frames incoming bytes
//! into lines and hands them to the handler, the writer half drains a queue
//! filled by [`Transport::send`]. There is no retry or reconnection; a
//! dropped connection is only reported through `on_disconnected`.
//!
//! Every accepted `connect()` ends in exactly one `on_disconnected`, whether
//! the attempt failed, was cancelled while opening, or ran and closed later.
//! Attempts are serialized, so a new attempt's `on_connected` never overtakes
//! the previous attempt's `on_disconnected`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{LineFramer, Transport, TransportError, TransportHandler};

const READ_BUFFER_SIZE: usize = 1024;

#[derive(Default)]
struct Link {
    /// Bumped on every connect so a stale task cannot clobber a newer one
    generation: u64,
    writer: Option<mpsc::UnboundedSender<String>>,
    connected: bool,
    /// Task of the most recent attempt
    task: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct Shared {
    handler: Mutex<Option<Arc<dyn TransportHandler>>>,
    link: Mutex<Link>,
}

impl Shared {
    fn handler(&self) -> Option<Arc<dyn TransportHandler>> {
        self.handler.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn link(&self) -> MutexGuard<'_, Link> {
        self.link.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns false if this attempt was cancelled or superseded meanwhile
    fn mark_connected(&self, generation: u64) -> bool {
        let mut link = self.link();
        if link.generation != generation || link.writer.is_none() {
            return false;
        }
        link.connected = true;
        true
    }

    /// Clear the link if `generation` is still the current attempt
    fn finish(&self, generation: u64) {
        let mut link = self.link();
        if link.generation == generation {
            link.writer = None;
            link.connected = false;
        }
    }
}

/// Persistent TCP connection to a display control port
///
/// Dropping the transport closes its connection.
pub struct TcpTransport {
    address: Mutex<String>,
    port: u16,
    shared: Arc<Shared>,
}

impl TcpTransport {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: Mutex::new(address.into()),
            port,
            shared: Arc::new(Shared::default()),
        }
    }

    async fn run_connection(
        shared: Arc<Shared>,
        generation: u64,
        address: String,
        port: u16,
        write_rx: mpsc::UnboundedReceiver<String>,
        previous: Option<JoinHandle<()>>,
    ) {
        if let Some(previous) = previous {
            let _ = previous.await;
        }

        Self::serve(&shared, generation, &address, port, write_rx).await;

        shared.finish(generation);
        if let Some(handler) = shared.handler() {
            handler.on_disconnected();
        }
    }

    /// Open the socket and pump it until either side closes
    async fn serve(
        shared: &Shared,
        generation: u64,
        address: &str,
        port: u16,
        mut write_rx: mpsc::UnboundedReceiver<String>,
    ) {
        debug!("Connecting to {}:{}", address, port);

        // Nothing is queued before the link is marked connected, so the queue
        // only yields here once disconnect() drops its sender
        let stream = tokio::select! {
            result = TcpStream::connect((address, port)) => match result {
                Ok(stream) => stream,
                Err(e) => {
                    warn!("Failed to connect to {}:{}: {}", address, port, e);
                    return;
                }
            },
            _ = write_rx.recv() => {
                debug!("Connection to {}:{} cancelled while opening", address, port);
                return;
            }
        };

        if let Err(e) = stream.set_nodelay(true) {
            debug!("Failed to set TCP_NODELAY: {}", e);
        }

        if !shared.mark_connected(generation) {
            debug!("Connection to {}:{} cancelled before it opened", address, port);
            return;
        }

        info!("Connected to {}:{}", address, port);
        if let Some(handler) = shared.handler() {
            handler.on_connected();
        }

        let (reader, writer) = stream.into_split();
        let mut writer_task = tokio::spawn(Self::writer_loop(writer, write_rx));

        tokio::select! {
            _ = Self::reader_loop(reader, shared) => {
                writer_task.abort();
            }
            _ = &mut writer_task => {}
        }

        info!("Disconnected from {}:{}", address, port);
    }

    async fn reader_loop(mut reader: OwnedReadHalf, shared: &Shared) {
        let mut framer = LineFramer::new();
        let mut buf = [0u8; READ_BUFFER_SIZE];

        loop {
            match reader.read(&mut buf).await {
                Ok(0) => {
                    debug!("Connection closed by peer");
                    break;
                }
                Ok(n) => {
                    for line in framer.push(&buf[..n]) {
                        trace!("Received line: {:?}", line);
                        if let Some(handler) = shared.handler() {
                            handler.on_line_received(&line);
                        }
                    }
                }
                Err(e) => {
                    error!("Read error: {}", e);
                    break;
                }
            }
        }
    }

    async fn writer_loop(
        mut writer: OwnedWriteHalf,
        mut write_rx: mpsc::UnboundedReceiver<String>,
    ) {
        // Ends when the queue's sender is dropped by disconnect()
        while let Some(text) = write_rx.recv().await {
            if let Err(e) = writer.write_all(text.as_bytes()).await {
                error!("Write error: {}", e);
                break;
            }
            if let Err(e) = writer.flush().await {
                error!("Flush error: {}", e);
                break;
            }
            trace!("Sent {:?}", text);
        }

        let _ = writer.shutdown().await;
    }
}

impl Transport for TcpTransport {
    fn address(&self) -> String {
        self.address.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set_address(&self, address: &str) {
        *self.address.lock().unwrap_or_else(PoisonError::into_inner) = address.to_string();
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn set_handler(&self, handler: Arc<dyn TransportHandler>) {
        *self.shared.handler.lock().unwrap_or_else(PoisonError::into_inner) = Some(handler);
    }

    fn connect(&self) -> Result<(), TransportError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| TransportError::NoRuntime)?;

        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let mut link = self.shared.link();
        if link.writer.is_some() {
            debug!("Connect requested while a connection is already active");
            return Ok(());
        }
        link.generation += 1;
        link.writer = Some(write_tx);
        link.connected = false;

        let generation = link.generation;
        let previous = link.task.take();
        let task = runtime.spawn(Self::run_connection(
            self.shared.clone(),
            generation,
            self.address(),
            self.port,
            write_rx,
            previous,
        ));
        link.task = Some(task);

        Ok(())
    }

    fn disconnect(&self) {
        // Dropping the sender cancels an attempt still opening, or ends the
        // writer loop, which closes the socket
        if self.shared.link().writer.take().is_some() {
            debug!("Disconnect requested for {}:{}", self.address(), self.port);
        }
    }

    fn is_connected(&self) -> bool {
        self.shared.link().connected
    }

    fn send(&self, text: &str) -> Result<(), TransportError> {
        let link = self.shared.link();
        match (&link.writer, link.connected) {
            (Some(writer), true) => writer
                .send(text.to_string())
                .map_err(|_| TransportError::NotConnected),
            _ => Err(TransportError::NotConnected),
        }
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TcpTransport({}:{}, connected: {})",
            self.address(),
            self.port,
            self.is_connected()
        )
    }
}
