//! In-memory transport for session tests

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use jc_core::error::{ConnectionError, StreamError};
use jc_core::traits::{Connection, Dialer, Inbound, Outbound, Received};
use jc_protocol::{describe_close, CLOSE_NORMAL};

/// Counters shared between a mock connection and its test
#[derive(Debug, Clone, Default)]
pub struct TransportStats {
    pub dials: Arc<AtomicUsize>,
    pub close_frames: Arc<AtomicUsize>,
    pub releases: Arc<AtomicUsize>,
}

/// Yields queued events, then blocks forever once the queue is drained and
/// every sender is gone
pub struct MockInbound {
    rx: mpsc::UnboundedReceiver<Received>,
}

impl MockInbound {
    pub fn channel() -> (Self, mpsc::UnboundedSender<Received>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx }, tx)
    }

    pub fn scripted(events: Vec<Received>) -> Self {
        let (inbound, tx) = Self::channel();
        for event in events {
            let _ = tx.send(event);
        }
        inbound
    }
}

#[async_trait]
impl Inbound for MockInbound {
    async fn receive(&mut self) -> Received {
        match self.rx.recv().await {
            Some(event) => event,
            None => std::future::pending().await,
        }
    }
}

/// Counts close frames and releases; optionally acknowledges close frames
/// by feeding a close event back into the inbound half
pub struct MockOutbound {
    stats: TransportStats,
    ack: Option<mpsc::UnboundedSender<Received>>,
}

impl MockOutbound {
    pub fn new(stats: TransportStats) -> Self {
        Self { stats, ack: None }
    }

    pub fn acknowledging(stats: TransportStats, ack: mpsc::UnboundedSender<Received>) -> Self {
        Self {
            stats,
            ack: Some(ack),
        }
    }
}

#[async_trait]
impl Outbound for MockOutbound {
    async fn send_close(&mut self, _reason: &str) -> Result<(), StreamError> {
        self.stats.close_frames.fetch_add(1, Ordering::SeqCst);
        if let Some(ack) = &self.ack {
            let _ = ack.send(Received::Closed(describe_close(CLOSE_NORMAL, "")));
        }
        Ok(())
    }

    async fn close(&mut self) {
        self.stats.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Hands out a single prepared connection
pub struct MockDialer {
    connection: Mutex<Option<Connection>>,
    stats: TransportStats,
    hang: bool,
}

impl MockDialer {
    pub fn new(connection: Connection, stats: TransportStats) -> Self {
        Self {
            connection: Mutex::new(Some(connection)),
            stats,
            hang: false,
        }
    }

    /// A dialer whose endpoint is unreachable
    pub fn unreachable(stats: TransportStats) -> Self {
        Self {
            connection: Mutex::new(None),
            stats,
            hang: false,
        }
    }

    /// A dialer whose handshake never completes, like a blackholed host
    pub fn hanging(stats: TransportStats) -> Self {
        Self {
            connection: Mutex::new(None),
            stats,
            hang: true,
        }
    }
}

#[async_trait]
impl Dialer for MockDialer {
    async fn dial(&self, endpoint: &str) -> Result<Connection, ConnectionError> {
        self.stats.dials.fetch_add(1, Ordering::SeqCst);
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.connection
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| ConnectionError::Dial {
                endpoint: endpoint.to_string(),
                reason: "connection refused".to_string(),
            })
    }
}

/// Cloneable in-memory stdout
#[derive(Debug, Clone, Default)]
pub struct SharedOutput(Arc<Mutex<Vec<u8>>>);

impl SharedOutput {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
