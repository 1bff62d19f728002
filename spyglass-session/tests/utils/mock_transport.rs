use async_trait::async_trait;
use bytes::Bytes;
use spyglass_session::error::TransportError;
use spyglass_session::transport::{Transport, TransportEvent};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Mock Transport that records outgoing frames and lets tests inject
/// inbound ones.
pub struct MockTransport {
    /// Inbound channel handed over by the session at connect time.
    events: Mutex<Option<mpsc::Sender<TransportEvent>>>,
    /// All frames the session sent (for verification).
    frames: Arc<Mutex<Vec<Bytes>>>,
    /// Channel mirroring sent frames.
    frame_tx: mpsc::UnboundedSender<Bytes>,
    fail_connect: bool,
}

impl MockTransport {
    /// Create a MockTransport and the receiver of sent frames.
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Bytes>) {
        Self::build(false)
    }

    /// Create a MockTransport whose connect always fails.
    pub fn failing() -> (Arc<Self>, mpsc::UnboundedReceiver<Bytes>) {
        Self::build(true)
    }

    fn build(fail_connect: bool) -> (Arc<Self>, mpsc::UnboundedReceiver<Bytes>) {
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let transport = Arc::new(Self {
            events: Mutex::new(None),
            frames: Arc::new(Mutex::new(Vec::new())),
            frame_tx,
            fail_connect,
        });
        (transport, frame_rx)
    }

    /// Deliver a raw frame as if the server had sent it.
    pub async fn inject(&self, frame: Bytes) {
        let guard = self.events.lock().await;
        let tx = guard.as_ref().expect("transport not connected");
        tx.send(TransportEvent::Frame(frame))
            .await
            .expect("session dispatch loop gone");
    }

    /// Simulate the server closing the connection.
    pub async fn close_from_server(&self) {
        let guard = self.events.lock().await;
        let tx = guard.as_ref().expect("transport not connected");
        tx.send(TransportEvent::Closed)
            .await
            .expect("session dispatch loop gone");
    }

    /// All frames the session has sent so far.
    pub async fn sent_frames(&self) -> Vec<Bytes> {
        self.frames.lock().await.clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self, events: mpsc::Sender<TransportEvent>) -> Result<(), TransportError> {
        if self.fail_connect {
            return Err(TransportError::Connect("connection refused".to_string()));
        }
        *self.events.lock().await = Some(events);
        Ok(())
    }

    async fn send(&self, frame: Bytes) -> Result<(), TransportError> {
        tracing::debug!("[MockTransport] send {} bytes", frame.len());
        self.frames.lock().await.push(frame.clone());
        let _ = self.frame_tx.send(frame);
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        *self.events.lock().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_transport_records_sent_frames() {
        let (transport, mut frames) = MockTransport::new();

        transport.send(Bytes::from_static(b"hello")).await.unwrap();

        assert_eq!(frames.recv().await.unwrap(), Bytes::from_static(b"hello"));
        assert_eq!(transport.sent_frames().await.len(), 1);
    }
}
