use super::{Transport, TransportEvent};
use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// [`Transport`] over a WebSocket connection to the rendezvous server.
pub struct WebSocketTransport {
    url: String,
    sink: Mutex<Option<WsSink>>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl WebSocketTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            sink: Mutex::new(None),
            reader: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn connect(&self, events: mpsc::Sender<TransportEvent>) -> Result<(), TransportError> {
        let (ws, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        info!("WebSocket connected: {}", self.url);

        let (sink, mut stream) = ws.split();
        *self.sink.lock().await = Some(sink);

        let task = tokio::spawn(async move {
            while let Some(next) = stream.next().await {
                let frame = match next {
                    Ok(Message::Text(text)) => Bytes::copy_from_slice(text.as_bytes()),
                    Ok(Message::Binary(data)) => data,
                    Ok(Message::Close(_)) | Err(_) => break,
                    Ok(_) => continue,
                };
                if events.send(TransportEvent::Frame(frame)).await.is_err() {
                    debug!("Session dropped the inbound channel, stopping reader");
                    return;
                }
            }
            let _ = events.send(TransportEvent::Closed).await;
        });
        *self.reader.lock().await = Some(task);
        Ok(())
    }

    async fn send(&self, frame: Bytes) -> Result<(), TransportError> {
        let mut guard = self.sink.lock().await;
        let sink = guard.as_mut().ok_or(TransportError::Closed)?;
        let text = String::from_utf8(frame.to_vec())
            .map_err(|_| TransportError::Send("frame is not utf-8 text".to_string()))?;
        sink.send(Message::Text(text.into()))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn close(&self) -> Result<(), TransportError> {
        if let Some(task) = self.reader.lock().await.take() {
            task.abort();
        }
        if let Some(mut sink) = self.sink.lock().await.take() {
            let _ = sink.send(Message::Close(None)).await;
        }
        Ok(())
    }
}
