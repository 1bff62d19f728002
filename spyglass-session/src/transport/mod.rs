mod transport_event;
#[cfg(feature = "websocket")]
mod websocket;

pub use transport_event::TransportEvent;
#[cfg(feature = "websocket")]
pub use websocket::WebSocketTransport;

use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

/// Трейт, который должна реализовать внешняя система (WebSocket клиент),
/// чтобы сессия могла обмениваться кадрами с сервером сигналинга.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Установить соединение; входящие кадры идут в `events`.
    async fn connect(&self, events: mpsc::Sender<TransportEvent>) -> Result<(), TransportError>;

    /// Отправить один кадр. Вызовы сериализуются диспетчером сессии.
    async fn send(&self, frame: Bytes) -> Result<(), TransportError>;

    /// Закрыть соединение.
    async fn close(&self) -> Result<(), TransportError>;
}
