use crate::peer::PeerConnection;
use spyglass_core::{RoomName, SignalingMessage};
use std::sync::Arc;

/// Команды, поступающие в диспетчер сессии от фасада.
pub enum SessionCommand {
    /// Запрос на вход в комнату.
    Join { room: RoomName },

    /// Запрос на выход из комнаты.
    Leave { room: RoomName },

    /// Исходящее сообщение для активного пира (offer/answer/candidate).
    Send { message: SignalingMessage },

    /// Локальные медиа готовы: можно создавать offer.
    StartOffer,

    /// Подключить свежий peer connection (путь rejoin).
    AttachPeer { pc: Arc<dyn PeerConnection> },

    /// Полное завершение сессии.
    Disconnect,
}
