use super::peer::{PeerId, RoomPeer};
use super::room::RoomName;
use serde::{Deserialize, Serialize};

/// Notification string a viewer sends once its local media tracks exist.
pub const MEDIA_READY_NOTE: &str = "got user media";

/// A discovered network path a peer may use to reach the other side.
/// Receipt order is the order candidates must reach the peer connection.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct IceCandidateRecord {
    pub sdp_mid: String,
    pub sdp_m_line_index: u16,
    pub candidate: String,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SdpKind {
    Offer,
    Answer,
}

/// An SDP blob together with its role in the offer/answer exchange.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SessionDescription {
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }
}

/// One decoded signaling frame, consumed exactly once by the session
/// dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalingMessage {
    /// Request to enter a rendezvous room.
    Join { room: RoomName },
    /// Request to leave a room.
    Leave { room: RoomName },
    Offer { sdp: String },
    Answer { sdp: String },
    Candidate(IceCandidateRecord),
    /// Opaque string payload, e.g. [`MEDIA_READY_NOTE`].
    Notify { text: String },
    /// Server confirmation that `joiner` entered `room`. `local` is the
    /// receiving endpoint's own id.
    RoomJoined {
        room: RoomName,
        joiner: PeerId,
        local: PeerId,
        others: Vec<RoomPeer>,
    },
    RoomLeft { room: RoomName, id: PeerId },
    /// Unknown event name; the dispatcher logs and drops it.
    Unrecognized { event: String },
}

impl SignalingMessage {
    /// Whether this message travels inside a `message` envelope and
    /// therefore needs an active peer to be addressed to.
    pub fn is_payload(&self) -> bool {
        matches!(
            self,
            SignalingMessage::Offer { .. }
                | SignalingMessage::Answer { .. }
                | SignalingMessage::Candidate(_)
                | SignalingMessage::Notify { .. }
        )
    }
}
