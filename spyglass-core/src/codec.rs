use crate::model::{
    DeviceTag, IceCandidateRecord, PeerId, RoomName, RoomPeer, SignalingMessage,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

pub const EVENT_JOIN: &str = "join";
pub const EVENT_JOINED: &str = "joined";
pub const EVENT_LEAVE: &str = "leave";
pub const EVENT_MESSAGE: &str = "message";

pub const PAYLOAD_OFFER: &str = "offer";
pub const PAYLOAD_ANSWER: &str = "answer";
pub const PAYLOAD_CANDIDATE: &str = "candidate";

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("'{event}' payload is missing '{field}'")]
    MissingField { event: String, field: &'static str },
    #[error("cannot encode an unrecognized event")]
    Unencodable,
}

/// Encodes and decodes the `{event, data}` wire envelope.
///
/// Outgoing `message` envelopes carry the routing pair (`roomName`,
/// `peerId`); the session updates it through [`MessageCodec::set_route`]
/// whenever room membership changes.
#[derive(Debug, Default, Clone)]
pub struct MessageCodec {
    room: Option<RoomName>,
    peer: Option<PeerId>,
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    event: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoomData {
    room_name: RoomName,
    #[serde(default)]
    id: Option<PeerId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinedData {
    room_name: RoomName,
    socket_id: PeerId,
    my_id: PeerId,
    #[serde(default)]
    other_ids: Vec<WirePeer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageData {
    #[serde(default)]
    message: Value,
}

/// Roster entries arrive either as `{id, device}` objects or as bare id
/// strings (the legacy server encoding).
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum WirePeer {
    Tagged { id: PeerId, device: DeviceTag },
    Bare(PeerId),
}

impl From<WirePeer> for RoomPeer {
    fn from(wire: WirePeer) -> Self {
        match wire {
            WirePeer::Tagged { id, device } => RoomPeer { id, device },
            WirePeer::Bare(id) => RoomPeer {
                id,
                device: DeviceTag::unknown(),
            },
        }
    }
}

/// `label` has been observed both as a JSON number and as a numeric
/// string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireLabel {
    Number(u16),
    Text(String),
}

impl WireLabel {
    fn value(self) -> u16 {
        match self {
            WireLabel::Number(n) => n,
            WireLabel::Text(s) => s.trim().parse().unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    candidate: String,
    label: Option<WireLabel>,
    id: String,
}

#[derive(Debug, Deserialize)]
struct WireSdp {
    sdp: String,
}

impl MessageCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the routing pair stamped onto outgoing `message` envelopes.
    pub fn set_route(&mut self, room: Option<RoomName>, peer: Option<PeerId>) {
        self.room = room;
        self.peer = peer;
    }

    pub fn decode(&self, frame: &[u8]) -> Result<SignalingMessage, CodecError> {
        let envelope: RawEnvelope = serde_json::from_slice(frame)?;
        match envelope.event.as_str() {
            EVENT_JOIN => {
                let data: RoomData = serde_json::from_value(envelope.data)?;
                Ok(SignalingMessage::Join {
                    room: data.room_name,
                })
            }
            EVENT_LEAVE => {
                let data: RoomData = serde_json::from_value(envelope.data)?;
                Ok(match data.id {
                    Some(id) => SignalingMessage::RoomLeft {
                        room: data.room_name,
                        id,
                    },
                    None => SignalingMessage::Leave {
                        room: data.room_name,
                    },
                })
            }
            EVENT_JOINED => {
                let data: JoinedData = serde_json::from_value(envelope.data)?;
                Ok(SignalingMessage::RoomJoined {
                    room: data.room_name,
                    joiner: data.socket_id,
                    local: data.my_id,
                    others: data.other_ids.into_iter().map(RoomPeer::from).collect(),
                })
            }
            EVENT_MESSAGE => {
                let data: MessageData = serde_json::from_value(envelope.data)?;
                Self::normalize_payload(data.message)
            }
            other => Ok(SignalingMessage::Unrecognized {
                event: other.to_string(),
            }),
        }
    }

    /// Bring the two observed `message` encodings (structured object vs.
    /// opaque string) down to one variant.
    fn normalize_payload(payload: Value) -> Result<SignalingMessage, CodecError> {
        match payload {
            Value::String(text) => {
                // Some senders double-encode the payload object into a
                // JSON string.
                if text.trim_start().starts_with('{')
                    && let Ok(inner) = serde_json::from_str::<Value>(&text)
                    && inner.get("type").is_some()
                {
                    return Self::payload_from_object(inner);
                }
                Ok(SignalingMessage::Notify { text })
            }
            Value::Object(_) => Self::payload_from_object(payload),
            _ => Ok(SignalingMessage::Unrecognized {
                event: EVENT_MESSAGE.to_string(),
            }),
        }
    }

    fn payload_from_object(payload: Value) -> Result<SignalingMessage, CodecError> {
        let kind = payload
            .get("type")
            .and_then(Value::as_str)
            .ok_or(CodecError::MissingField {
                event: EVENT_MESSAGE.to_string(),
                field: "type",
            })?
            .to_string();
        match kind.as_str() {
            PAYLOAD_OFFER => {
                let sdp: WireSdp = serde_json::from_value(payload)?;
                Ok(SignalingMessage::Offer { sdp: sdp.sdp })
            }
            PAYLOAD_ANSWER => {
                let sdp: WireSdp = serde_json::from_value(payload)?;
                Ok(SignalingMessage::Answer { sdp: sdp.sdp })
            }
            PAYLOAD_CANDIDATE => {
                let wire: WireCandidate = serde_json::from_value(payload)?;
                Ok(SignalingMessage::Candidate(IceCandidateRecord {
                    sdp_mid: wire.id,
                    sdp_m_line_index: wire.label.map(WireLabel::value).unwrap_or(0),
                    candidate: wire.candidate,
                }))
            }
            other => Ok(SignalingMessage::Unrecognized {
                event: format!("{EVENT_MESSAGE}/{other}"),
            }),
        }
    }

    pub fn encode(&self, message: &SignalingMessage) -> Result<Bytes, CodecError> {
        let envelope = match message {
            SignalingMessage::Join { room } => json!({
                "event": EVENT_JOIN,
                "data": { "roomName": room },
            }),
            SignalingMessage::Leave { room } => json!({
                "event": EVENT_LEAVE,
                "data": { "roomName": room },
            }),
            SignalingMessage::Offer { sdp } => self.message_envelope(json!({
                "type": PAYLOAD_OFFER,
                "sdp": sdp,
            })),
            SignalingMessage::Answer { sdp } => self.message_envelope(json!({
                "type": PAYLOAD_ANSWER,
                "sdp": sdp,
            })),
            SignalingMessage::Candidate(record) => self.message_envelope(json!({
                "type": PAYLOAD_CANDIDATE,
                "candidate": record.candidate,
                "label": record.sdp_m_line_index,
                "id": record.sdp_mid,
            })),
            SignalingMessage::Notify { text } => {
                self.message_envelope(Value::String(text.clone()))
            }
            SignalingMessage::RoomJoined {
                room,
                joiner,
                local,
                others,
            } => json!({
                "event": EVENT_JOINED,
                "data": {
                    "roomName": room,
                    "socketId": joiner,
                    "myId": local,
                    "otherIds": others,
                },
            }),
            SignalingMessage::RoomLeft { room, id } => json!({
                "event": EVENT_LEAVE,
                "data": { "roomName": room, "id": id },
            }),
            SignalingMessage::Unrecognized { .. } => return Err(CodecError::Unencodable),
        };
        Ok(Bytes::from(serde_json::to_vec(&envelope)?))
    }

    fn message_envelope(&self, payload: Value) -> Value {
        let mut data = Map::new();
        if let Some(room) = &self.room {
            data.insert("roomName".to_string(), json!(room));
        }
        if let Some(peer) = &self.peer {
            data.insert("peerId".to_string(), json!(peer));
        }
        data.insert("message".to_string(), payload);
        json!({ "event": EVENT_MESSAGE, "data": data })
    }
}
