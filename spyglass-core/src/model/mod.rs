mod peer;
mod room;
mod signaling;

pub use peer::{DeviceTag, PeerId, RoomPeer};
pub use room::RoomName;
pub use signaling::{
    IceCandidateRecord, MEDIA_READY_NOTE, SdpKind, SessionDescription, SignalingMessage,
};
