pub mod codec;
pub mod model;

pub use codec::{CodecError, MessageCodec};
pub use model::{
    DeviceTag, IceCandidateRecord, MEDIA_READY_NOTE, PeerId, RoomName, RoomPeer, SdpKind,
    SessionDescription, SignalingMessage,
};
