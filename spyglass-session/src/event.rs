use crate::error::{PeerConnectionError, TransportError};
use spyglass_core::{IceCandidateRecord, PeerId, RoomName, RoomPeer};

/// Everything the session reports to its single registered listener.
///
/// Replaces the callback-interface shape of comparable clients with one
/// closed variant stream: the consumer matches on it instead of
/// implementing a trait.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A compatible counterpart is present in the room.
    PeerAvailable { peer: RoomPeer },
    PeerLost { peer: PeerId },
    /// The peer is reachable; prepare local media, then call
    /// `start_offer`.
    RequestLocalReady,
    /// The remote endpoint announced that its media is ready.
    PeerReady { note: String },
    OfferReceived { sdp: String },
    AnswerReceived { sdp: String },
    CandidateReceived { candidate: IceCandidateRecord },
    /// The peer connection reported connectivity.
    Connected,
    NegotiationFailed { error: PeerConnectionError },
    Disconnected,
    ConnectionError { error: TransportError },
    /// A room is being entered again after a previous leave; attach a
    /// fresh peer connection before membership events arrive.
    Rejoin,
    /// A third participant appeared in a strictly two-party room.
    UnsupportedTopology { room: RoomName, participants: usize },
}
