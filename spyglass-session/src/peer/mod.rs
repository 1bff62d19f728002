#[cfg(feature = "webrtc")]
mod webrtc_adapter;

#[cfg(feature = "webrtc")]
pub use webrtc_adapter::WebRtcPeerConnection;

use crate::error::PeerConnectionError;
use async_trait::async_trait;
use spyglass_core::{IceCandidateRecord, SessionDescription};

/// Signals the peer-connection engine pushes back into the session.
#[derive(Debug, Clone)]
pub enum PeerConnectionEvent {
    /// A locally gathered candidate, to be forwarded to the peer.
    CandidateGathered(IceCandidateRecord),
    /// DTLS/ICE connectivity established.
    Connected,
    /// The engine failed or closed on its own.
    Failed(String),
}

/// Capability surface of the peer-connection engine.
///
/// The session only sequences these operations; ICE, DTLS and media
/// semantics stay inside the implementation.
#[async_trait]
pub trait PeerConnection: Send + Sync {
    async fn create_offer(&self) -> Result<String, PeerConnectionError>;

    async fn create_answer(&self) -> Result<String, PeerConnectionError>;

    async fn set_local_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), PeerConnectionError>;

    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), PeerConnectionError>;

    async fn add_ice_candidate(
        &self,
        candidate: IceCandidateRecord,
    ) -> Result<(), PeerConnectionError>;

    async fn close(&self) -> Result<(), PeerConnectionError>;
}
