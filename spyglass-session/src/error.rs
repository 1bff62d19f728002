use thiserror::Error;

/// Failure of the duplex channel to the rendezvous server.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("send failed: {0}")]
    Send(String),
    #[error("transport closed")]
    Closed,
}

/// Failure reported by the peer-connection engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PeerConnectionError {
    #[error("create offer failed: {0}")]
    CreateOffer(String),
    #[error("create answer failed: {0}")]
    CreateAnswer(String),
    #[error("set local description failed: {0}")]
    SetLocalDescription(String),
    #[error("set remote description failed: {0}")]
    SetRemoteDescription(String),
    #[error("add candidate failed: {0}")]
    AddCandidate(String),
    #[error("engine failure: {0}")]
    Engine(String),
    #[error("peer connection closed")]
    Closed,
}

/// Errors returned by the public [`SignalingSession`] surface.
///
/// [`SignalingSession`]: crate::session::SignalingSession
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Negotiation(#[from] PeerConnectionError),
    #[error("no active peer in the room")]
    NoPeer,
    #[error("session is not connected")]
    NotConnected,
    #[error("session is closed")]
    Closed,
}
