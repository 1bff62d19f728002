use bytes::Bytes;

/// Inbound activity pushed by the transport into the dispatch channel.
#[derive(Debug)]
pub enum TransportEvent {
    /// One complete frame from the signaling server.
    Frame(Bytes),
    /// The transport went away; no further frames will arrive.
    Closed,
}
