use super::CandidateBuffer;
use crate::error::PeerConnectionError;
use spyglass_core::IceCandidateRecord;
use tracing::{debug, info, warn};

/// Where the call negotiation currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    Idle,
    WaitingPeer,
    CreatingOffer,
    OfferSent,
    AwaitingAnswer,
    CreatingAnswer,
    Connected,
    Closed,
}

/// Side effects the dispatcher must carry out after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum NegotiationAction {
    /// Run create-offer + set-local against the peer connection.
    BeginOffer,
    SendOffer { sdp: String },
    /// Apply the remote offer and produce an answer.
    BeginAnswer { sdp: String },
    SendAnswer { sdp: String },
    /// Apply the remote answer.
    ApplyAnswer { sdp: String },
    /// Abort the in-flight peer-connection sub-task.
    CancelTask,
    /// Feed these candidates to the peer connection, in this order.
    ApplyCandidates(Vec<IceCandidateRecord>),
    /// Ask the caller to prepare local media.
    RequestLocalReady,
    /// Negotiation is over; release the peer connection.
    Fail(PeerConnectionError),
}

/// Drives one offer/answer/candidate exchange against the peer
/// connection. Pure transition logic: every input returns the actions
/// the dispatcher executes, so all mutation stays on the dispatch task.
#[derive(Debug)]
pub struct Negotiation {
    state: NegotiationState,
    buffer: CandidateBuffer,
    has_remote_description: bool,
    /// Whether this side's pending offer survives a glare collision.
    wins_glare: bool,
}

impl Negotiation {
    pub fn new(wins_glare: bool) -> Self {
        Self {
            state: NegotiationState::Idle,
            buffer: CandidateBuffer::new(),
            has_remote_description: false,
            wins_glare,
        }
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn buffered_candidates(&self) -> usize {
        self.buffer.len()
    }

    fn transition(&mut self, next: NegotiationState) {
        debug!("Negotiation {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// A compatible counterpart appeared in the room.
    pub fn peer_available(&mut self) -> Vec<NegotiationAction> {
        match self.state {
            NegotiationState::Idle | NegotiationState::WaitingPeer => {
                self.transition(NegotiationState::WaitingPeer);
                vec![NegotiationAction::RequestLocalReady]
            }
            other => {
                debug!("Peer available while {other:?}, nothing to do");
                Vec::new()
            }
        }
    }

    /// Local media is ready; produce an offer.
    pub fn start_offer(&mut self) -> Vec<NegotiationAction> {
        match self.state {
            NegotiationState::Idle | NegotiationState::WaitingPeer => {
                self.transition(NegotiationState::CreatingOffer);
                vec![NegotiationAction::BeginOffer]
            }
            other => {
                warn!("start_offer ignored while {other:?}");
                Vec::new()
            }
        }
    }

    /// The create-offer sub-task finished.
    pub fn offer_ready(
        &mut self,
        result: Result<String, PeerConnectionError>,
    ) -> Vec<NegotiationAction> {
        if self.state != NegotiationState::CreatingOffer {
            debug!("Offer completion while {:?}, dropping", self.state);
            return Vec::new();
        }
        match result {
            Ok(sdp) => {
                self.transition(NegotiationState::OfferSent);
                vec![NegotiationAction::SendOffer { sdp }]
            }
            Err(error) => self.fail(error),
        }
    }

    /// A remote offer arrived.
    pub fn remote_offer(&mut self, sdp: String) -> Vec<NegotiationAction> {
        match self.state {
            NegotiationState::Closed => {
                warn!("Offer received after close, ignoring");
                Vec::new()
            }
            NegotiationState::CreatingOffer | NegotiationState::OfferSent => {
                // Glare: both sides offered at once. Deterministic by
                // device role, never by chance.
                if self.wins_glare {
                    info!("Offer collision, holding our own offer");
                    return Vec::new();
                }
                info!("Offer collision, deferring to the remote offer");
                let mut actions = Vec::new();
                if self.state == NegotiationState::CreatingOffer {
                    actions.push(NegotiationAction::CancelTask);
                }
                self.transition(NegotiationState::CreatingAnswer);
                actions.push(NegotiationAction::BeginAnswer { sdp });
                actions
            }
            NegotiationState::CreatingAnswer => {
                warn!("Duplicate offer while answering, ignoring");
                Vec::new()
            }
            _ => {
                self.transition(NegotiationState::CreatingAnswer);
                vec![NegotiationAction::BeginAnswer { sdp }]
            }
        }
    }

    /// The remote description of the answer flow was applied (or not).
    pub fn remote_applied(
        &mut self,
        result: Result<(), PeerConnectionError>,
    ) -> Vec<NegotiationAction> {
        if self.state != NegotiationState::CreatingAnswer {
            debug!("Remote-description completion while {:?}, dropping", self.state);
            return Vec::new();
        }
        match result {
            Ok(()) => {
                self.has_remote_description = true;
                self.drain()
            }
            Err(error) => self.fail(error),
        }
    }

    /// The create-answer sub-task finished.
    pub fn answer_ready(
        &mut self,
        result: Result<String, PeerConnectionError>,
    ) -> Vec<NegotiationAction> {
        if self.state != NegotiationState::CreatingAnswer {
            debug!("Answer completion while {:?}, dropping", self.state);
            return Vec::new();
        }
        match result {
            Ok(sdp) => {
                self.transition(NegotiationState::Connected);
                vec![NegotiationAction::SendAnswer { sdp }]
            }
            Err(error) => self.fail(error),
        }
    }

    /// A remote answer arrived.
    pub fn remote_answer(&mut self, sdp: String) -> Vec<NegotiationAction> {
        match self.state {
            NegotiationState::OfferSent => {
                self.transition(NegotiationState::AwaitingAnswer);
                vec![NegotiationAction::ApplyAnswer { sdp }]
            }
            other => {
                warn!("Stale answer while {other:?}, ignoring");
                Vec::new()
            }
        }
    }

    /// The remote answer was applied (or not).
    pub fn answer_applied(
        &mut self,
        result: Result<(), PeerConnectionError>,
    ) -> Vec<NegotiationAction> {
        if self.state != NegotiationState::AwaitingAnswer {
            debug!("Answer-apply completion while {:?}, dropping", self.state);
            return Vec::new();
        }
        match result {
            Ok(()) => {
                self.has_remote_description = true;
                self.transition(NegotiationState::Connected);
                self.drain()
            }
            Err(error) => self.fail(error),
        }
    }

    /// A remote candidate arrived.
    pub fn remote_candidate(&mut self, record: IceCandidateRecord) -> Vec<NegotiationAction> {
        if self.state == NegotiationState::Closed {
            debug!("Candidate after close, ignoring");
            return Vec::new();
        }
        if self.has_remote_description {
            return vec![NegotiationAction::ApplyCandidates(vec![record])];
        }
        self.buffer.push(record);
        debug!("Buffered candidate ({} pending)", self.buffer.len());
        Vec::new()
    }

    /// The engine reported connectivity. Observational; returns whether
    /// this is the first time the session reached `Connected`.
    pub fn connectivity_established(&mut self) -> bool {
        if self.state == NegotiationState::Closed || self.state == NegotiationState::Connected {
            return false;
        }
        self.transition(NegotiationState::Connected);
        true
    }

    /// Reset for the rejoin path: back to `Idle` with an empty buffer.
    pub fn reset(&mut self) {
        self.buffer.discard();
        self.has_remote_description = false;
        self.transition(NegotiationState::Idle);
    }

    /// Terminal close.
    pub fn close(&mut self) {
        self.buffer.discard();
        self.has_remote_description = false;
        self.transition(NegotiationState::Closed);
    }

    fn drain(&mut self) -> Vec<NegotiationAction> {
        let pending = self.buffer.drain_if_ready(self.has_remote_description);
        if pending.is_empty() {
            Vec::new()
        } else {
            info!("Flushing {} buffered candidates", pending.len());
            vec![NegotiationAction::ApplyCandidates(pending)]
        }
    }

    fn fail(&mut self, error: PeerConnectionError) -> Vec<NegotiationAction> {
        let dropped = self.buffer.discard();
        if dropped > 0 {
            warn!("Discarding {dropped} buffered candidates after failure");
        }
        self.has_remote_description = false;
        self.transition(NegotiationState::Closed);
        vec![NegotiationAction::Fail(error)]
    }
}
