mod candidate_buffer;
mod state_machine;

pub use candidate_buffer::CandidateBuffer;
pub use state_machine::{Negotiation, NegotiationAction, NegotiationState};
