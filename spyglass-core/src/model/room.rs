use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a rendezvous room used to pair two signaling participants.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
pub struct RoomName(pub String);

impl From<&str> for RoomName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RoomName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
