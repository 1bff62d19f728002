use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned by the rendezvous server to a connected endpoint.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
pub struct PeerId(pub String);

impl From<&str> for PeerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PeerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role tag a participant announces when entering a room ("camera",
/// "phone", ...). An empty tag means the participant did not announce one.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
pub struct DeviceTag(pub String);

impl DeviceTag {
    /// Tag announced by the remote camera endpoint.
    pub fn camera() -> Self {
        Self("camera".to_string())
    }

    /// Tag announced by the viewer endpoint.
    pub fn phone() -> Self {
        Self("phone".to_string())
    }

    pub fn unknown() -> Self {
        Self(String::new())
    }

    pub fn is_unknown(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for DeviceTag {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for DeviceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One room participant as listed by the server roster.
#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq)]
pub struct RoomPeer {
    pub id: PeerId,
    pub device: DeviceTag,
}

impl RoomPeer {
    pub fn new(id: impl Into<PeerId>, device: impl Into<DeviceTag>) -> Self {
        Self {
            id: id.into(),
            device: device.into(),
        }
    }
}
