use spyglass_core::DeviceTag;

/// Role configuration of one endpoint in a two-party room.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Tag this endpoint announces.
    pub local_device: DeviceTag,
    /// Tag of the counterpart to pair with.
    pub peer_device: DeviceTag,
    /// Tag whose pending offer survives a simultaneous-offer collision.
    pub precedence_device: DeviceTag,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            local_device: DeviceTag::phone(),
            peer_device: DeviceTag::camera(),
            precedence_device: DeviceTag::camera(),
        }
    }
}

impl SessionConfig {
    /// Whether this side keeps its own pending offer during glare.
    pub fn wins_glare(&self) -> bool {
        self.local_device == self.precedence_device
    }
}
