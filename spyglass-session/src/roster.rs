use spyglass_core::{DeviceTag, PeerId, RoomName, RoomPeer};
use tracing::{debug, info, warn};

/// What a membership event meant, as decided by the roster.
#[derive(Debug, Clone, PartialEq)]
pub enum RosterOutcome {
    PeerAvailable(RoomPeer),
    PeerLost(PeerId),
    /// The room would hold more than two participants.
    UnsupportedTopology { room: RoomName, participants: usize },
    Ignored,
}

/// Membership of the current rendezvous room.
///
/// Tracks which room was requested, the server-assigned local id, and the
/// single active counterpart. Mutated only by the session dispatcher.
#[derive(Debug, Clone)]
pub struct RoomRoster {
    expected_device: DeviceTag,
    room: Option<RoomName>,
    local: Option<PeerId>,
    peer: Option<RoomPeer>,
}

impl RoomRoster {
    pub fn new(expected_device: DeviceTag) -> Self {
        Self {
            expected_device,
            room: None,
            local: None,
            peer: None,
        }
    }

    pub fn room(&self) -> Option<&RoomName> {
        self.room.as_ref()
    }

    pub fn local(&self) -> Option<&PeerId> {
        self.local.as_ref()
    }

    pub fn peer(&self) -> Option<&RoomPeer> {
        self.peer.as_ref()
    }

    /// Record the room a `join` was sent for; membership events for any
    /// other room are ignored.
    pub fn expect_room(&mut self, room: RoomName) {
        self.room = Some(room);
    }

    /// Forget the current room and counterpart.
    pub fn clear(&mut self) {
        self.room = None;
        self.local = None;
        self.peer = None;
    }

    pub fn handle_joined(
        &mut self,
        room: RoomName,
        joiner: PeerId,
        local: PeerId,
        others: Vec<RoomPeer>,
    ) -> RosterOutcome {
        if self.room.as_ref() != Some(&room) {
            warn!("'joined' event for unrequested room '{room}', ignoring");
            return RosterOutcome::Ignored;
        }
        self.local = Some(local.clone());

        if joiner == local {
            // Local join confirmation: look for the counterpart among the
            // participants already present.
            if others.len() > 1 {
                warn!(
                    "Room '{room}' already holds {} participants, refusing to pick a role",
                    others.len()
                );
                return RosterOutcome::UnsupportedTopology {
                    room,
                    participants: others.len() + 1,
                };
            }
            match others
                .iter()
                .find(|p| p.device == self.expected_device)
            {
                Some(found) => {
                    info!("Room '{room}' joined, counterpart {} is online", found.id);
                    self.peer = Some(found.clone());
                    RosterOutcome::PeerAvailable(found.clone())
                }
                None => {
                    debug!("Room '{room}' joined, no counterpart online yet");
                    RosterOutcome::Ignored
                }
            }
        } else {
            // Another device entered the room after us.
            if let Some(existing) = &self.peer {
                if existing.id == joiner {
                    debug!("Duplicate 'joined' for known peer {joiner}, ignoring");
                    return RosterOutcome::Ignored;
                }
                warn!("Third participant {joiner} entered room '{room}'");
                return RosterOutcome::UnsupportedTopology {
                    room,
                    participants: 3,
                };
            }
            let device = others
                .iter()
                .find(|p| p.id == joiner)
                .map(|p| p.device.clone())
                .unwrap_or_else(|| self.expected_device.clone());
            let peer = RoomPeer {
                id: joiner,
                device,
            };
            info!("Counterpart {} entered room '{room}'", peer.id);
            self.peer = Some(peer.clone());
            RosterOutcome::PeerAvailable(peer)
        }
    }

    pub fn handle_left(&mut self, room: RoomName, id: PeerId) -> RosterOutcome {
        if self.room.as_ref() != Some(&room) {
            debug!("'leave' event for unrequested room '{room}', ignoring");
            return RosterOutcome::Ignored;
        }
        if self.peer.as_ref().map(|p| &p.id) == Some(&id) {
            info!("Counterpart {id} left room '{room}'");
            self.peer = None;
            return RosterOutcome::PeerLost(id);
        }
        debug!("'leave' for unknown participant {id}, ignoring");
        RosterOutcome::Ignored
    }
}
