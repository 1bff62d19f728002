use crate::error::SessionError;
use crate::event::SessionEvent;
use crate::peer::{PeerConnection, PeerConnectionEvent};
use crate::session::command::SessionCommand;
use crate::session::config::SessionConfig;
use crate::session::dispatcher::Dispatcher;
use crate::transport::Transport;
use spyglass_core::{MEDIA_READY_NOTE, PeerId, RoomName, SignalingMessage};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

pub(crate) type ListenerSlot = Arc<Mutex<Option<mpsc::UnboundedSender<SessionEvent>>>>;

/// Consistent read-side view of the dispatcher's membership state.
/// Written only by the dispatch task.
#[derive(Debug, Default, Clone)]
pub struct SessionSnapshot {
    pub room: Option<RoomName>,
    pub peer: Option<PeerId>,
    pub left_room: bool,
}

/// Public facade of the signaling layer.
///
/// Owns the dispatch task driving room membership and call negotiation;
/// every mutation is serialized through its command queue, so the facade
/// may be shared freely across tasks.
pub struct SignalingSession {
    transport: Arc<dyn Transport>,
    pc: Mutex<Arc<dyn PeerConnection>>,
    config: SessionConfig,
    listener: ListenerSlot,
    snapshot: Arc<RwLock<SessionSnapshot>>,
    command_tx: Mutex<Option<mpsc::Sender<SessionCommand>>>,
    peer_tx: Mutex<Option<mpsc::Sender<PeerConnectionEvent>>>,
    actor: Mutex<Option<JoinHandle<()>>>,
}

impl SignalingSession {
    pub fn new(
        transport: Arc<dyn Transport>,
        pc: Arc<dyn PeerConnection>,
        config: SessionConfig,
    ) -> Self {
        Self {
            transport,
            pc: Mutex::new(pc),
            config,
            listener: Arc::new(Mutex::new(None)),
            snapshot: Arc::new(RwLock::new(SessionSnapshot::default())),
            command_tx: Mutex::new(None),
            peer_tx: Mutex::new(None),
            actor: Mutex::new(None),
        }
    }

    /// Register the single consumer of session events. Replacing the
    /// listener detaches the previous receiver.
    pub fn set_listener(&self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut slot) = self.listener.lock() {
            *slot = Some(tx);
        }
        rx
    }

    /// Establish the transport and start the dispatch task. Idempotent;
    /// transport failures surface as the returned error, reconnecting is
    /// the caller's decision.
    pub async fn connect(&self) -> Result<(), SessionError> {
        if self.is_connected() {
            debug!("connect() on an already connected session");
            return Ok(());
        }

        let (transport_tx, transport_rx) = mpsc::channel(256);
        self.transport.connect(transport_tx).await?;

        let (command_tx, command_rx) = mpsc::channel(64);
        let (peer_tx, peer_rx) = mpsc::channel(64);

        let pc = {
            let guard = self.pc.lock().map_err(|_| SessionError::Closed)?;
            Arc::clone(&guard)
        };
        let dispatcher = Dispatcher::new(
            Arc::clone(&self.transport),
            pc,
            self.config.clone(),
            Arc::clone(&self.snapshot),
            Arc::clone(&self.listener),
            command_rx,
            transport_rx,
            peer_rx,
        );
        let handle = tokio::spawn(dispatcher.run());

        if let Ok(mut slot) = self.command_tx.lock() {
            *slot = Some(command_tx);
        }
        if let Ok(mut slot) = self.peer_tx.lock() {
            *slot = Some(peer_tx);
        }
        if let Ok(mut slot) = self.actor.lock() {
            *slot = Some(handle);
        }
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.command_tx
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    /// Sender the peer-connection adapter pushes candidates and
    /// connectivity transitions into.
    pub fn peer_event_sender(&self) -> Result<mpsc::Sender<PeerConnectionEvent>, SessionError> {
        self.peer_tx
            .lock()
            .ok()
            .and_then(|slot| slot.clone())
            .ok_or(SessionError::NotConnected)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot
            .read()
            .map(|snapshot| snapshot.clone())
            .unwrap_or_default()
    }

    pub fn peer_id(&self) -> Option<PeerId> {
        self.snapshot().peer
    }

    pub fn room(&self) -> Option<RoomName> {
        self.snapshot().room
    }

    pub async fn join_room(&self, room: impl Into<RoomName>) -> Result<(), SessionError> {
        self.command(SessionCommand::Join { room: room.into() }).await
    }

    /// Leave `room`. `Disconnected` is emitted immediately, without
    /// waiting for a server acknowledgment, and the next `join_room`
    /// will announce a rejoin.
    pub async fn leave_room(&self, room: impl Into<RoomName>) -> Result<(), SessionError> {
        self.command(SessionCommand::Leave { room: room.into() }).await
    }

    /// Transmit an offer/answer/candidate payload to the active peer.
    /// Fails with [`SessionError::NoPeer`] when none is known yet; the
    /// message is dropped, never queued.
    pub async fn send_message(&self, message: SignalingMessage) -> Result<(), SessionError> {
        if message.is_payload() && self.peer_id().is_none() {
            return Err(SessionError::NoPeer);
        }
        self.command(SessionCommand::Send { message }).await
    }

    /// Tell the peer this endpoint's media is ready.
    pub async fn notify_ready(&self) -> Result<(), SessionError> {
        self.send_message(SignalingMessage::Notify {
            text: MEDIA_READY_NOTE.to_string(),
        })
        .await
    }

    /// Local media exists; drive the negotiation into creating an offer.
    pub async fn start_offer(&self) -> Result<(), SessionError> {
        self.command(SessionCommand::StartOffer).await
    }

    /// Swap in a fresh peer connection, e.g. after a rejoin.
    pub async fn attach_peer(&self, pc: Arc<dyn PeerConnection>) -> Result<(), SessionError> {
        if let Ok(mut slot) = self.pc.lock() {
            *slot = Arc::clone(&pc);
        }
        self.command(SessionCommand::AttachPeer { pc }).await
    }

    /// Tear the session down: cancels in-flight negotiation, releases
    /// the peer connection and closes the transport. Waits for the
    /// dispatch task to finish.
    pub async fn disconnect(&self) -> Result<(), SessionError> {
        let command_tx = {
            match self.command_tx.lock() {
                Ok(mut slot) => slot.take(),
                Err(_) => None,
            }
        };
        let Some(command_tx) = command_tx else {
            return Ok(());
        };
        let _ = command_tx.send(SessionCommand::Disconnect).await;

        let handle = {
            match self.actor.lock() {
                Ok(mut slot) => slot.take(),
                Err(_) => None,
            }
        };
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        if let Ok(mut slot) = self.peer_tx.lock() {
            slot.take();
        }
        Ok(())
    }

    async fn command(&self, command: SessionCommand) -> Result<(), SessionError> {
        let tx = self
            .command_tx
            .lock()
            .ok()
            .and_then(|slot| slot.clone())
            .ok_or(SessionError::NotConnected)?;
        tx.send(command).await.map_err(|_| SessionError::Closed)
    }
}
