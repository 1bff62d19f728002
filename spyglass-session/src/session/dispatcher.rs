use crate::error::{PeerConnectionError, TransportError};
use crate::event::SessionEvent;
use crate::negotiation::{Negotiation, NegotiationAction};
use crate::peer::{PeerConnection, PeerConnectionEvent};
use crate::roster::{RoomRoster, RosterOutcome};
use crate::session::command::SessionCommand;
use crate::session::config::SessionConfig;
use crate::session::signaling_session::{ListenerSlot, SessionSnapshot};
use crate::transport::{Transport, TransportEvent};
use spyglass_core::{MessageCodec, SessionDescription, SignalingMessage};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Completion of a peer-connection sub-task, fed back into the
/// dispatch loop so all state changes stay on one task.
pub(crate) enum NegotiationUpdate {
    OfferReady(Result<String, PeerConnectionError>),
    RemoteApplied(Result<(), PeerConnectionError>),
    AnswerReady(Result<String, PeerConnectionError>),
    AnswerApplied(Result<(), PeerConnectionError>),
}

pub(crate) struct Dispatcher {
    codec: MessageCodec,
    roster: RoomRoster,
    negotiation: Negotiation,
    pc: Arc<dyn PeerConnection>,
    transport: Arc<dyn Transport>,
    snapshot: Arc<RwLock<SessionSnapshot>>,
    listener: ListenerSlot,
    command_rx: mpsc::Receiver<SessionCommand>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    peer_rx: mpsc::Receiver<PeerConnectionEvent>,
    update_tx: mpsc::Sender<NegotiationUpdate>,
    update_rx: mpsc::Receiver<NegotiationUpdate>,
    /// In-flight peer-connection sub-task, aborted on cancellation.
    task: Option<JoinHandle<()>>,
    left_room: bool,
}

impl Dispatcher {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        pc: Arc<dyn PeerConnection>,
        config: SessionConfig,
        snapshot: Arc<RwLock<SessionSnapshot>>,
        listener: ListenerSlot,
        command_rx: mpsc::Receiver<SessionCommand>,
        transport_rx: mpsc::Receiver<TransportEvent>,
        peer_rx: mpsc::Receiver<PeerConnectionEvent>,
    ) -> Self {
        let (update_tx, update_rx) = mpsc::channel(64);
        Self {
            codec: MessageCodec::new(),
            roster: RoomRoster::new(config.peer_device.clone()),
            negotiation: Negotiation::new(config.wins_glare()),
            pc,
            transport,
            snapshot,
            listener,
            command_rx,
            transport_rx,
            peer_rx,
            update_tx,
            update_rx,
            task: None,
            left_room: false,
        }
    }

    pub(crate) async fn run(mut self) {
        info!("Session dispatch loop started");

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) => {
                            if !self.handle_command(c).await {
                                break;
                            }
                        }
                        None => {
                            info!("Command channel closed. Shutting down session.");
                            self.shutdown().await;
                            break;
                        }
                    }
                }

                evt = self.transport_rx.recv() => {
                    match evt {
                        Some(e) => self.handle_transport_event(e).await,
                        None => {
                            warn!("Transport channel closed unexpectedly");
                            self.shutdown().await;
                            break;
                        }
                    }
                }

                evt = self.peer_rx.recv() => {
                    if let Some(e) = evt {
                        self.handle_peer_event(e).await;
                    }
                }

                upd = self.update_rx.recv() => {
                    if let Some(u) = upd {
                        self.handle_update(u).await;
                    }
                }
            }
        }

        info!("Session dispatch loop finished");
    }

    /// Returns `false` once the session must stop.
    async fn handle_command(&mut self, command: SessionCommand) -> bool {
        match command {
            SessionCommand::Join { room } => {
                if self.left_room {
                    self.emit(SessionEvent::Rejoin);
                    self.left_room = false;
                }
                info!("Joining room '{room}'");
                self.roster.expect_room(room.clone());
                self.codec.set_route(Some(room.clone()), None);
                self.sync_snapshot();
                self.send_frame(SignalingMessage::Join { room }).await;
            }

            SessionCommand::Leave { room } => {
                info!("Leaving room '{room}'");
                self.send_frame(SignalingMessage::Leave { room }).await;
                self.left_room = true;
                self.cancel_task();
                self.negotiation.reset();
                if let Err(e) = self.pc.close().await {
                    debug!("Peer connection close: {e}");
                }
                self.roster.clear();
                self.codec.set_route(None, None);
                self.sync_snapshot();
                // Local emission, not waiting for a server acknowledgment.
                self.emit(SessionEvent::Disconnected);
            }

            SessionCommand::Send { message } => {
                if message.is_payload() && self.roster.peer().is_none() {
                    warn!("Dropping outbound message: no active peer");
                    return true;
                }
                self.send_frame(message).await;
            }

            SessionCommand::StartOffer => {
                if self.roster.peer().is_none() {
                    warn!("start_offer ignored: no active peer");
                    return true;
                }
                let actions = self.negotiation.start_offer();
                self.execute(actions).await;
            }

            SessionCommand::AttachPeer { pc } => {
                info!("Attaching a fresh peer connection");
                self.cancel_task();
                self.pc = pc;
                self.negotiation.reset();
            }

            SessionCommand::Disconnect => {
                self.shutdown().await;
                return false;
            }
        }
        true
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Frame(frame) => match self.codec.decode(&frame) {
                Ok(message) => self.dispatch_message(message).await,
                Err(e) => warn!("Dropping undecodable frame: {e}"),
            },
            TransportEvent::Closed => {
                warn!("Transport closed");
                self.cancel_task();
                self.negotiation.close();
                self.emit(SessionEvent::ConnectionError {
                    error: TransportError::Closed,
                });
                self.emit(SessionEvent::Disconnected);
            }
        }
    }

    /// Membership events go to the roster, call payloads to the
    /// negotiation machine, in that order of priority.
    async fn dispatch_message(&mut self, message: SignalingMessage) {
        match message {
            SignalingMessage::RoomJoined {
                room,
                joiner,
                local,
                others,
            } => match self.roster.handle_joined(room, joiner, local, others) {
                RosterOutcome::PeerAvailable(peer) => {
                    self.codec
                        .set_route(self.roster.room().cloned(), Some(peer.id.clone()));
                    self.sync_snapshot();
                    self.emit(SessionEvent::PeerAvailable { peer });
                    let actions = self.negotiation.peer_available();
                    self.execute(actions).await;
                }
                RosterOutcome::UnsupportedTopology { room, participants } => {
                    self.emit(SessionEvent::UnsupportedTopology { room, participants });
                }
                RosterOutcome::PeerLost(_) | RosterOutcome::Ignored => {}
            },

            SignalingMessage::RoomLeft { room, id } => {
                if let RosterOutcome::PeerLost(peer) = self.roster.handle_left(room, id) {
                    self.codec.set_route(self.roster.room().cloned(), None);
                    self.sync_snapshot();
                    self.cancel_task();
                    self.negotiation.reset();
                    self.emit(SessionEvent::PeerLost { peer });
                }
            }

            SignalingMessage::Offer { sdp } => {
                self.emit(SessionEvent::OfferReceived { sdp: sdp.clone() });
                let actions = self.negotiation.remote_offer(sdp);
                self.execute(actions).await;
            }

            SignalingMessage::Answer { sdp } => {
                self.emit(SessionEvent::AnswerReceived { sdp: sdp.clone() });
                let actions = self.negotiation.remote_answer(sdp);
                self.execute(actions).await;
            }

            SignalingMessage::Candidate(record) => {
                self.emit(SessionEvent::CandidateReceived {
                    candidate: record.clone(),
                });
                let actions = self.negotiation.remote_candidate(record);
                self.execute(actions).await;
            }

            SignalingMessage::Notify { text } => {
                self.emit(SessionEvent::PeerReady { note: text });
            }

            SignalingMessage::Join { .. } | SignalingMessage::Leave { .. } => {
                debug!("Ignoring echoed client event");
            }

            SignalingMessage::Unrecognized { event } => {
                warn!("Ignoring unrecognized signaling event '{event}'");
            }
        }
    }

    async fn handle_peer_event(&mut self, event: PeerConnectionEvent) {
        match event {
            PeerConnectionEvent::CandidateGathered(record) => {
                if self.roster.peer().is_none() {
                    warn!("Dropping local candidate: no active peer");
                    return;
                }
                self.send_frame(SignalingMessage::Candidate(record)).await;
            }
            PeerConnectionEvent::Connected => {
                if self.negotiation.connectivity_established() {
                    self.emit(SessionEvent::Connected);
                }
            }
            PeerConnectionEvent::Failed(reason) => {
                warn!("Peer connection failed: {reason}");
                self.cancel_task();
                self.negotiation.close();
                if let Err(e) = self.pc.close().await {
                    debug!("Peer connection close: {e}");
                }
                self.emit(SessionEvent::NegotiationFailed {
                    error: PeerConnectionError::Engine(reason),
                });
            }
        }
    }

    async fn handle_update(&mut self, update: NegotiationUpdate) {
        let actions = match update {
            NegotiationUpdate::OfferReady(result) => self.negotiation.offer_ready(result),
            NegotiationUpdate::RemoteApplied(result) => self.negotiation.remote_applied(result),
            NegotiationUpdate::AnswerReady(result) => self.negotiation.answer_ready(result),
            NegotiationUpdate::AnswerApplied(result) => self.negotiation.answer_applied(result),
        };
        self.execute(actions).await;
    }

    async fn execute(&mut self, actions: Vec<NegotiationAction>) {
        for action in actions {
            match action {
                NegotiationAction::BeginOffer => {
                    self.cancel_task();
                    let pc = Arc::clone(&self.pc);
                    let tx = self.update_tx.clone();
                    self.task = Some(tokio::spawn(async move {
                        let result: Result<String, PeerConnectionError> = async {
                            let sdp = pc.create_offer().await?;
                            pc.set_local_description(SessionDescription::offer(sdp.clone()))
                                .await?;
                            Ok(sdp)
                        }
                        .await;
                        let _ = tx.send(NegotiationUpdate::OfferReady(result)).await;
                    }));
                }

                NegotiationAction::BeginAnswer { sdp } => {
                    self.cancel_task();
                    let pc = Arc::clone(&self.pc);
                    let tx = self.update_tx.clone();
                    self.task = Some(tokio::spawn(async move {
                        if let Err(e) = pc
                            .set_remote_description(SessionDescription::offer(sdp))
                            .await
                        {
                            let _ = tx.send(NegotiationUpdate::RemoteApplied(Err(e))).await;
                            return;
                        }
                        let _ = tx.send(NegotiationUpdate::RemoteApplied(Ok(()))).await;

                        let result: Result<String, PeerConnectionError> = async {
                            let answer = pc.create_answer().await?;
                            pc.set_local_description(SessionDescription::answer(answer.clone()))
                                .await?;
                            Ok(answer)
                        }
                        .await;
                        let _ = tx.send(NegotiationUpdate::AnswerReady(result)).await;
                    }));
                }

                NegotiationAction::ApplyAnswer { sdp } => {
                    self.cancel_task();
                    let pc = Arc::clone(&self.pc);
                    let tx = self.update_tx.clone();
                    self.task = Some(tokio::spawn(async move {
                        let result = pc
                            .set_remote_description(SessionDescription::answer(sdp))
                            .await;
                        let _ = tx.send(NegotiationUpdate::AnswerApplied(result)).await;
                    }));
                }

                NegotiationAction::SendOffer { sdp } => {
                    self.send_frame(SignalingMessage::Offer { sdp }).await;
                }

                NegotiationAction::SendAnswer { sdp } => {
                    self.send_frame(SignalingMessage::Answer { sdp }).await;
                }

                NegotiationAction::ApplyCandidates(records) => {
                    for record in records {
                        if let Err(e) = self.pc.add_ice_candidate(record).await {
                            warn!("Failed to add ICE candidate: {e}");
                        }
                    }
                }

                NegotiationAction::CancelTask => self.cancel_task(),

                NegotiationAction::RequestLocalReady => {
                    self.emit(SessionEvent::RequestLocalReady);
                }

                NegotiationAction::Fail(error) => {
                    self.cancel_task();
                    if let Err(e) = self.pc.close().await {
                        debug!("Peer connection close: {e}");
                    }
                    self.emit(SessionEvent::NegotiationFailed { error });
                }
            }
        }
    }

    async fn shutdown(&mut self) {
        if let Some(room) = self.roster.room().cloned()
            && !self.left_room
        {
            self.send_frame(SignalingMessage::Leave { room }).await;
        }
        self.cancel_task();
        self.negotiation.close();
        if let Err(e) = self.pc.close().await {
            debug!("Peer connection close: {e}");
        }
        if let Err(e) = self.transport.close().await {
            debug!("Transport close: {e}");
        }
        self.roster.clear();
        self.codec.set_route(None, None);
        self.sync_snapshot();
        self.emit(SessionEvent::Disconnected);
    }

    async fn send_frame(&mut self, message: SignalingMessage) {
        let frame = match self.codec.encode(&message) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Failed to encode outgoing message: {e}");
                return;
            }
        };
        if let Err(error) = self.transport.send(frame).await {
            warn!("Transport send failed: {error}");
            self.emit(SessionEvent::ConnectionError { error });
        }
    }

    fn emit(&self, event: SessionEvent) {
        if let Ok(slot) = self.listener.lock()
            && let Some(tx) = slot.as_ref()
            && tx.send(event).is_err()
        {
            debug!("Listener receiver dropped");
        }
    }

    fn sync_snapshot(&self) {
        if let Ok(mut snapshot) = self.snapshot.write() {
            snapshot.room = self.roster.room().cloned();
            snapshot.peer = self.roster.peer().map(|p| p.id.clone());
            snapshot.left_room = self.left_room;
        }
    }

    fn cancel_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
