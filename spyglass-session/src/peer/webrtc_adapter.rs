use super::{PeerConnection, PeerConnectionEvent};
use crate::error::PeerConnectionError;
use async_trait::async_trait;
use spyglass_core::{IceCandidateRecord, SdpKind, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// [`PeerConnection`] over the `webrtc` crate.
///
/// Locally gathered candidates and connectivity transitions are pushed
/// into `events`; the caller is expected to forward candidates through
/// the session. Media tracks are added by the caller via [`inner`].
///
/// [`inner`]: WebRtcPeerConnection::inner
pub struct WebRtcPeerConnection {
    pc: Arc<RTCPeerConnection>,
}

impl WebRtcPeerConnection {
    pub async fn new(
        ice_servers: Vec<String>,
        events: mpsc::Sender<PeerConnectionEvent>,
    ) -> Result<Self, PeerConnectionError> {
        let mut media_engine = MediaEngine::default();
        media_engine
            .register_default_codecs()
            .map_err(|e| PeerConnectionError::Engine(e.to_string()))?;

        let registry = register_default_interceptors(Registry::new(), &mut media_engine)
            .map_err(|e| PeerConnectionError::Engine(e.to_string()))?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let config = RTCConfiguration {
            ice_servers: if ice_servers.is_empty() {
                vec![]
            } else {
                vec![RTCIceServer {
                    urls: ice_servers,
                    ..Default::default()
                }]
            },
            ..Default::default()
        };

        let pc = Arc::new(
            api.new_peer_connection(config)
                .await
                .map_err(|e| PeerConnectionError::Engine(e.to_string()))?,
        );

        let candidate_events = events.clone();
        pc.on_ice_candidate(Box::new(move |candidate| {
            let events = candidate_events.clone();
            Box::pin(async move {
                let Some(candidate) = candidate else { return };
                match candidate.to_json() {
                    Ok(init) => {
                        let record = IceCandidateRecord {
                            sdp_mid: init.sdp_mid.unwrap_or_default(),
                            sdp_m_line_index: init.sdp_mline_index.unwrap_or(0),
                            candidate: init.candidate,
                        };
                        let _ = events
                            .send(PeerConnectionEvent::CandidateGathered(record))
                            .await;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to serialize local ICE candidate: {e}");
                    }
                }
            })
        }));

        pc.on_peer_connection_state_change(Box::new(move |state| {
            let events = events.clone();
            Box::pin(async move {
                tracing::debug!("Peer connection state: {state:?}");
                let event = match state {
                    RTCPeerConnectionState::Connected => Some(PeerConnectionEvent::Connected),
                    RTCPeerConnectionState::Failed => {
                        Some(PeerConnectionEvent::Failed("connectivity failed".to_string()))
                    }
                    _ => None,
                };
                if let Some(event) = event {
                    let _ = events.send(event).await;
                }
            })
        }));

        Ok(Self { pc })
    }

    /// The underlying connection, for adding media tracks and channels.
    pub fn inner(&self) -> Arc<RTCPeerConnection> {
        Arc::clone(&self.pc)
    }

    fn to_rtc(description: SessionDescription) -> Result<RTCSessionDescription, PeerConnectionError> {
        match description.kind {
            SdpKind::Offer => RTCSessionDescription::offer(description.sdp),
            SdpKind::Answer => RTCSessionDescription::answer(description.sdp),
        }
        .map_err(|e| PeerConnectionError::Engine(e.to_string()))
    }
}

#[async_trait]
impl PeerConnection for WebRtcPeerConnection {
    async fn create_offer(&self) -> Result<String, PeerConnectionError> {
        self.pc
            .create_offer(None)
            .await
            .map(|offer| offer.sdp)
            .map_err(|e| PeerConnectionError::CreateOffer(e.to_string()))
    }

    async fn create_answer(&self) -> Result<String, PeerConnectionError> {
        self.pc
            .create_answer(None)
            .await
            .map(|answer| answer.sdp)
            .map_err(|e| PeerConnectionError::CreateAnswer(e.to_string()))
    }

    async fn set_local_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), PeerConnectionError> {
        let desc = Self::to_rtc(description)?;
        self.pc
            .set_local_description(desc)
            .await
            .map_err(|e| PeerConnectionError::SetLocalDescription(e.to_string()))
    }

    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), PeerConnectionError> {
        let desc = Self::to_rtc(description)?;
        self.pc
            .set_remote_description(desc)
            .await
            .map_err(|e| PeerConnectionError::SetRemoteDescription(e.to_string()))
    }

    async fn add_ice_candidate(
        &self,
        candidate: IceCandidateRecord,
    ) -> Result<(), PeerConnectionError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: Some(candidate.sdp_mid),
            sdp_mline_index: Some(candidate.sdp_m_line_index),
            username_fragment: None,
        };
        self.pc
            .add_ice_candidate(init)
            .await
            .map_err(|e| PeerConnectionError::AddCandidate(e.to_string()))
    }

    async fn close(&self) -> Result<(), PeerConnectionError> {
        self.pc
            .close()
            .await
            .map_err(|e| PeerConnectionError::Engine(e.to_string()))
    }
}
