use crate::integration::{create_test_session, establish_peer};
use crate::utils::{PeerCall, joined_frame, next_event, next_frame};
use spyglass_session::SessionEvent;

#[tokio::test]
async fn test_leave_room_emits_disconnected_immediately() {
    let mut ts = create_test_session().await;
    establish_peer(&mut ts, "camera").await;

    ts.session.leave_room("room1").await.expect("leave failed");

    // Emitted locally, without waiting for any server acknowledgment.
    let event = next_event(&mut ts.events).await;
    assert!(matches!(event, SessionEvent::Disconnected));

    // The leave went out and the engine was released.
    loop {
        let frame = next_frame(&mut ts.frames).await;
        if frame["event"] == "leave" {
            assert_eq!(frame["data"]["roomName"], "room1");
            break;
        }
    }
    assert!(ts.pc.call_index(&PeerCall::Close).await.is_some());
    assert!(ts.session.peer_id().is_none());
    assert!(ts.session.snapshot().left_room);
}

#[tokio::test]
async fn test_rejoin_is_announced_before_membership_events() {
    let mut ts = create_test_session().await;
    establish_peer(&mut ts, "camera").await;

    ts.session.leave_room("room1").await.expect("leave failed");
    let event = next_event(&mut ts.events).await;
    assert!(matches!(event, SessionEvent::Disconnected));

    // Joining again announces the rejoin first, so the caller can build
    // a fresh peer connection before anything else happens.
    ts.session.join_room("room1").await.expect("join failed");
    let event = next_event(&mut ts.events).await;
    assert!(
        matches!(event, SessionEvent::Rejoin),
        "expected Rejoin, got {event:?}"
    );

    ts.transport
        .inject(joined_frame("room1", "self-1", "self-1", &[("cam-2", "camera")]))
        .await;
    let event = next_event(&mut ts.events).await;
    match event {
        SessionEvent::PeerAvailable { peer } => assert_eq!(peer.id, "cam-2".into()),
        other => panic!("expected PeerAvailable, got {other:?}"),
    }
    assert!(!ts.session.snapshot().left_room);
}

#[tokio::test]
async fn test_peer_leaving_is_reported() {
    let mut ts = create_test_session().await;
    establish_peer(&mut ts, "camera").await;

    ts.transport
        .inject(crate::utils::left_frame("room1", "peer-1"))
        .await;

    let event = next_event(&mut ts.events).await;
    match event {
        SessionEvent::PeerLost { peer } => assert_eq!(peer, "peer-1".into()),
        other => panic!("expected PeerLost, got {other:?}"),
    }
    assert!(ts.session.peer_id().is_none());
}
