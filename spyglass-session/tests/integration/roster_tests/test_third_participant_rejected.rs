use crate::integration::{create_test_session, establish_peer};
use crate::utils::{joined_frame, next_event};
use spyglass_session::SessionEvent;

#[tokio::test]
async fn test_third_participant_rejected() {
    let mut ts = create_test_session().await;
    establish_peer(&mut ts, "camera").await;

    // A third device shows up in a strictly two-party room.
    ts.transport
        .inject(joined_frame("room1", "intruder", "self-1", &[]))
        .await;

    let event = next_event(&mut ts.events).await;
    match event {
        SessionEvent::UnsupportedTopology { room, participants } => {
            assert_eq!(room, "room1".into());
            assert_eq!(participants, 3);
        }
        other => panic!("expected UnsupportedTopology, got {other:?}"),
    }

    // The existing pairing is untouched.
    assert_eq!(ts.session.peer_id(), Some("peer-1".into()));
}

#[tokio::test]
async fn test_crowded_room_on_join_is_rejected() {
    let mut ts = create_test_session().await;

    crate::integration::join_and_flush(&mut ts, "room1").await;
    ts.transport
        .inject(joined_frame(
            "room1",
            "self-1",
            "self-1",
            &[("cam-1", "camera"), ("cam-2", "camera")],
        ))
        .await;

    let event = next_event(&mut ts.events).await;
    match event {
        SessionEvent::UnsupportedTopology { participants, .. } => {
            assert_eq!(participants, 3);
        }
        other => panic!("expected UnsupportedTopology, got {other:?}"),
    }
    assert!(ts.session.peer_id().is_none());
}
