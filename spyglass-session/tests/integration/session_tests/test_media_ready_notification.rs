use crate::integration::{create_camera_session, establish_peer};
use crate::utils::{next_event, notify_frame};
use spyglass_session::SessionEvent;

#[tokio::test]
async fn test_remote_media_note_surfaces_as_peer_ready() {
    // Camera side: the viewer announces its media, which is the cue to
    // start offering.
    let mut ts = create_camera_session().await;
    establish_peer(&mut ts, "phone").await;

    ts.transport
        .inject(notify_frame("room1", "self-1", "got user media"))
        .await;

    let event = next_event(&mut ts.events).await;
    match event {
        SessionEvent::PeerReady { note } => assert_eq!(note, "got user media"),
        other => panic!("expected PeerReady, got {other:?}"),
    }
}
