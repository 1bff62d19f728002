use crate::integration::{create_test_session, establish_peer};
use crate::utils::{PeerCall, offer_frame};

#[tokio::test]
async fn test_disconnect_aborts_an_inflight_answer() {
    let mut ts = create_test_session().await;
    establish_peer(&mut ts, "camera").await;

    // Hold create_answer long enough for disconnect to win the race.
    ts.pc.delay_answer(5_000);
    ts.transport
        .inject(offer_frame("room1", "self-1", "remote-offer"))
        .await;

    // Let the answer sub-task start before tearing down.
    let mut started = false;
    for _ in 0..50 {
        if ts
            .pc
            .call_index(&PeerCall::SetRemote("remote-offer".to_string()))
            .await
            .is_some()
        {
            started = true;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert!(started, "answer flow never started");

    let before = std::time::Instant::now();
    ts.session.disconnect().await.expect("disconnect failed");

    // Deterministic teardown: no waiting out the held create_answer.
    assert!(before.elapsed() < std::time::Duration::from_secs(2));
    assert!(ts.pc.call_index(&PeerCall::CreateAnswer).await.is_none());
    assert!(ts.pc.call_index(&PeerCall::Close).await.is_some());
    assert!(!ts.session.is_connected());

    // No answer ever leaves the session after teardown.
    let frames = ts.transport.sent_frames().await;
    let answered = frames.iter().any(|frame| {
        serde_json::from_slice::<serde_json::Value>(frame)
            .map(|v| v["data"]["message"]["type"] == "answer")
            .unwrap_or(false)
    });
    assert!(!answered);
}

#[tokio::test]
async fn test_disconnect_leaves_the_joined_room_first() {
    let mut ts = create_test_session().await;
    establish_peer(&mut ts, "camera").await;

    ts.session.disconnect().await.expect("disconnect failed");

    let frames = ts.transport.sent_frames().await;
    let left = frames.iter().any(|frame| {
        serde_json::from_slice::<serde_json::Value>(frame)
            .map(|v| v["event"] == "leave")
            .unwrap_or(false)
    });
    assert!(left, "disconnect should announce the leave");
}

#[tokio::test]
async fn test_disconnect_twice_is_harmless() {
    let ts = create_test_session().await;
    ts.session.disconnect().await.expect("first disconnect");
    ts.session.disconnect().await.expect("second disconnect");
}
