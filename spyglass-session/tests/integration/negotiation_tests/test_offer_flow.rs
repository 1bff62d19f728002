use crate::integration::{create_test_session, establish_peer};
use crate::utils::{MOCK_OFFER_SDP, PeerCall, answer_frame, wait_for_payload};

#[tokio::test]
async fn test_start_offer_sends_offer_through_the_room() {
    let mut ts = create_test_session().await;
    establish_peer(&mut ts, "camera").await;

    ts.session.start_offer().await.expect("start_offer failed");

    let frame = wait_for_payload(&mut ts.frames, "offer").await;
    assert_eq!(frame["data"]["message"]["sdp"], MOCK_OFFER_SDP);
    // Outgoing payloads are addressed to the active peer.
    assert_eq!(frame["data"]["roomName"], "room1");
    assert_eq!(frame["data"]["peerId"], "peer-1");

    let calls = ts.pc.calls().await;
    assert_eq!(
        calls,
        vec![
            PeerCall::CreateOffer,
            PeerCall::SetLocal(MOCK_OFFER_SDP.to_string()),
        ]
    );
}

#[tokio::test]
async fn test_answer_applies_as_remote_description() {
    let mut ts = create_test_session().await;
    establish_peer(&mut ts, "camera").await;

    ts.session.start_offer().await.expect("start_offer failed");
    wait_for_payload(&mut ts.frames, "offer").await;

    ts.transport
        .inject(answer_frame("room1", "self-1", "remote-answer"))
        .await;

    let expected = PeerCall::SetRemote("remote-answer".to_string());
    let mut found = false;
    for _ in 0..50 {
        if ts.pc.call_index(&expected).await.is_some() {
            found = true;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert!(found, "remote answer was never applied");
}

#[tokio::test]
async fn test_remote_offer_is_answered() {
    let mut ts = create_test_session().await;
    establish_peer(&mut ts, "camera").await;

    ts.transport
        .inject(crate::utils::offer_frame("room1", "self-1", "remote-offer"))
        .await;

    let frame = wait_for_payload(&mut ts.frames, "answer").await;
    assert_eq!(frame["data"]["message"]["sdp"], crate::utils::MOCK_ANSWER_SDP);

    let calls = ts.pc.calls().await;
    let set_remote = ts
        .pc
        .call_index(&PeerCall::SetRemote("remote-offer".to_string()))
        .await
        .expect("remote offer not applied");
    let create_answer = ts
        .pc
        .call_index(&PeerCall::CreateAnswer)
        .await
        .expect("answer not created");
    let set_local = ts
        .pc
        .call_index(&PeerCall::SetLocal(crate::utils::MOCK_ANSWER_SDP.to_string()))
        .await
        .expect("local answer not set");
    assert!(set_remote < create_answer, "call order wrong: {calls:?}");
    assert!(create_answer < set_local, "call order wrong: {calls:?}");
}
