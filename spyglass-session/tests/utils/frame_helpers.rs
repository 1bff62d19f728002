use bytes::Bytes;
use serde_json::{Value, json};

fn to_frame(value: Value) -> Bytes {
    Bytes::from(serde_json::to_vec(&value).expect("frame serialization"))
}

/// Server confirmation that `socket_id` entered `room`.
pub fn joined_frame(room: &str, socket_id: &str, my_id: &str, others: &[(&str, &str)]) -> Bytes {
    let others: Vec<Value> = others
        .iter()
        .map(|(id, device)| json!({ "id": id, "device": device }))
        .collect();
    to_frame(json!({
        "event": "joined",
        "data": {
            "roomName": room,
            "socketId": socket_id,
            "myId": my_id,
            "otherIds": others,
        },
    }))
}

pub fn left_frame(room: &str, id: &str) -> Bytes {
    to_frame(json!({
        "event": "leave",
        "data": { "roomName": room, "id": id },
    }))
}

pub fn offer_frame(room: &str, peer: &str, sdp: &str) -> Bytes {
    payload_frame(room, peer, json!({ "type": "offer", "sdp": sdp }))
}

pub fn answer_frame(room: &str, peer: &str, sdp: &str) -> Bytes {
    payload_frame(room, peer, json!({ "type": "answer", "sdp": sdp }))
}

pub fn candidate_frame(room: &str, peer: &str, candidate: &str, label: u16, id: &str) -> Bytes {
    payload_frame(
        room,
        peer,
        json!({ "type": "candidate", "candidate": candidate, "label": label, "id": id }),
    )
}

pub fn notify_frame(room: &str, peer: &str, text: &str) -> Bytes {
    payload_frame(room, peer, json!(text))
}

fn payload_frame(room: &str, peer: &str, message: Value) -> Bytes {
    to_frame(json!({
        "event": "message",
        "data": { "roomName": room, "peerId": peer, "message": message },
    }))
}
