//! Unit tests for the HTTP client's endpoint surface.
//!
//! URL construction and wire-message encoding only — no network I/O.

use marksync::service::realtime::{topic_for, WireMessage};
use marksync::service::{HttpService, RealtimeClient};
use marksync::types::bookmark::Bookmark;

#[test]
fn authorize_url_names_the_provider() {
    let service = HttpService::new("https://project.example.co/", "anon-key").unwrap();
    assert_eq!(
        service.authorize_url("google"),
        "https://project.example.co/auth/v1/authorize?provider=google"
    );
}

#[test]
fn realtime_endpoint_swaps_schemes() {
    let secure = RealtimeClient::new("https://project.example.co", "anon-key");
    assert_eq!(
        secure.endpoint(),
        "wss://project.example.co/realtime/v1/websocket?apikey=anon-key"
    );

    let plain = RealtimeClient::new("http://127.0.0.1:54321/", "anon-key");
    assert_eq!(
        plain.endpoint(),
        "ws://127.0.0.1:54321/realtime/v1/websocket?apikey=anon-key"
    );
}

#[test]
fn topic_is_scoped_to_the_owner() {
    assert_eq!(topic_for("user-1"), "bookmarks:user-1");
}

#[test]
fn wire_messages_round_trip_through_json() {
    let record = Bookmark {
        id: 5,
        title: "Example".to_string(),
        url: "https://example.com".to_string(),
        owner: "user-1".to_string(),
    };
    let msg = WireMessage::Insert {
        message_id: uuid::Uuid::new_v4(),
        topic: topic_for("user-1"),
        record,
    };

    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("\"type\":\"insert\""));

    match serde_json::from_str::<WireMessage>(&json).unwrap() {
        WireMessage::Insert { record, topic, .. } => {
            assert_eq!(topic, "bookmarks:user-1");
            assert_eq!(record.id, 5);
        }
        other => panic!("Expected Insert, got {:?}", other),
    }
}

#[test]
fn delete_wire_message_carries_only_the_id() {
    let json = r#"{"type":"delete","message_id":"9f0c2f4e-9d5c-4b6a-8a2e-3c1d2e4f5a6b","topic":"bookmarks:user-1","id":7}"#;
    match serde_json::from_str::<WireMessage>(json).unwrap() {
        WireMessage::Delete { id, .. } => assert_eq!(id, 7),
        other => panic!("Expected Delete, got {:?}", other),
    }
}
