//! Tests for the Telegram channel module.

use super::polling::decode_update;
use super::types::*;
use super::TelegramChannel;
use crate::utils::{split_message, truncate_chars};
use relay_core::config::TelegramConfig;
use serde_json::json;

#[test]
fn test_split_short_message() {
    let chunks = split_message("hello", 4000);
    assert_eq!(chunks, vec!["hello"]);
}

#[test]
fn test_split_long_message() {
    let text = "a\n".repeat(3000);
    let chunks = split_message(&text, 4000);
    assert!(chunks.len() >= 2);
    for chunk in &chunks {
        assert!(chunk.len() <= 4000);
    }
    assert_eq!(chunks.concat(), text);
}

#[test]
fn test_split_without_newlines_is_fixed_width() {
    let text = "x".repeat(9000);
    let chunks = split_message(&text, 4000);
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].len(), 4000);
    assert_eq!(chunks[1].len(), 4000);
    assert_eq!(chunks[2].len(), 1000);
}

#[test]
fn test_split_message_multibyte() {
    // Each Cyrillic char is 2 bytes in UTF-8. 100 chars = 200 bytes.
    let text = "\u{0411}".repeat(100);
    let chunks = split_message(&text, 151);
    for chunk in &chunks {
        assert!(chunk.len() <= 151);
    }
    assert_eq!(chunks.concat(), text);
}

#[test]
fn test_split_message_limit_below_char_width() {
    let text = "\u{1f30d}".repeat(3);
    let chunks = split_message(&text, 2);
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks.concat(), text);
}

#[test]
fn test_truncate_chars() {
    assert_eq!(truncate_chars("abcdef", 3), "abc");
    assert_eq!(truncate_chars("ab", 3), "ab");
    assert_eq!(truncate_chars("\u{1f30d}\u{1f30d}", 1), "\u{1f30d}");
}

#[test]
fn test_decode_text_update() {
    let raw = json!({
        "update_id": 501,
        "message": {
            "message_id": 1,
            "from": {"id": 42, "first_name": "Ada", "username": "ada"},
            "chat": {"id": 42, "type": "private"},
            "text": "/status"
        }
    });
    let msg = decode_update(raw).unwrap();
    assert_eq!(msg.update_id, 501);
    assert_eq!(msg.sender_id.as_deref(), Some("42"));
    assert_eq!(msg.sender_name.as_deref(), Some("@ada"));
    assert_eq!(msg.text, "/status");
}

#[test]
fn test_decode_update_without_message_is_acknowledged() {
    let raw = json!({"update_id": 9, "edited_message": {"text": "x"}});
    let msg = decode_update(raw).unwrap();
    assert_eq!(msg.update_id, 9);
    assert!(msg.text.is_empty());
    assert!(msg.sender_id.is_none());
}

#[test]
fn test_decode_malformed_sender_is_tolerated() {
    let raw = json!({
        "update_id": 10,
        "message": {"from": {"id": {"nested": true}}, "text": "hello"}
    });
    let msg = decode_update(raw).unwrap();
    assert_eq!(msg.text, "hello");
    assert!(msg.sender_id.is_none());

    let raw = json!({"update_id": 11, "message": {"text": "no sender"}});
    let msg = decode_update(raw).unwrap();
    assert!(msg.sender_id.is_none());
}

#[test]
fn test_decode_malformed_message_still_yields_offset() {
    let raw = json!({"update_id": 12, "message": {"text": 5}});
    let msg = decode_update(raw).unwrap();
    assert_eq!(msg.update_id, 12);
    assert!(msg.text.is_empty());
}

#[test]
fn test_decode_missing_update_id_dropped() {
    assert!(decode_update(json!({"message": {"text": "x"}})).is_none());
}

#[test]
fn test_sender_name_fallbacks() {
    let msg: TgMessage = serde_json::from_value(json!({
        "from": {"id": 1, "first_name": "Grace", "last_name": "Hopper"},
        "text": "hi"
    }))
    .unwrap();
    assert_eq!(msg.sender_name().as_deref(), Some("Grace Hopper"));

    let msg: TgMessage =
        serde_json::from_value(json!({"from": {"id": "77"}, "text": "hi"})).unwrap();
    assert_eq!(msg.sender_id().as_deref(), Some("77"));
    assert!(msg.sender_name().is_none());
}

#[test]
fn test_api_error_response_shape() {
    let resp: TgResponse<Vec<serde_json::Value>> = serde_json::from_value(json!({
        "ok": false,
        "error_code": 409,
        "description": "Conflict: terminated by other getUpdates request"
    }))
    .unwrap();
    assert!(!resp.ok);
    assert!(resp.result.is_none());
    assert!(resp.description.unwrap().contains("Conflict"));
}

#[test]
fn test_channel_from_config() {
    let cfg = TelegramConfig {
        bot_token: "123:abc".into(),
        chat_id: "42".into(),
        max_message_len: 0,
        ..Default::default()
    };
    let channel = TelegramChannel::new(&cfg);
    assert_eq!(channel.base_url, "https://api.telegram.org/bot123:abc");
    assert_eq!(channel.chat_id, "42");
    assert_eq!(channel.max_message_len, 1, "zero length clamps to one");
}
