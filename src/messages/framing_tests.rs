//! Tests for message framing and reassembly.

use bytes::{BufMut, BytesMut};

use super::framing::MessageBuffer;
use crate::errors::ProtocolError;

// Helper to create a ParameterStatus message
fn parameter_status_msg(name: &str, value: &str) -> Vec<u8> {
    let mut msg = Vec::new();
    msg.push(b'S');
    msg.extend_from_slice(&((4 + name.len() + 1 + value.len() + 1) as i32).to_be_bytes());
    msg.extend_from_slice(name.as_bytes());
    msg.push(0);
    msg.extend_from_slice(value.as_bytes());
    msg.push(0);
    msg
}

// Helper to create a ReadyForQuery message
fn ready_for_query_msg(status: u8) -> Vec<u8> {
    vec![b'Z', 0, 0, 0, 5, status]
}

#[test]
fn test_empty_buffer_yields_nothing() {
    let mut buffer = MessageBuffer::new();
    assert!(buffer.try_next().unwrap().is_none());
}

#[test]
fn test_whole_message_in_one_feed() {
    let mut buffer = MessageBuffer::new();
    buffer.extend(&parameter_status_msg("TimeZone", "UTC"));

    let (tag, body) = buffer.try_next().unwrap().unwrap();
    assert_eq!(tag, b'S');
    assert_eq!(body.as_ref(), b"TimeZone\0UTC\0");
    assert!(buffer.try_next().unwrap().is_none());
    assert!(buffer.is_empty());
}

#[test]
fn test_message_split_at_every_offset() {
    let msg = parameter_status_msg("server_version", "16.0");

    for split in 1..msg.len() {
        let mut buffer = MessageBuffer::new();
        buffer.extend(&msg[..split]);
        assert!(
            buffer.try_next().unwrap().is_none(),
            "incomplete frame must not decode (split at {split})"
        );

        buffer.extend(&msg[split..]);
        let (tag, body) = buffer.try_next().unwrap().unwrap();
        assert_eq!(tag, b'S');
        assert_eq!(body.as_ref(), b"server_version\016.0\0");
    }
}

#[test]
fn test_message_fed_byte_by_byte() {
    let msg = ready_for_query_msg(b'I');
    let mut buffer = MessageBuffer::new();

    for &byte in &msg[..msg.len() - 1] {
        buffer.extend(&[byte]);
        assert!(buffer.try_next().unwrap().is_none());
    }

    buffer.extend(&msg[msg.len() - 1..]);
    let (tag, body) = buffer.try_next().unwrap().unwrap();
    assert_eq!(tag, b'Z');
    assert_eq!(body.as_ref(), b"I");
}

#[test]
fn test_many_messages_in_one_feed() {
    let mut feed = Vec::new();
    feed.extend_from_slice(&parameter_status_msg("a", "1"));
    feed.extend_from_slice(&parameter_status_msg("b", "2"));
    feed.extend_from_slice(&ready_for_query_msg(b'I'));

    let mut buffer = MessageBuffer::new();
    buffer.extend(&feed);

    let (tag, _) = buffer.try_next().unwrap().unwrap();
    assert_eq!(tag, b'S');
    let (tag, body) = buffer.try_next().unwrap().unwrap();
    assert_eq!(tag, b'S');
    assert_eq!(body.as_ref(), b"b\x002\0");
    let (tag, _) = buffer.try_next().unwrap().unwrap();
    assert_eq!(tag, b'Z');
    assert!(buffer.try_next().unwrap().is_none());
}

#[test]
fn test_trailing_partial_message_is_kept() {
    let mut feed = Vec::new();
    feed.extend_from_slice(&ready_for_query_msg(b'I'));
    let next = parameter_status_msg("DateStyle", "ISO, MDY");
    feed.extend_from_slice(&next[..7]);

    let mut buffer = MessageBuffer::new();
    buffer.extend(&feed);

    let (tag, _) = buffer.try_next().unwrap().unwrap();
    assert_eq!(tag, b'Z');
    assert!(buffer.try_next().unwrap().is_none());

    buffer.extend(&next[7..]);
    let (tag, body) = buffer.try_next().unwrap().unwrap();
    assert_eq!(tag, b'S');
    assert_eq!(body.as_ref(), b"DateStyle\0ISO, MDY\0");
}

#[test]
fn test_declared_length_below_minimum_is_rejected() {
    let mut msg = BytesMut::new();
    msg.put_u8(b'Z');
    msg.put_i32(3);

    let mut buffer = MessageBuffer::new();
    buffer.extend(&msg);

    let err = buffer.try_next().unwrap_err();
    assert!(matches!(err, ProtocolError::BadLength(3)));
}

#[test]
fn test_oversized_length_is_rejected() {
    let mut msg = BytesMut::new();
    msg.put_u8(b'D');
    msg.put_i32(i32::MAX);

    let mut buffer = MessageBuffer::new();
    buffer.extend(&msg);

    let err = buffer.try_next().unwrap_err();
    assert!(matches!(err, ProtocolError::BadLength(_)));
}
