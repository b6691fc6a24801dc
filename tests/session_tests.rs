//! Session Tests
//!
//! Tests drive a session over an in-memory stream and verify:
//! - ASSIGN/UPDATE semantics on the entry table
//! - Informational messages leave the table alone
//! - Faults for unknown ids and unknown message kinds
//! - The end-to-end HELLO / ASSIGN / UPDATE exchange

use std::io::{self, Cursor, Read, Write};
use ntsync::protocol::{encode_message, Message, TypeTag, Value, PROTOCOL_VERSION};
use ntsync::{NtError, Session, SessionState};

// =============================================================================
// Helper Functions
// =============================================================================

/// Stream that serves canned inbound bytes and records what was written
struct MockStream {
    inbound: Cursor<Vec<u8>>,
    outbound: Vec<u8>,
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inbound.read(buf)
    }
}

impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.outbound.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn session_with(messages: &[Message]) -> Session<MockStream> {
    let inbound = messages
        .iter()
        .flat_map(|m| encode_message(m).unwrap().to_vec())
        .collect();
    session_with_bytes(inbound)
}

fn session_with_bytes(inbound: Vec<u8>) -> Session<MockStream> {
    let stream = MockStream {
        inbound: Cursor::new(inbound),
        outbound: Vec::new(),
    };
    Session::handshake(stream, PROTOCOL_VERSION).unwrap()
}

// =============================================================================
// Handshake Tests
// =============================================================================

#[test]
fn test_handshake_sends_hello() {
    let session = session_with(&[]);
    assert_eq!(session.get_ref().outbound, vec![0x01, 0x02, 0x00]);
    assert_eq!(session.state(), SessionState::Established);
    assert!(session.table().is_empty());
}

#[test]
fn test_handshake_with_custom_version() {
    let stream = MockStream {
        inbound: Cursor::new(Vec::new()),
        outbound: Vec::new(),
    };
    let session = Session::handshake(stream, 0x0300).unwrap();
    assert_eq!(session.get_ref().outbound, vec![0x01, 0x03, 0x00]);
    assert_eq!(session.protocol_version(), 0x0300);
}

// =============================================================================
// Assign / Update Tests
// =============================================================================

#[test]
fn test_assign_then_update_preserves_identity() {
    let mut session = session_with(&[
        Message::assign(5, 1, "x", Value::Number(1.0)),
        Message::update(5, 2, Value::Number(2.0)),
    ]);

    session.process().unwrap();
    session.process().unwrap();

    let entry = session.table().get(5).unwrap();
    assert_eq!(entry.name, b"x");
    assert_eq!(entry.entry_type(), Some(TypeTag::Number));
    assert_eq!(entry.value, Some(Value::Number(2.0)));
    assert_eq!(entry.sequence, 2);
}

#[test]
fn test_reassign_overwrites_wholesale() {
    let mut session = session_with(&[
        Message::assign(5, 1, "x", Value::Number(1.0)),
        Message::assign(5, 2, "y", Value::string("hi")),
    ]);

    session.process().unwrap();
    session.process().unwrap();

    assert_eq!(session.table().len(), 1);
    let entry = session.table().get(5).unwrap();
    assert_eq!(entry.name, b"y");
    assert_eq!(entry.entry_type(), Some(TypeTag::String));
    assert_eq!(entry.value, Some(Value::string("hi")));
}

#[test]
fn test_update_decodes_with_recorded_type() {
    // after reassignment to a bool array, updates must be read as bool arrays
    let mut session = session_with(&[
        Message::assign(9, 1, "flags", Value::Number(0.0)),
        Message::assign(9, 2, "flags", Value::BoolArray(vec![false])),
        Message::update(9, 3, Value::BoolArray(vec![true, true])),
        Message::Noop,
    ]);

    for _ in 0..4 {
        session.process().unwrap();
    }
    assert_eq!(
        session.table().get(9).unwrap().value,
        Some(Value::BoolArray(vec![true, true]))
    );
}

#[test]
fn test_update_unknown_id_fails_and_leaves_table() {
    let mut session = session_with(&[
        Message::assign(1, 1, "a", Value::Bool(true)),
        Message::update(2, 1, Value::Bool(false)),
    ]);

    session.process().unwrap();
    let before = session.snapshot();

    let err = session.process().unwrap_err();
    assert!(matches!(err, NtError::UnknownEntry { id: 2 }));
    assert_eq!(session.snapshot(), before);
    assert_eq!(session.state(), SessionState::Faulted);
}

#[test]
fn test_all_value_shapes_mirror() {
    let values = [
        Value::Bool(true),
        Value::Number(-7.75),
        Value::string("auto"),
        Value::BoolArray(vec![true, false]),
        Value::NumberArray(vec![1.5, 2.5]),
        Value::StringArray(vec![b"a".to_vec(), b"bc".to_vec()]),
    ];
    let messages: Vec<Message> = values
        .iter()
        .enumerate()
        .map(|(i, v)| Message::assign(i as u16, 0, format!("e{i}"), v.clone()))
        .collect();
    let mut session = session_with(&messages);

    for _ in 0..values.len() {
        session.process().unwrap();
    }
    for (i, v) in values.iter().enumerate() {
        let entry = session.table().get(i as u16).unwrap();
        assert_eq!(entry.value.as_ref(), Some(v));
        assert_eq!(entry.entry_type(), Some(v.type_tag()));
    }
}

// =============================================================================
// Informational Message Tests
// =============================================================================

#[test]
fn test_noop_is_a_noop() {
    let mut session = session_with(&[Message::assign(1, 1, "a", Value::Number(3.0)), Message::Noop]);
    session.process().unwrap();
    let before = session.snapshot();
    let position = session.bytes_read();

    assert_eq!(session.process().unwrap(), Message::Noop);
    assert_eq!(session.snapshot(), before);
    assert_eq!(session.bytes_read() - position, 1);
}

#[test]
fn test_informational_messages() {
    let mut session = session_with(&[
        Message::Hello { version: 0x0200 },
        Message::Unsupported { version: 0x0100 },
        Message::HelloComplete,
    ]);

    assert_eq!(session.process().unwrap(), Message::Hello { version: 0x0200 });
    assert_eq!(session.process().unwrap(), Message::Unsupported { version: 0x0100 });
    assert_eq!(session.process().unwrap(), Message::HelloComplete);
    assert!(session.table().is_empty());
    assert_eq!(session.state(), SessionState::Established);
    assert_eq!(session.bytes_read(), 3 + 3 + 1);
}

// =============================================================================
// Fault Tests
// =============================================================================

#[test]
fn test_unknown_message_kind_is_fatal() {
    let mut session = session_with_bytes(vec![0x20, 0x00, 0x00]);
    assert!(matches!(session.process(), Err(NtError::UnknownMessageKind(0x20))));
    assert!(matches!(session.process(), Err(NtError::SessionFaulted)));
}

#[test]
fn test_unknown_type_tag_is_not_fatal() {
    let mut session = session_with(&[
        Message::Assign {
            name: b"future".to_vec(),
            type_tag: 99,
            id: 3,
            seq: 1,
            value: None,
        },
        Message::assign(4, 1, "known", Value::Bool(false)),
    ]);

    session.process().unwrap();
    session.process().unwrap();

    let future = session.table().get(3).unwrap();
    assert_eq!(future.entry_type(), None);
    assert_eq!(future.value, None);
    assert_eq!(session.table().get(4).unwrap().value, Some(Value::Bool(false)));
}

#[test]
fn test_update_of_unknown_typed_entry_is_not_fatal() {
    let mut session = session_with(&[
        Message::Assign {
            name: b"future".to_vec(),
            type_tag: 99,
            id: 3,
            seq: 1,
            value: None,
        },
        Message::Update {
            id: 3,
            seq: 2,
            type_tag: 99,
            value: None,
        },
        Message::Noop,
    ]);

    session.process().unwrap();
    let update = session.process().unwrap();
    assert!(matches!(update, Message::Update { id: 3, type_tag: 99, value: None, .. }));
    assert_eq!(session.process().unwrap(), Message::Noop);

    let entry = session.table().get(3).unwrap();
    assert_eq!(entry.type_tag, 99);
    assert_eq!(entry.value, None);
    assert_eq!(entry.sequence, 2);
    assert_eq!(session.state(), SessionState::Established);
}

#[test]
fn test_end_of_stream_is_disconnect() {
    let mut session = session_with(&[]);
    let err = session.process().unwrap_err();
    assert!(err.is_disconnect());
    assert_eq!(session.state(), SessionState::Faulted);
}

// =============================================================================
// End-to-End Scenario
// =============================================================================

#[test]
fn test_speed_scenario() {
    // ASSIGN(id=1, "speed", number, 42.5, seq=1) then UPDATE(id=1, seq=2, 43.0)
    let mut inbound = vec![0x10, 0x00, 0x05];
    inbound.extend_from_slice(b"speed");
    inbound.extend_from_slice(&[0x01, 0x00, 0x01, 0x00, 0x01]);
    inbound.extend_from_slice(&42.5f64.to_be_bytes());
    inbound.extend_from_slice(&[0x11, 0x00, 0x01, 0x00, 0x02]);
    inbound.extend_from_slice(&43.0f64.to_be_bytes());

    let mut session = session_with_bytes(inbound);
    assert_eq!(session.get_ref().outbound, vec![0x01, 0x02, 0x00]);

    let first = session.process().unwrap();
    assert_eq!(first, Message::assign(1, 1, "speed", Value::Number(42.5)));
    let second = session.process().unwrap();
    assert_eq!(second, Message::update(1, 2, Value::Number(43.0)));

    let snapshot = session.snapshot();
    assert_eq!(snapshot.len(), 1);
    let entry = snapshot.get(1).unwrap();
    assert_eq!(entry.name, b"speed");
    assert_eq!(entry.entry_type(), Some(TypeTag::Number));
    assert_eq!(entry.value, Some(Value::Number(43.0)));
}

#[test]
fn test_change_feed_between_messages() {
    let mut session = session_with(&[
        Message::assign(1, 1, "speed", Value::Number(1.0)),
        Message::Noop,
        Message::update(1, 2, Value::Number(2.0)),
    ]);

    let empty = session.snapshot();
    session.process().unwrap();
    let after_assign = session.snapshot();
    assert_eq!(after_assign.changes_since(&empty).len(), 1);

    session.process().unwrap();
    assert!(session.snapshot().changes_since(&after_assign).is_empty());

    session.process().unwrap();
    let changes = session.snapshot().changes_since(&after_assign);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].current().value, Some(Value::Number(2.0)));
}

#[test]
fn test_snapshot_iterates_in_id_order() {
    let mut session = session_with(&[
        Message::assign(30, 1, "c", Value::Bool(true)),
        Message::assign(2, 1, "a", Value::Number(1.0)),
        Message::assign(17, 1, "b", Value::string("mid")),
    ]);
    for _ in 0..3 {
        session.process().unwrap();
    }

    let snapshot = session.snapshot();
    let mut ids = Vec::new();
    let mut names = Vec::new();
    for (id, entry) in &snapshot {
        ids.push(*id);
        names.push(entry.name.clone());
    }
    assert_eq!(ids, vec![2, 17, 30]);
    assert_eq!(names, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
}
