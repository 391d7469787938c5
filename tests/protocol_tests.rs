#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
//! Wire-format fixture tests for the Bombgrid codec.
//!
//! Each fixture is the exact byte sequence the server (or client) puts on
//! the wire, per the protocol's frame table.

use bombgrid_client::{
    ClientMessage, DecodeError, MoveAction, ServerMessage, Side, StatusCode,
};

// ── Inbound fixtures ────────────────────────────────────────────────

#[test]
fn hello_fixture() {
    assert_eq!(
        ServerMessage::decode("hello\n16").unwrap(),
        ServerMessage::Hello { count: 16 }
    );
}

#[test]
fn name_fixture() {
    assert_eq!(
        ServerMessage::decode("name\nBomber\n#00ff00").unwrap(),
        ServerMessage::Name {
            name: "Bomber".into(),
            color: "#00ff00".into(),
        }
    );
}

#[test]
fn status_fixtures() {
    let cases = [
        ("status\n0 X", 0, StatusCode::Defused),
        ("status\n3 L", 3, StatusCode::Armed(Side::Left)),
        ("status\n15 R", 15, StatusCode::Armed(Side::Right)),
    ];
    for (frame, index, code) in cases {
        assert_eq!(
            ServerMessage::decode(frame).unwrap(),
            ServerMessage::Status { index, code },
            "frame {frame:?}"
        );
    }
}

#[test]
fn board_fixture() {
    let ServerMessage::Board { entries } =
        ServerMessage::decode("board\nAlice\n#ff0000\n12\nBob\n#00ff00\n7").unwrap()
    else {
        panic!("expected Board");
    };
    assert_eq!(entries.len(), 2);
    assert_eq!(
        (entries[0].name.as_str(), entries[0].color.as_str(), entries[0].score.as_str()),
        ("Alice", "#ff0000", "12")
    );
    assert_eq!(
        (entries[1].name.as_str(), entries[1].color.as_str(), entries[1].score.as_str()),
        ("Bob", "#00ff00", "7")
    );
}

#[test]
fn future_command_decodes_to_unrecognized() {
    assert_eq!(
        ServerMessage::decode("pause\n1").unwrap(),
        ServerMessage::Unrecognized {
            command: "pause".into(),
        }
    );
}

// ── Outbound fixtures ───────────────────────────────────────────────

#[test]
fn announce_fixture() {
    assert_eq!(ClientMessage::Announce { identity: 137 }.encode(), "olleh\n137");
}

#[test]
fn move_fixtures_cover_all_action_tokens() {
    let cases = [
        (MoveAction::StrongLeft, "move\n4 L3"),
        (MoveAction::WeakLeft, "move\n4 L1"),
        (MoveAction::WeakRight, "move\n4 R1"),
        (MoveAction::StrongRight, "move\n4 R2"),
    ];
    for (action, expected) in cases {
        let msg = ClientMessage::Move { index: 4, action };
        assert_eq!(msg.encode(), expected);
        // The inverse decode recovers the same message.
        assert_eq!(ClientMessage::decode(expected).unwrap(), msg);
    }
}

#[test]
fn move_round_trip_slot_three_weak_right() {
    let encoded = ClientMessage::Move {
        index: 3,
        action: MoveAction::WeakRight,
    }
    .encode();
    assert_eq!(encoded, "move\n3 R1");
    let ClientMessage::Move { index, action } = ClientMessage::decode(&encoded).unwrap() else {
        panic!("expected Move");
    };
    assert_eq!(index, 3);
    assert_eq!(action.token(), "R1");
}

// ── Malformed frames ────────────────────────────────────────────────

#[test]
fn malformed_frames_produce_typed_errors() {
    assert_eq!(
        ServerMessage::decode("").unwrap_err(),
        DecodeError::EmptyFrame
    );
    assert!(matches!(
        ServerMessage::decode("hello\nNaN").unwrap_err(),
        DecodeError::BadNumber { command: "hello", .. }
    ));
    assert!(matches!(
        ServerMessage::decode("name\nonly-one-field").unwrap_err(),
        DecodeError::WrongFieldCount { command: "name", .. }
    ));
    assert!(matches!(
        ServerMessage::decode("status\n1 X extra").unwrap_err(),
        DecodeError::WrongFieldCount { command: "status", .. }
    ));
    assert!(matches!(
        ClientMessage::decode("move\n1 L7").unwrap_err(),
        DecodeError::BadActionToken(_)
    ));
}
