#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
//! End-to-end lifecycle tests for the Bombgrid client against a scripted
//! mock transport: bootstrap, identity announcement, press gating, scoreboard
//! snapshots, and disconnect.

mod common;

use bombgrid_client::{
    BombgridClient, BombgridConfig, BombgridEvent, DisplayState, MoveAction,
};
use common::{board_frame, MockTransport};

fn config() -> BombgridConfig {
    BombgridConfig::new().with_identity(13)
}

#[tokio::test]
async fn full_defusal_lifecycle() {
    let (transport, sent, _closed) =
        MockTransport::scripted(&["hello\n3", "name\nBomber\n#00ff00", "status\n1 X"]);
    let (mut client, mut events) = BombgridClient::start(transport, config());

    // Connected first, then bootstrap.
    assert_eq!(events.recv().await.unwrap(), BombgridEvent::Connected);
    assert_eq!(
        events.recv().await.unwrap(),
        BombgridEvent::SlotsReady { count: 3 }
    );
    assert_eq!(client.slot_count(), 3);

    // Identity announced exactly once, immediately after bootstrap.
    assert_eq!(
        events.recv().await.unwrap(),
        BombgridEvent::NameAssigned {
            name: "Bomber".into(),
            color: "#00ff00".into(),
        }
    );
    assert_eq!(client.player_name().await.as_deref(), Some("Bomber"));

    // Slot 1 becomes defused and clickable.
    assert_eq!(
        events.recv().await.unwrap(),
        BombgridEvent::SlotChanged {
            index: 1,
            display: DisplayState::Defused,
        }
    );

    // First press goes out; second is silently discarded.
    client.press(1, MoveAction::StrongLeft).unwrap();
    assert_eq!(
        events.recv().await.unwrap(),
        BombgridEvent::MoveSent {
            index: 1,
            action: MoveAction::StrongLeft,
        }
    );
    client.press(1, MoveAction::StrongLeft).unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    {
        let frames = sent.lock().unwrap();
        assert_eq!(frames.as_slice(), ["olleh\n13", "move\n1 L3"]);
    }

    client.shutdown().await;
}

#[tokio::test]
async fn duplicate_hello_does_not_recreate_the_grid() {
    let (transport, sent, _closed) =
        MockTransport::scripted(&["hello\n3", "status\n2 X", "hello\n9"]);
    let (mut client, mut events) = BombgridClient::start(transport, config());

    let _ = events.recv().await; // Connected
    let _ = events.recv().await; // SlotsReady(3)
    let _ = events.recv().await; // SlotChanged(2)

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    // The duplicate hello was ignored: grid size unchanged, slot 2 still
    // pressable, and only one identity announcement ever went out.
    assert_eq!(client.slot_count(), 3);
    client.press(2, MoveAction::StrongRight).unwrap();
    assert_eq!(
        events.recv().await.unwrap(),
        BombgridEvent::MoveSent {
            index: 2,
            action: MoveAction::StrongRight,
        }
    );

    {
        let frames = sent.lock().unwrap();
        assert_eq!(frames.as_slice(), ["olleh\n13", "move\n2 R2"]);
    }

    client.shutdown().await;
}

#[tokio::test]
async fn scoreboard_snapshots_replace_each_other() {
    let (transport, _sent, _closed) = MockTransport::scripted(&[
        "hello\n1",
        &board_frame(&[("Alice", "#f00", "12"), ("Bob", "#0f0", "7")]),
        &board_frame(&[("Bob", "#0f0", "9")]),
    ]);
    let (mut client, mut events) = BombgridClient::start(transport, config());

    let _ = events.recv().await; // Connected
    let _ = events.recv().await; // SlotsReady

    let BombgridEvent::ScoreboardUpdated { entries } = events.recv().await.unwrap() else {
        panic!("expected first snapshot");
    };
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "Alice");

    let BombgridEvent::ScoreboardUpdated { entries } = events.recv().await.unwrap() else {
        panic!("expected second snapshot");
    };
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "Bob");
    assert_eq!(entries[0].score, "9");

    client.shutdown().await;
}

#[tokio::test]
async fn rearmed_slot_is_pressable_again() {
    let (transport, sent, _closed) = MockTransport::scripted(&["hello\n2", "status\n0 X"]);
    let (mut client, mut events) = BombgridClient::start(transport, config());

    let _ = events.recv().await; // Connected
    let _ = events.recv().await; // SlotsReady
    let _ = events.recv().await; // SlotChanged

    client.press(0, MoveAction::WeakLeft).unwrap();
    let _ = events.recv().await; // MoveSent

    // Without a fresh `status 0 X`, no further press goes through. The
    // client never retries and never re-arms on its own.
    client.press(0, MoveAction::WeakLeft).unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    {
        let frames = sent.lock().unwrap();
        assert_eq!(frames.as_slice(), ["olleh\n13", "move\n0 L1"]);
    }

    client.shutdown().await;
}

#[tokio::test]
async fn malformed_frames_do_not_kill_the_session() {
    let (transport, sent, _closed) = MockTransport::scripted(&[
        "hello\n2",
        "status\nnot-a-number X", // bad number
        "status\n0",              // missing code subfield
        "",                       // empty frame
        "status\n0 X",            // still alive
    ]);
    let (mut client, mut events) = BombgridClient::start(transport, config());

    let _ = events.recv().await; // Connected
    let _ = events.recv().await; // SlotsReady
    assert_eq!(
        events.recv().await.unwrap(),
        BombgridEvent::SlotChanged {
            index: 0,
            display: DisplayState::Defused,
        }
    );

    assert!(client.is_connected());
    {
        let frames = sent.lock().unwrap();
        assert_eq!(frames.as_slice(), ["olleh\n13"]);
    }

    client.shutdown().await;
}

#[tokio::test]
async fn server_close_ends_with_disconnected() {
    let (transport, _sent, _closed) = MockTransport::new(vec![
        Some(Ok("hello\n1".into())),
        None, // clean server close
    ]);
    let (mut client, mut events) = BombgridClient::start(transport, config());

    let _ = events.recv().await; // Connected
    let _ = events.recv().await; // SlotsReady
    assert_eq!(
        events.recv().await.unwrap(),
        BombgridEvent::Disconnected { reason: None }
    );
    assert!(!client.is_connected());

    // The channel then closes.
    assert!(events.recv().await.is_none());

    client.shutdown().await;
}
