//! # Bombgrid Demo Client
//!
//! Demonstrates a complete Bombgrid client lifecycle:
//!
//! 1. Connect to a Bombgrid server via WebSocket
//! 2. Wait for the bootstrap frame (the identity is announced automatically)
//! 3. React to slot and scoreboard events
//! 4. Press a defusal action whenever a slot becomes clickable
//! 5. Shut down gracefully on Ctrl+C or disconnect
//!
//! ## Running
//!
//! ```sh
//! # Start a Bombgrid server on localhost:3000, then:
//! cargo run --example play
//!
//! # Override the server URL or pick a fixed identity:
//! BOMBGRID_URL=ws://my-server:3000/ws BOMBGRID_ID=42 cargo run --example play
//! ```

use bombgrid_client::{
    BombgridClient, BombgridConfig, BombgridEvent, DisplayState, MoveAction, WebSocketTransport,
};

/// Default server URL when `BOMBGRID_URL` is not set.
const DEFAULT_URL: &str = "ws://127.0.0.1:3000/ws";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Logging ─────────────────────────────────────────────────────
    // Initialize tracing. Set `RUST_LOG=debug` for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // ── Configuration ───────────────────────────────────────────────
    let url = std::env::var("BOMBGRID_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
    let mut config = BombgridConfig::new();
    if let Some(id) = std::env::var("BOMBGRID_ID")
        .ok()
        .and_then(|raw| raw.parse().ok())
    {
        config = config.with_identity(id);
    }
    tracing::info!("Connecting to {url}");

    // ── Connect ─────────────────────────────────────────────────────
    let transport = WebSocketTransport::connect(&url).await?;

    // Start the client. This spawns a background task that drives the
    // transport and emits events on `event_rx`.
    let (mut client, mut event_rx) = BombgridClient::start(transport, config);
    tracing::info!("Playing as identity {}", client.identity());

    // ── Event loop ──────────────────────────────────────────────────
    // Use `tokio::select!` to listen for both server events and Ctrl+C.
    loop {
        tokio::select! {
            // Branch 1: Incoming event from the server (or transport layer).
            event = event_rx.recv() => {
                let Some(event) = event else {
                    // Channel closed — transport loop exited.
                    tracing::info!("Event channel closed, exiting");
                    break;
                };

                match event {
                    BombgridEvent::Connected => {
                        tracing::info!("Transport connected, awaiting bootstrap…");
                    }

                    BombgridEvent::SlotsReady { count } => {
                        tracing::info!("Grid ready with {count} bomb slots");
                    }

                    BombgridEvent::NameAssigned { name, color } => {
                        tracing::info!("Playing as {name} ({color})");
                    }

                    BombgridEvent::SlotChanged { index, display: slot_display } => {
                        tracing::info!("Slot {index}: [{}]", slot_display.glyph());
                        // A defused slot is ours to act on — press the
                        // strong-left affordance, like a very decisive human.
                        if slot_display == DisplayState::Defused {
                            client.press(index, MoveAction::StrongLeft)?;
                        }
                    }

                    BombgridEvent::MoveSent { index, action } => {
                        tracing::info!("Sent move {action} on slot {index}");
                    }

                    BombgridEvent::ScoreboardUpdated { entries } => {
                        for entry in &entries {
                            tracing::info!("  {:<16} {}", entry.name, entry.score);
                        }
                    }

                    BombgridEvent::Disconnected { reason } => {
                        tracing::info!("Disconnected: {}", reason.as_deref().unwrap_or("server closed"));
                        break;
                    }
                }
            }

            // Branch 2: Ctrl+C — shut down gracefully.
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl+C received, shutting down");
                client.shutdown().await;
                break;
            }
        }
    }

    Ok(())
}
