//! # Bombgrid Client
//!
//! Transport-agnostic Rust client for the Bombgrid multiplayer bomb-defusal
//! protocol.
//!
//! The Bombgrid server owns all game rules; this crate implements the client
//! half: decoding the line-oriented wire protocol, maintaining the
//! server-authoritative view of the bomb grid, gating local input against
//! each slot's turn grant, and projecting scoreboard snapshots for
//! rendering.
//!
//! ## Features
//!
//! - **Transport-agnostic** — implement the [`Transport`] trait for any backend
//! - **WebSocket built-in** — default `transport-websocket` feature provides `WebSocketTransport`
//! - **Event-driven** — receive typed [`BombgridEvent`]s via a channel
//! - **Sync core** — [`GameSession`] is a plain synchronous state machine,
//!   usable without the async client for testing or custom integrations
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bombgrid_client::{BombgridClient, BombgridConfig, WebSocketTransport};
//!
//! let transport = WebSocketTransport::connect("ws://127.0.0.1:3000/ws").await?;
//! let (client, mut events) = BombgridClient::start(transport, BombgridConfig::new());
//!
//! while let Some(event) = events.recv().await {
//!     // react to slot changes, press clickable slots, render the board
//! }
//! ```

#[cfg(feature = "tokio-runtime")]
pub mod client;
pub mod error;
pub mod event;
pub mod protocol;
pub mod scoreboard;
pub mod session;
pub mod transport;
pub mod transports;

// Re-export primary types for ergonomic imports.
#[cfg(feature = "tokio-runtime")]
pub use client::{BombgridClient, BombgridConfig};
pub use error::{BombgridError, DecodeError};
pub use event::BombgridEvent;
pub use protocol::{ClientMessage, MoveAction, ServerMessage, Side, StatusCode};
pub use scoreboard::{DisplayUnit, ScoreboardEntry};
pub use session::{BombSlot, DisplayState, GameSession};
pub use transport::Transport;

#[cfg(feature = "transport-websocket")]
pub use transports::websocket::WebSocketTransport;
