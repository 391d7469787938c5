//! Built-in [`Transport`](crate::transport::Transport) implementations.
//!
//! Currently only a WebSocket transport, behind the `transport-websocket`
//! feature (enabled by default).

#[cfg(feature = "transport-websocket")]
pub mod websocket;

#[cfg(feature = "transport-websocket")]
pub use websocket::WebSocketTransport;
