//! Transport abstraction for the Bombgrid line protocol.
//!
//! The [`Transport`] trait defines a bidirectional text frame channel between
//! the client and server. The protocol uses newline-delimited text frames, so
//! every transport implementation must handle frame boundaries internally
//! (e.g., WebSocket text messages, length-prefixed TCP).
//!
//! # Connection Setup
//!
//! Connection setup is intentionally NOT part of this trait — different
//! transports have fundamentally different connection parameters (URLs for
//! WebSocket, host:port for TCP, and so on). Construct a connected transport
//! externally, then pass it to `BombgridClient::start`.
//!
//! # Implementing a Custom Transport
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use bombgrid_client::error::BombgridError;
//! use bombgrid_client::transport::Transport;
//!
//! struct MyTransport { /* ... */ }
//!
//! #[async_trait]
//! impl Transport for MyTransport {
//!     async fn send(&mut self, frame: String) -> Result<(), BombgridError> {
//!         // Send one complete text frame over your transport
//!         todo!()
//!     }
//!
//!     async fn recv(&mut self) -> Option<Result<String, BombgridError>> {
//!         // Receive the next complete text frame
//!         // Return None when the connection is closed cleanly
//!         todo!()
//!     }
//!
//!     async fn close(&mut self) -> Result<(), BombgridError> {
//!         // Gracefully shut down the connection
//!         todo!()
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::error::BombgridError;

/// A bidirectional text frame transport for the Bombgrid protocol.
///
/// Implementors shuttle wire frames (newline-delimited field lists) between
/// the client and server. Each call to [`send`](Transport::send) transmits
/// one complete frame; each call to [`recv`](Transport::recv) returns one
/// complete frame. The transport must preserve frame boundaries and deliver
/// frames reliably, in order — the session state machine depends on it.
///
/// # Object Safety
///
/// This trait is object-safe, so `Box<dyn Transport>` works for dynamic
/// dispatch. However, `BombgridClient::start` accepts `impl Transport`
/// (monomorphized) for the common case.
///
/// # Cancel Safety
///
/// The [`recv`](Transport::recv) method **MUST** be cancel-safe because it is
/// used inside `tokio::select!`. If `recv` is cancelled before completion,
/// calling it again must not lose data. Channel-based implementations (e.g.,
/// wrapping `mpsc::Receiver`) are naturally cancel-safe.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Send one text frame to the server.
    ///
    /// # Errors
    ///
    /// Returns [`BombgridError::TransportSend`] if the frame could not be
    /// sent (e.g., connection broken, write buffer full).
    async fn send(&mut self, frame: String) -> Result<(), BombgridError>;

    /// Receive the next text frame from the server.
    ///
    /// Returns:
    /// - `Some(Ok(frame))` — a complete frame was received
    /// - `Some(Err(e))` — a transport error occurred (e.g., [`BombgridError::TransportReceive`])
    /// - `None` — the connection was closed cleanly by the server
    ///
    /// # Cancel Safety
    ///
    /// This method **MUST** be cancel-safe (see [trait documentation](Transport)).
    async fn recv(&mut self) -> Option<Result<String, BombgridError>>;

    /// Close the transport connection gracefully.
    ///
    /// After calling this method, subsequent calls to [`send`](Transport::send)
    /// and [`recv`](Transport::recv) may return errors or `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the graceful shutdown fails. Implementations
    /// should still release resources even if the close handshake fails.
    async fn close(&mut self) -> Result<(), BombgridError>;
}
