//! Error types for the Bombgrid client.

use thiserror::Error;

/// Errors produced while decoding an inbound wire frame.
///
/// A decode failure never tears down the session: the transport loop logs the
/// offending frame and moves on, since unknown future protocol codes must
/// degrade gracefully.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The frame contained no fields at all.
    #[error("empty frame")]
    EmptyFrame,

    /// A command arrived with the wrong number of fields.
    #[error("`{command}` frame has wrong field count: expected {expected}, got {got}")]
    WrongFieldCount {
        /// Command tag of the offending frame.
        command: &'static str,
        /// Number of fields the command requires.
        expected: usize,
        /// Number of fields actually present.
        got: usize,
    },

    /// A field that must be numeric failed to parse.
    #[error("`{command}` frame contains a bad number: {field:?}")]
    BadNumber {
        /// Command tag of the offending frame.
        command: &'static str,
        /// The raw field text that failed to parse.
        field: String,
    },

    /// A move action token was not one of `L3`, `L1`, `R1`, `R2`.
    #[error("unknown move action token: {0:?}")]
    BadActionToken(String),

    /// A client-to-server frame carried a command tag that is not part of
    /// the protocol. Unlike server frames, outbound frames have no graceful
    /// fallback: the client only ever produces the closed set.
    #[error("unknown client command tag: {0:?}")]
    UnknownCommand(String),
}

/// Errors that can occur when using the Bombgrid client.
#[derive(Debug, Error)]
pub enum BombgridError {
    /// Failed to send a frame through the transport.
    #[error("transport send error: {0}")]
    TransportSend(String),

    /// Failed to receive a frame from the transport.
    #[error("transport receive error: {0}")]
    TransportReceive(String),

    /// The transport connection was closed unexpectedly.
    #[error("transport connection closed")]
    TransportClosed,

    /// Failed to decode an inbound wire frame.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The server referenced a slot index beyond the bootstrapped count.
    ///
    /// This indicates a protocol/implementation mismatch rather than a
    /// recoverable runtime condition, so the session treats it as fatal.
    #[error("slot index {index} out of range (slot count {count})")]
    SlotOutOfRange {
        /// The offending slot index from the wire.
        index: u32,
        /// The number of slots allocated at bootstrap.
        count: usize,
    },

    /// Attempted an operation that requires an active connection, but the
    /// client is not connected.
    #[error("not connected to server")]
    NotConnected,

    /// An operation timed out.
    #[error("operation timed out")]
    Timeout,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized [`Result`] type for Bombgrid client operations.
pub type Result<T> = std::result::Result<T, BombgridError>;
