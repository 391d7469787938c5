#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
//! Shared test utilities for Bombgrid client integration tests.
//!
//! Provides a channel-based [`MockTransport`] and helpers for constructing
//! wire frames the way the server sends them.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use bombgrid_client::{BombgridError, Transport};

// ── MockTransport ───────────────────────────────────────────────────

/// A channel-based mock transport for integration testing.
///
/// Scripted server frames are consumed in order by `recv()`. All frames sent
/// by the client are recorded in `sent`.
pub struct MockTransport {
    /// Scripted server frames (consumed in order by `recv`).
    incoming: VecDeque<Option<Result<String, BombgridError>>>,
    /// Recorded outgoing frames from the client.
    pub sent: Arc<StdMutex<Vec<String>>>,
    /// Whether `close()` has been called.
    pub closed: Arc<AtomicBool>,
}

impl MockTransport {
    /// Create a new mock transport with the given scripted incoming entries.
    ///
    /// Returns the transport plus shared handles for inspecting sent frames
    /// and whether close was called.
    pub fn new(
        incoming: Vec<Option<Result<String, BombgridError>>>,
    ) -> (Self, Arc<StdMutex<Vec<String>>>, Arc<AtomicBool>) {
        let sent = Arc::new(StdMutex::new(Vec::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let transport = Self {
            incoming: VecDeque::from(incoming),
            sent: Arc::clone(&sent),
            closed: Arc::clone(&closed),
        };
        (transport, sent, closed)
    }

    /// Script a sequence of plain server frames.
    pub fn scripted(frames: &[&str]) -> (Self, Arc<StdMutex<Vec<String>>>, Arc<AtomicBool>) {
        Self::new(frames.iter().map(|f| Some(Ok((*f).to_string()))).collect())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, frame: String) -> Result<(), BombgridError> {
        self.sent.lock().unwrap().push(frame);
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String, BombgridError>> {
        if let Some(item) = self.incoming.pop_front() {
            // An explicit `None` entry signals a clean transport close.
            item
        } else {
            // All scripted frames delivered — hang until shutdown.
            std::future::pending().await
        }
    }

    async fn close(&mut self) -> Result<(), BombgridError> {
        self.closed.store(true, Ordering::Relaxed);
        Ok(())
    }
}

// ── Frame helpers ───────────────────────────────────────────────────

/// Build a `board` snapshot frame from `(name, color, score)` triples.
pub fn board_frame(rows: &[(&str, &str, &str)]) -> String {
    let mut frame = String::from("board");
    for (name, color, score) in rows {
        frame.push('\n');
        frame.push_str(name);
        frame.push('\n');
        frame.push_str(color);
        frame.push('\n');
        frame.push_str(score);
    }
    frame
}
