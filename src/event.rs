//! Typed events emitted by the client to the embedding UI.

use crate::protocol::{MoveAction, SlotCount, SlotIndex};
use crate::scoreboard::ScoreboardEntry;
use crate::session::DisplayState;

/// Events delivered on the channel returned by
/// [`BombgridClient::start`](crate::client::BombgridClient::start).
///
/// `Connected` and `Disconnected` are synthetic transport-layer events; the
/// rest correspond one-to-one to session state changes. When the consumer
/// cannot keep up, events other than `Disconnected` may be dropped (with a
/// warning logged) rather than blocking the transport loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BombgridEvent {
    /// The transport is connected and the client is awaiting bootstrap.
    Connected,
    /// The bootstrap frame arrived: `count` slots now exist, indices
    /// `0..count`, all non-clickable. The identity announcement has been
    /// queued.
    SlotsReady { count: SlotCount },
    /// The server assigned this client a display name and color swatch.
    NameAssigned { name: String, color: String },
    /// One slot's visual state changed. When `display` is
    /// [`DisplayState::Defused`] the slot is now clickable.
    SlotChanged {
        index: SlotIndex,
        display: DisplayState,
    },
    /// A full scoreboard snapshot, replacing any prior one.
    ScoreboardUpdated { entries: Vec<ScoreboardEntry> },
    /// A press was admitted and its `move` frame sent; the slot's gate is
    /// now cleared until the server re-arms it.
    MoveSent {
        index: SlotIndex,
        action: MoveAction,
    },
    /// The transport closed or the client shut down. Always the final event.
    Disconnected { reason: Option<String> },
}
