//! Client-side game session: the slot store, the protocol dispatcher state
//! machine, and the input encoder.
//!
//! [`GameSession`] is the single source of truth a UI renders against. It is
//! synchronous and single-owner: the transport loop applies inbound frames
//! and local press requests strictly in delivery order, so the
//! check-then-clear on a slot's `clickable` flag needs no locking.
//!
//! The session has exactly two phases. It starts in `AwaitingBootstrap` and
//! becomes `Active` on the first `hello` frame, which is the only point at
//! which slot structure is created. All post-bootstrap frames are
//! independent events, not phase transitions.

use tracing::{debug, warn};

use crate::error::BombgridError;
use crate::event::BombgridEvent;
use crate::protocol::{
    ClientIdentity, ClientMessage, MoveAction, ServerMessage, Side, SlotCount, SlotIndex,
    StatusCode,
};
use crate::scoreboard::{self, DisplayUnit, ScoreboardEntry};

/// Visual state of one bomb slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayState {
    /// No status received for this slot yet.
    #[default]
    Unset,
    /// Armed, defuse indicator facing the given side.
    Armed(Side),
    /// Defused — the terminal visual marker.
    Defused,
}

impl DisplayState {
    /// The display glyph for this state, matching the wire status codes.
    pub fn glyph(self) -> &'static str {
        match self {
            DisplayState::Unset => "",
            DisplayState::Armed(Side::Left) => "L",
            DisplayState::Armed(Side::Right) => "R",
            DisplayState::Defused => "X",
        }
    }
}

/// One grid cell: stable index, visual state, and the local action gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BombSlot {
    /// Assigned at bootstrap, `0..count`, never reused or reordered.
    pub index: SlotIndex,
    pub display: DisplayState,
    /// True only while the server has granted this client the ability to act
    /// on this slot. Cleared optimistically on a successful local press,
    /// before any server acknowledgment; only a later `status <i> X` re-arms
    /// it.
    pub clickable: bool,
}

impl BombSlot {
    fn new(index: SlotIndex) -> Self {
        Self {
            index,
            display: DisplayState::Unset,
            clickable: false,
        }
    }
}

/// Dispatcher phase. `Active` is terminal until disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitingBootstrap,
    Active,
}

/// The result of applying one inbound frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApplyOutcome {
    /// Frame to send back immediately (the identity announcement, emitted
    /// once on bootstrap).
    pub reply: Option<ClientMessage>,
    /// Typed notification for the embedding UI, if the frame changed
    /// anything visible.
    pub event: Option<BombgridEvent>,
}

/// Client-side session state for one connection.
///
/// Created with the connection, torn down with it. The slot count is fixed
/// for the session's lifetime by the bootstrap frame.
#[derive(Debug)]
pub struct GameSession {
    identity: ClientIdentity,
    phase: Phase,
    slots: Vec<BombSlot>,
    player_name: Option<String>,
    player_color: Option<String>,
    scoreboard: Vec<ScoreboardEntry>,
}

impl GameSession {
    /// Create a session that will announce the given identity at bootstrap.
    pub fn new(identity: ClientIdentity) -> Self {
        Self {
            identity,
            phase: Phase::AwaitingBootstrap,
            slots: Vec::new(),
            player_name: None,
            player_color: None,
            scoreboard: Vec::new(),
        }
    }

    // ── Dispatcher ──────────────────────────────────────────────────

    /// Apply one decoded inbound frame.
    ///
    /// # Errors
    ///
    /// Returns [`BombgridError::SlotOutOfRange`] when a `status` frame
    /// references a slot beyond the bootstrapped count — a fatal
    /// protocol/implementation mismatch, not a recoverable condition.
    pub fn apply(&mut self, msg: ServerMessage) -> Result<ApplyOutcome, BombgridError> {
        match (self.phase, msg) {
            (Phase::AwaitingBootstrap, ServerMessage::Hello { count }) => {
                self.slots = (0..count).map(BombSlot::new).collect();
                self.phase = Phase::Active;
                debug!(count, "bootstrapped slot grid");
                Ok(ApplyOutcome {
                    reply: Some(ClientMessage::Announce {
                        identity: self.identity,
                    }),
                    event: Some(BombgridEvent::SlotsReady { count }),
                })
            }
            (Phase::Active, ServerMessage::Hello { count }) => {
                // Undefined by the protocol; re-creating the grid would be
                // destructive, so the duplicate is dropped.
                warn!(count, "duplicate hello while active, ignoring");
                Ok(ApplyOutcome::default())
            }
            (Phase::AwaitingBootstrap, msg) => {
                warn!(?msg, "frame before bootstrap, ignoring");
                Ok(ApplyOutcome::default())
            }
            (Phase::Active, ServerMessage::Name { name, color }) => {
                debug!(%name, %color, "player identity assigned");
                self.player_name = Some(name.clone());
                self.player_color = Some(color.clone());
                Ok(ApplyOutcome {
                    reply: None,
                    event: Some(BombgridEvent::NameAssigned { name, color }),
                })
            }
            (Phase::Active, ServerMessage::Status { index, code }) => self.apply_status(index, code),
            (Phase::Active, ServerMessage::Board { entries }) => {
                debug!(rows = entries.len(), "scoreboard snapshot");
                self.scoreboard = entries.clone();
                Ok(ApplyOutcome {
                    reply: None,
                    event: Some(BombgridEvent::ScoreboardUpdated { entries }),
                })
            }
            (Phase::Active, ServerMessage::Unrecognized { command }) => {
                debug!(%command, "unrecognized command, ignoring");
                Ok(ApplyOutcome::default())
            }
        }
    }

    fn apply_status(
        &mut self,
        index: SlotIndex,
        code: StatusCode,
    ) -> Result<ApplyOutcome, BombgridError> {
        let count = self.slots.len();
        let slot = self
            .slots
            .get_mut(index as usize)
            .ok_or(BombgridError::SlotOutOfRange { index, count })?;

        match code {
            StatusCode::Defused => {
                // The only transition that arms the local action gate.
                slot.display = DisplayState::Defused;
                slot.clickable = true;
            }
            StatusCode::Armed(side) => {
                slot.display = DisplayState::Armed(side);
            }
            StatusCode::Other(code) => {
                // Future codes degrade gracefully: no visual change.
                debug!(index, %code, "unknown status code, ignoring");
                return Ok(ApplyOutcome::default());
            }
        }

        Ok(ApplyOutcome {
            reply: None,
            event: Some(BombgridEvent::SlotChanged {
                index,
                display: slot.display,
            }),
        })
    }

    // ── Input encoder ───────────────────────────────────────────────

    /// Activate one of a slot's four directional affordances.
    ///
    /// Returns the `move` frame to send when the slot is currently
    /// clickable, clearing the gate before any server acknowledgment.
    /// A press on a non-clickable, out-of-range, or pre-bootstrap slot is
    /// silently discarded: no frame, no state change.
    pub fn press(&mut self, index: SlotIndex, action: MoveAction) -> Option<ClientMessage> {
        let slot = self.slots.get_mut(index as usize)?;
        if !slot.clickable {
            debug!(index, action = %action, "press discarded, slot not clickable");
            return None;
        }
        slot.clickable = false;
        Some(ClientMessage::Move { index, action })
    }

    // ── Accessors ───────────────────────────────────────────────────

    /// The identity announced at bootstrap.
    pub fn identity(&self) -> ClientIdentity {
        self.identity
    }

    /// `true` once the bootstrap frame has been applied.
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    /// All slots, in index order. Empty before bootstrap.
    pub fn slots(&self) -> &[BombSlot] {
        &self.slots
    }

    /// One slot, or `None` if out of range.
    pub fn slot(&self, index: SlotIndex) -> Option<&BombSlot> {
        self.slots.get(index as usize)
    }

    /// Number of slots allocated at bootstrap.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// The local player's assigned display name, if any.
    pub fn player_name(&self) -> Option<&str> {
        self.player_name.as_deref()
    }

    /// The local player's assigned color token, if any.
    pub fn player_color(&self) -> Option<&str> {
        self.player_color.as_deref()
    }

    /// The most recent scoreboard snapshot, in receipt order.
    pub fn scoreboard(&self) -> &[ScoreboardEntry] {
        &self.scoreboard
    }

    /// Project the current scoreboard snapshot into its flat render list.
    pub fn render_scoreboard(&self) -> Vec<DisplayUnit> {
        scoreboard::render(&self.scoreboard)
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    fn bootstrapped(count: u32) -> GameSession {
        let mut session = GameSession::new(7);
        session.apply(ServerMessage::Hello { count }).unwrap();
        session
    }

    fn frame(raw: &str) -> ServerMessage {
        ServerMessage::decode(raw).unwrap()
    }

    #[test]
    fn hello_allocates_slots_and_replies_with_announce() {
        let mut session = GameSession::new(42);
        assert!(!session.is_active());

        let outcome = session.apply(ServerMessage::Hello { count: 4 }).unwrap();
        assert_eq!(
            outcome.reply,
            Some(ClientMessage::Announce { identity: 42 })
        );
        assert_eq!(outcome.event, Some(BombgridEvent::SlotsReady { count: 4 }));

        assert!(session.is_active());
        assert_eq!(session.slot_count(), 4);
        for (i, slot) in session.slots().iter().enumerate() {
            assert_eq!(slot.index as usize, i);
            assert_eq!(slot.display, DisplayState::Unset);
            assert!(!slot.clickable);
        }
    }

    #[test]
    fn duplicate_hello_is_ignored() {
        let mut session = bootstrapped(3);
        session.apply(frame("status\n1 X")).unwrap();

        let outcome = session.apply(ServerMessage::Hello { count: 9 }).unwrap();
        assert_eq!(outcome, ApplyOutcome::default());

        // The grid survives untouched.
        assert_eq!(session.slot_count(), 3);
        assert!(session.slot(1).unwrap().clickable);
    }

    #[test]
    fn frames_before_bootstrap_are_ignored() {
        let mut session = GameSession::new(1);
        let outcome = session.apply(frame("status\n0 X")).unwrap();
        assert_eq!(outcome, ApplyOutcome::default());
        assert!(!session.is_active());
        assert_eq!(session.slot_count(), 0);
    }

    #[test]
    fn status_x_defuses_and_arms_the_gate() {
        let mut session = bootstrapped(3);
        let outcome = session.apply(frame("status\n1 X")).unwrap();
        assert_eq!(
            outcome.event,
            Some(BombgridEvent::SlotChanged {
                index: 1,
                display: DisplayState::Defused,
            })
        );
        let slot = session.slot(1).unwrap();
        assert_eq!(slot.display, DisplayState::Defused);
        assert!(slot.clickable);
    }

    #[test]
    fn status_x_arms_regardless_of_prior_state() {
        let mut session = bootstrapped(2);
        session.apply(frame("status\n0 L")).unwrap();
        session.apply(frame("status\n0 X")).unwrap();
        let slot = session.slot(0).unwrap();
        assert_eq!(slot.display, DisplayState::Defused);
        assert!(slot.clickable);
    }

    #[test]
    fn status_l_and_r_never_touch_the_gate() {
        let mut session = bootstrapped(2);

        session.apply(frame("status\n0 L")).unwrap();
        assert_eq!(session.slot(0).unwrap().display, DisplayState::Armed(Side::Left));
        assert!(!session.slot(0).unwrap().clickable);

        // Arm the gate, then verify L/R leave it armed.
        session.apply(frame("status\n0 X")).unwrap();
        session.apply(frame("status\n0 R")).unwrap();
        assert_eq!(
            session.slot(0).unwrap().display,
            DisplayState::Armed(Side::Right)
        );
        assert!(session.slot(0).unwrap().clickable);
    }

    #[test]
    fn unknown_status_code_is_a_no_op() {
        let mut session = bootstrapped(1);
        session.apply(frame("status\n0 X")).unwrap();

        let outcome = session.apply(frame("status\n0 Q")).unwrap();
        assert_eq!(outcome, ApplyOutcome::default());
        let slot = session.slot(0).unwrap();
        assert_eq!(slot.display, DisplayState::Defused);
        assert!(slot.clickable);
    }

    #[test]
    fn status_out_of_range_is_fatal() {
        let mut session = bootstrapped(3);
        let err = session.apply(frame("status\n3 X")).unwrap_err();
        assert!(matches!(
            err,
            BombgridError::SlotOutOfRange { index: 3, count: 3 }
        ));
    }

    #[test]
    fn name_assigns_local_player_identity() {
        let mut session = bootstrapped(1);
        let outcome = session
            .apply(ServerMessage::decode("name\nAlice\n#ff0000").unwrap())
            .unwrap();
        assert_eq!(
            outcome.event,
            Some(BombgridEvent::NameAssigned {
                name: "Alice".into(),
                color: "#ff0000".into(),
            })
        );
        assert_eq!(session.player_name(), Some("Alice"));
        assert_eq!(session.player_color(), Some("#ff0000"));
    }

    #[test]
    fn board_replaces_scoreboard_wholesale() {
        let mut session = bootstrapped(1);
        session
            .apply(frame("board\nAlice\n#f00\n12\nBob\n#0f0\n7"))
            .unwrap();
        assert_eq!(session.scoreboard().len(), 2);

        // A later snapshot fully replaces the previous one.
        session.apply(frame("board\nCarol\n#00f\n1")).unwrap();
        assert_eq!(session.scoreboard().len(), 1);
        assert_eq!(session.scoreboard()[0].name, "Carol");
        assert_eq!(session.render_scoreboard().len(), 2);
    }

    #[test]
    fn press_on_clickable_slot_emits_move_and_clears_gate() {
        let mut session = bootstrapped(3);
        session.apply(frame("status\n1 X")).unwrap();

        let frame = session.press(1, MoveAction::StrongLeft);
        assert_eq!(
            frame,
            Some(ClientMessage::Move {
                index: 1,
                action: MoveAction::StrongLeft,
            })
        );
        // Cleared before any server acknowledgment.
        assert!(!session.slot(1).unwrap().clickable);
        // The visual state is untouched by the press itself.
        assert_eq!(session.slot(1).unwrap().display, DisplayState::Defused);
    }

    #[test]
    fn press_on_non_clickable_slot_is_discarded() {
        let mut session = bootstrapped(3);
        assert_eq!(session.press(0, MoveAction::WeakRight), None);
        assert!(!session.slot(0).unwrap().clickable);
    }

    #[test]
    fn press_out_of_range_is_discarded() {
        let mut session = bootstrapped(2);
        assert_eq!(session.press(5, MoveAction::WeakLeft), None);
    }

    #[test]
    fn press_before_bootstrap_is_discarded() {
        let mut session = GameSession::new(1);
        assert_eq!(session.press(0, MoveAction::StrongRight), None);
    }

    #[test]
    fn only_a_new_status_x_rearms_a_pressed_slot() {
        let mut session = bootstrapped(2);
        session.apply(frame("status\n0 X")).unwrap();
        session.press(0, MoveAction::StrongLeft).unwrap();

        // L/R updates do not re-arm.
        session.apply(frame("status\n0 L")).unwrap();
        assert_eq!(session.press(0, MoveAction::StrongLeft), None);

        session.apply(frame("status\n0 X")).unwrap();
        assert!(session.press(0, MoveAction::StrongLeft).is_some());
    }

    #[test]
    fn full_defusal_scenario() {
        // hello 3 → status 1 X → press strong-left → second press discarded.
        let mut session = GameSession::new(13);

        let outcome = session.apply(frame("hello\n3")).unwrap();
        assert_eq!(
            outcome.reply.unwrap().encode(),
            "olleh\n13"
        );
        assert_eq!(session.slot_count(), 3);
        assert!(session.slots().iter().all(|s| !s.clickable));

        session.apply(frame("status\n1 X")).unwrap();
        assert!(session.slot(1).unwrap().clickable);
        assert_eq!(session.slot(1).unwrap().display, DisplayState::Defused);

        let frame = session.press(1, MoveAction::StrongLeft).unwrap();
        assert_eq!(frame.encode(), "move\n1 L3");
        assert!(!session.slot(1).unwrap().clickable);

        assert_eq!(session.press(1, MoveAction::StrongLeft), None);
    }

    #[test]
    fn display_state_glyphs() {
        assert_eq!(DisplayState::Unset.glyph(), "");
        assert_eq!(DisplayState::Armed(Side::Left).glyph(), "L");
        assert_eq!(DisplayState::Armed(Side::Right).glyph(), "R");
        assert_eq!(DisplayState::Defused.glyph(), "X");
    }
}
