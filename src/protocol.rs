//! Wire codec for the Bombgrid line protocol.
//!
//! Each frame is a single text message whose fields are separated by `\n`;
//! field 0 is the command tag. The `status` payload and the outbound `move`
//! payload are compound fields whose sub-values are separated by a single
//! space. There is no escaping scheme: field values must never contain the
//! delimiters, which is a protocol-level contract, not something this codec
//! enforces.
//!
//! Inbound frames decode into the closed [`ServerMessage`] variant set, with
//! an explicit [`ServerMessage::Unrecognized`] fallback so future command
//! tags degrade gracefully instead of erroring. Outbound [`ClientMessage`]s
//! encode via [`ClientMessage::encode`], the exact inverse of
//! [`ClientMessage::decode`].

use std::fmt;
use std::str::FromStr;

use crate::error::DecodeError;
use crate::scoreboard::ScoreboardEntry;

// ── Type aliases ────────────────────────────────────────────────────

/// Index of one bomb slot in the shared grid, assigned at bootstrap.
pub type SlotIndex = u32;

/// Total number of bomb slots announced by the bootstrap frame.
pub type SlotCount = u32;

/// The integer identity a client announces once per connection.
pub type ClientIdentity = u32;

// ── Subfield types ──────────────────────────────────────────────────

/// Which way an armed bomb's defuse indicator faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Per-slot code carried by a `status` frame.
///
/// The set of codes is closed by protocol contract, but unknown codes are
/// preserved rather than rejected so the dispatcher can treat them as a
/// no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusCode {
    /// `X` — the slot is defused and actionable by this client.
    Defused,
    /// `L` / `R` — the slot is armed, indicator facing the given side.
    Armed(Side),
    /// Any other code, carried verbatim.
    Other(String),
}

impl StatusCode {
    fn parse(raw: &str) -> Self {
        match raw {
            "X" => StatusCode::Defused,
            "L" => StatusCode::Armed(Side::Left),
            "R" => StatusCode::Armed(Side::Right),
            other => StatusCode::Other(other.to_string()),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCode::Defused => f.write_str("X"),
            StatusCode::Armed(Side::Left) => f.write_str("L"),
            StatusCode::Armed(Side::Right) => f.write_str("R"),
            StatusCode::Other(code) => f.write_str(code),
        }
    }
}

/// One of the four directional move intents a slot exposes.
///
/// The asymmetry between the left and right magnitudes (`L3`/`L1` vs
/// `R1`/`R2`) is a game-rule detail the client forwards without
/// interpreting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveAction {
    /// Token `L3`.
    StrongLeft,
    /// Token `L1`.
    WeakLeft,
    /// Token `R1`.
    WeakRight,
    /// Token `R2`.
    StrongRight,
}

impl MoveAction {
    /// The wire token for this action.
    pub fn token(self) -> &'static str {
        match self {
            MoveAction::StrongLeft => "L3",
            MoveAction::WeakLeft => "L1",
            MoveAction::WeakRight => "R1",
            MoveAction::StrongRight => "R2",
        }
    }

    /// All four actions, in left-to-right display order.
    pub const ALL: [MoveAction; 4] = [
        MoveAction::StrongLeft,
        MoveAction::WeakLeft,
        MoveAction::WeakRight,
        MoveAction::StrongRight,
    ];
}

impl FromStr for MoveAction {
    type Err = DecodeError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "L3" => Ok(MoveAction::StrongLeft),
            "L1" => Ok(MoveAction::WeakLeft),
            "R1" => Ok(MoveAction::WeakRight),
            "R2" => Ok(MoveAction::StrongRight),
            other => Err(DecodeError::BadActionToken(other.to_string())),
        }
    }
}

impl fmt::Display for MoveAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

// ── Messages ────────────────────────────────────────────────────────

/// Frames sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// `hello\n<count>` — bootstrap: the total slot count for this
    /// connection. Sent once; the only frame that creates structure.
    Hello {
        count: SlotCount,
    },
    /// `name\n<displayName>\n<colorToken>` — this client's assigned display
    /// name and color swatch. Always targets the local player.
    Name {
        name: String,
        color: String,
    },
    /// `status\n<index> <code>` — one slot changed state.
    Status {
        index: SlotIndex,
        code: StatusCode,
    },
    /// `board\n<name>\n<color>\n<score>\n…` — a full scoreboard snapshot:
    /// a flat field list of `3K` values after the tag, one value per line.
    Board {
        entries: Vec<ScoreboardEntry>,
    },
    /// A frame whose command tag is not part of this protocol version.
    /// Dispatched as a no-op rather than an error.
    Unrecognized {
        /// The unknown command tag, verbatim.
        command: String,
    },
}

impl ServerMessage {
    /// Decode one inbound text frame.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when a *known* command arrives with the
    /// wrong field arity or a non-numeric field where a number is required.
    /// Unknown command tags are not an error — they decode to
    /// [`ServerMessage::Unrecognized`].
    pub fn decode(frame: &str) -> Result<Self, DecodeError> {
        let fields: Vec<&str> = frame.split('\n').collect();
        let command = fields.first().copied().unwrap_or_default();

        match command {
            "" => Err(DecodeError::EmptyFrame),
            "hello" => {
                let raw = expect_arity("hello", &fields, 2)?;
                let count = parse_number("hello", raw)?;
                Ok(ServerMessage::Hello { count })
            }
            "name" => {
                if fields.len() != 3 {
                    return Err(DecodeError::WrongFieldCount {
                        command: "name",
                        expected: 3,
                        got: fields.len(),
                    });
                }
                let mut rest = fields.iter().skip(1);
                let name = rest.next().copied().unwrap_or_default().to_string();
                let color = rest.next().copied().unwrap_or_default().to_string();
                Ok(ServerMessage::Name { name, color })
            }
            "status" => {
                let payload = expect_arity("status", &fields, 2)?;
                let parts: Vec<&str> = payload.split(' ').collect();
                if parts.len() != 2 {
                    return Err(DecodeError::WrongFieldCount {
                        command: "status",
                        expected: 2,
                        got: parts.len(),
                    });
                }
                let mut parts = parts.into_iter();
                let index = parse_number("status", parts.next().unwrap_or_default())?;
                let code = StatusCode::parse(parts.next().unwrap_or_default());
                Ok(ServerMessage::Status { index, code })
            }
            "board" => {
                // Triples of (name, color, score), one field per line. A
                // trailing partial triple is ignored, matching the server's
                // floor-division framing.
                let mut rest = fields.iter().skip(1);
                let mut entries = Vec::new();
                while let (Some(name), Some(color), Some(score)) =
                    (rest.next(), rest.next(), rest.next())
                {
                    entries.push(ScoreboardEntry {
                        name: (*name).to_string(),
                        color: (*color).to_string(),
                        score: (*score).to_string(),
                    });
                }
                Ok(ServerMessage::Board { entries })
            }
            other => Ok(ServerMessage::Unrecognized {
                command: other.to_string(),
            }),
        }
    }
}

/// Frames sent from client to server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMessage {
    /// `olleh\n<identity>` — announce this client's identity, sent exactly
    /// once, immediately after the bootstrap frame.
    Announce { identity: ClientIdentity },
    /// `move\n<index> <actionToken>` — act on a slot.
    Move {
        index: SlotIndex,
        action: MoveAction,
    },
}

impl ClientMessage {
    /// Encode this message into one outbound text frame.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Decode one client-to-server frame. The inverse of
    /// [`encode`](Self::encode); useful for test harnesses and servers.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] for unknown tags, wrong arity, bad numbers,
    /// or an unknown action token.
    pub fn decode(frame: &str) -> Result<Self, DecodeError> {
        let fields: Vec<&str> = frame.split('\n').collect();
        let command = fields.first().copied().unwrap_or_default();

        match command {
            "" => Err(DecodeError::EmptyFrame),
            "olleh" => {
                let raw = expect_arity("olleh", &fields, 2)?;
                let identity = parse_number("olleh", raw)?;
                Ok(ClientMessage::Announce { identity })
            }
            "move" => {
                let payload = expect_arity("move", &fields, 2)?;
                let parts: Vec<&str> = payload.split(' ').collect();
                if parts.len() != 2 {
                    return Err(DecodeError::WrongFieldCount {
                        command: "move",
                        expected: 2,
                        got: parts.len(),
                    });
                }
                let mut parts = parts.into_iter();
                let index = parse_number("move", parts.next().unwrap_or_default())?;
                let action = parts.next().unwrap_or_default().parse()?;
                Ok(ClientMessage::Move { index, action })
            }
            other => Err(DecodeError::UnknownCommand(other.to_string())),
        }
    }
}

impl fmt::Display for ClientMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientMessage::Announce { identity } => write!(f, "olleh\n{identity}"),
            ClientMessage::Move { index, action } => write!(f, "move\n{index} {action}"),
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Require exactly `expected` fields and return field 1, the payload.
fn expect_arity<'a>(
    command: &'static str,
    fields: &[&'a str],
    expected: usize,
) -> Result<&'a str, DecodeError> {
    if fields.len() != expected {
        return Err(DecodeError::WrongFieldCount {
            command,
            expected,
            got: fields.len(),
        });
    }
    Ok(fields.get(1).copied().unwrap_or_default())
}

fn parse_number(command: &'static str, raw: &str) -> Result<u32, DecodeError> {
    raw.parse().map_err(|_| DecodeError::BadNumber {
        command,
        field: raw.to_string(),
    })
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

    #[test]
    fn decode_hello() {
        let msg = ServerMessage::decode("hello\n5").unwrap();
        assert_eq!(msg, ServerMessage::Hello { count: 5 });
    }

    #[test]
    fn decode_hello_bad_count() {
        let err = ServerMessage::decode("hello\nfive").unwrap_err();
        assert!(matches!(err, DecodeError::BadNumber { command: "hello", .. }));
    }

    #[test]
    fn decode_hello_wrong_arity() {
        let err = ServerMessage::decode("hello").unwrap_err();
        assert_eq!(
            err,
            DecodeError::WrongFieldCount {
                command: "hello",
                expected: 2,
                got: 1,
            }
        );
    }

    #[test]
    fn decode_name() {
        let msg = ServerMessage::decode("name\nAlice\n#ff0000").unwrap();
        assert_eq!(
            msg,
            ServerMessage::Name {
                name: "Alice".into(),
                color: "#ff0000".into(),
            }
        );
    }

    #[test]
    fn decode_status_codes() {
        assert_eq!(
            ServerMessage::decode("status\n2 X").unwrap(),
            ServerMessage::Status {
                index: 2,
                code: StatusCode::Defused,
            }
        );
        assert_eq!(
            ServerMessage::decode("status\n0 L").unwrap(),
            ServerMessage::Status {
                index: 0,
                code: StatusCode::Armed(Side::Left),
            }
        );
        assert_eq!(
            ServerMessage::decode("status\n7 R").unwrap(),
            ServerMessage::Status {
                index: 7,
                code: StatusCode::Armed(Side::Right),
            }
        );
    }

    #[test]
    fn decode_status_unknown_code_is_preserved() {
        let msg = ServerMessage::decode("status\n1 Q").unwrap();
        assert_eq!(
            msg,
            ServerMessage::Status {
                index: 1,
                code: StatusCode::Other("Q".into()),
            }
        );
    }

    #[test]
    fn decode_status_missing_subfield() {
        let err = ServerMessage::decode("status\n1").unwrap_err();
        assert!(matches!(err, DecodeError::WrongFieldCount { command: "status", .. }));
    }

    #[test]
    fn decode_board_triples() {
        let msg = ServerMessage::decode("board\nAlice\n#f00\n12\nBob\n#0f0\n7").unwrap();
        let ServerMessage::Board { entries } = msg else {
            panic!("expected Board");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Alice");
        assert_eq!(entries[0].color, "#f00");
        assert_eq!(entries[0].score, "12");
        assert_eq!(entries[1].name, "Bob");
    }

    #[test]
    fn decode_board_ignores_trailing_partial_triple() {
        let msg = ServerMessage::decode("board\nAlice\n#f00\n12\nBob\n#0f0").unwrap();
        let ServerMessage::Board { entries } = msg else {
            panic!("expected Board");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Alice");
    }

    #[test]
    fn decode_board_empty_snapshot() {
        let msg = ServerMessage::decode("board").unwrap();
        assert_eq!(msg, ServerMessage::Board { entries: vec![] });
    }

    #[test]
    fn decode_unknown_command_is_unrecognized() {
        let msg = ServerMessage::decode("goodbye\n1").unwrap();
        assert_eq!(
            msg,
            ServerMessage::Unrecognized {
                command: "goodbye".into(),
            }
        );
    }

    #[test]
    fn decode_empty_frame_is_an_error() {
        assert_eq!(ServerMessage::decode("").unwrap_err(), DecodeError::EmptyFrame);
    }

    #[test]
    fn encode_announce() {
        let frame = ClientMessage::Announce { identity: 42 }.encode();
        assert_eq!(frame, "olleh\n42");
    }

    #[test]
    fn encode_move() {
        let frame = ClientMessage::Move {
            index: 1,
            action: MoveAction::StrongLeft,
        }
        .encode();
        assert_eq!(frame, "move\n1 L3");
    }

    #[test]
    fn move_round_trip() {
        let msg = ClientMessage::Move {
            index: 3,
            action: MoveAction::WeakRight,
        };
        let decoded = ClientMessage::decode(&msg.encode()).unwrap();
        assert_eq!(
            decoded,
            ClientMessage::Move {
                index: 3,
                action: MoveAction::WeakRight,
            }
        );
    }

    #[test]
    fn announce_round_trip() {
        let msg = ClientMessage::Announce { identity: 199 };
        assert_eq!(ClientMessage::decode(&msg.encode()).unwrap(), msg);
    }

    #[test]
    fn action_tokens() {
        assert_eq!(MoveAction::StrongLeft.token(), "L3");
        assert_eq!(MoveAction::WeakLeft.token(), "L1");
        assert_eq!(MoveAction::WeakRight.token(), "R1");
        assert_eq!(MoveAction::StrongRight.token(), "R2");
    }

    #[test]
    fn bad_action_token() {
        let err = ClientMessage::decode("move\n0 L9").unwrap_err();
        assert_eq!(err, DecodeError::BadActionToken("L9".into()));
    }

    #[test]
    fn status_code_display_round_trips() {
        for raw in ["X", "L", "R", "Z"] {
            assert_eq!(StatusCode::parse(raw).to_string(), raw);
        }
    }
}
