//! Scoreboard snapshot types and the pure render projection.
//!
//! The server always sends a *full* scoreboard snapshot; entries carry no
//! identity across snapshots, so rendering is a wholesale replacement of the
//! prior output, never an incremental patch.

/// One row of a scoreboard snapshot.
///
/// `score` is pre-formatted display text from the server, not necessarily an
/// integer — treat it as opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreboardEntry {
    pub name: String,
    /// Opaque color token (e.g. a CSS color) for the player's swatch.
    pub color: String,
    pub score: String,
}

/// One element of the flat scoreboard render list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayUnit {
    /// Composite unit: the player's color swatch plus display name.
    PlayerTag { color: String, name: String },
    /// The player's score text, rendered after their tag.
    ScoreLabel { text: String },
}

/// Project a scoreboard snapshot into its flat render list.
///
/// Each entry yields two units — a [`DisplayUnit::PlayerTag`] followed by a
/// [`DisplayUnit::ScoreLabel`] — in exactly the order the entries arrived.
/// The result fully replaces any previously rendered output.
pub fn render(entries: &[ScoreboardEntry]) -> Vec<DisplayUnit> {
    let mut units = Vec::with_capacity(entries.len() * 2);
    for entry in entries {
        units.push(DisplayUnit::PlayerTag {
            color: entry.color.clone(),
            name: entry.name.clone(),
        });
        units.push(DisplayUnit::ScoreLabel {
            text: entry.score.clone(),
        });
    }
    units
}

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

    fn entry(name: &str, color: &str, score: &str) -> ScoreboardEntry {
        ScoreboardEntry {
            name: name.into(),
            color: color.into(),
            score: score.into(),
        }
    }

    #[test]
    fn render_is_two_units_per_entry_in_input_order() {
        let entries = vec![entry("Alice", "#f00", "12"), entry("Bob", "#0f0", "7")];
        let units = render(&entries);
        assert_eq!(units.len(), 4);
        assert_eq!(
            units[0],
            DisplayUnit::PlayerTag {
                color: "#f00".into(),
                name: "Alice".into(),
            }
        );
        assert_eq!(units[1], DisplayUnit::ScoreLabel { text: "12".into() });
        assert_eq!(
            units[2],
            DisplayUnit::PlayerTag {
                color: "#0f0".into(),
                name: "Bob".into(),
            }
        );
        assert_eq!(units[3], DisplayUnit::ScoreLabel { text: "7".into() });
    }

    #[test]
    fn render_empty_snapshot_is_empty() {
        assert!(render(&[]).is_empty());
    }

    #[test]
    fn score_text_is_opaque() {
        // Scores are display strings, not numbers.
        let units = render(&[entry("Eve", "#00f", "3½")]);
        assert_eq!(units[1], DisplayUnit::ScoreLabel { text: "3½".into() });
    }
}
