use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

const SECONDS_BY: &str = " seconds by";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub difficulty: Difficulty,
    pub seconds: u16,
    pub name: String,
}

impl HighScoreEntry {
    fn sort_key(&self) -> (Difficulty, u16) {
        (self.difficulty, self.seconds)
    }

    /// Parses a single `"<Difficulty>: <secs> seconds by <name>"` line.
    fn parse_line(line: &str) -> Option<Self> {
        let (difficulty, rest) = line.split_once(": ")?;
        let difficulty = Difficulty::from_name(difficulty.trim())?;
        let (seconds, name) = rest.split_once(SECONDS_BY)?;
        // an empty name may have lost its separating space
        if !name.is_empty() && !name.starts_with(char::is_whitespace) {
            return None;
        }
        let seconds = seconds.trim().parse().ok()?;
        Some(Self {
            difficulty,
            seconds,
            name: name.trim().into(),
        })
    }
}

impl fmt::Display for HighScoreEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}{} {}", self.difficulty, self.seconds, SECONDS_BY, self.name)
    }
}

/// Best time per difficulty, sorted by difficulty then time.
///
/// Rendering with `Display` gives the line-oriented record that [`HighScores::parse`]
/// reads back, storing it somewhere is up to the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighScores {
    entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the table from its text form, skipping lines that don't parse.
    pub fn parse(text: &str) -> Self {
        let mut scores = Self::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match HighScoreEntry::parse_line(line) {
                Some(entry) => {
                    scores.record(&entry.name, entry.seconds, entry.difficulty);
                }
                None => log::warn!("Skipping malformed high score line: {:?}", line),
            }
        }
        scores
    }

    pub fn entries(&self) -> &[HighScoreEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best(&self, difficulty: Difficulty) -> Option<&HighScoreEntry> {
        self.entries
            .iter()
            .find(|entry| entry.difficulty == difficulty)
    }

    /// A time qualifies when it beats the current best or there is none yet.
    pub fn is_high_score(&self, seconds: u16, difficulty: Difficulty) -> bool {
        self.best(difficulty)
            .is_none_or(|best| seconds < best.seconds)
    }

    /// Records a time if it qualifies, replacing the previous best for that difficulty.
    pub fn record(&mut self, name: &str, seconds: u16, difficulty: Difficulty) -> bool {
        if !self.is_high_score(seconds, difficulty) {
            return false;
        }

        self.entries.retain(|entry| entry.difficulty != difficulty);
        let entry = HighScoreEntry {
            difficulty,
            seconds,
            name: sanitize_name(name),
        };
        log::debug!("New high score: {}", entry);

        let index = self
            .entries
            .partition_point(|other| other.sort_key() < entry.sort_key());
        self.entries.insert(index, entry);
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Human readable listing, with a placeholder when nothing was recorded.
    pub fn summary(&self) -> String {
        use alloc::string::ToString;
        if self.is_empty() {
            "No high scores yet!".into()
        } else {
            self.to_string()
        }
    }
}

impl fmt::Display for HighScores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}

/// Keeps a name on one line so the record stays one entry per line.
fn sanitize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}
