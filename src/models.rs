use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default rendering for `MoodEntry::timestamp_formatted`, e.g. `14 Nov 2023, 10:13 PM`
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%d %b %Y, %I:%M %p";

/// The fixed mood palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Happy,
    Calm,
    Neutral,
    Sad,
    Anxious,
}

impl Mood {
    /// Every mood, in display order
    pub const ALL: [Mood; 5] = [Mood::Happy, Mood::Calm, Mood::Neutral, Mood::Sad, Mood::Anxious];

    pub fn label(self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Calm => "Calm",
            Mood::Neutral => "Neutral",
            Mood::Sad => "Sad",
            Mood::Anxious => "Anxious",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Calm => "🙂",
            Mood::Neutral => "😐",
            Mood::Sad => "😟",
            Mood::Anxious => "😬",
        }
    }

    /// Display color as a hex string understood by `tui::widgets::color::parse_color`
    pub fn color(self) -> &'static str {
        match self {
            Mood::Happy => "#66BB6A",
            Mood::Calm => "#42A5F5",
            Mood::Neutral => "#FFA726",
            Mood::Sad => "#7986CB",
            Mood::Anxious => "#FF7043",
        }
    }

    /// Parse a palette label
    /// Accepts the bare name in any case ("happy") or the "Name Glyph" display form ("Happy 😊")
    pub fn from_label(label: &str) -> Option<Mood> {
        let name = label.split_whitespace().next()?;
        Mood::ALL
            .into_iter()
            .find(|mood| mood.label().eq_ignore_ascii_case(name))
            .filter(|mood| {
                // Anything after the name must be this mood's glyph
                let rest = label.trim().get(name.len()..).unwrap_or("").trim();
                rest.is_empty() || rest == mood.glyph()
            })
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown mood: {0:?}")]
pub struct UnknownMood(pub String);

impl FromStr for Mood {
    type Err = UnknownMood;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::from_label(s).ok_or_else(|| UnknownMood(s.to_string()))
    }
}

/// One logged mood. `timestamp` (milliseconds since epoch) is the identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub timestamp: i64,
    pub mood: String,
    pub timestamp_formatted: String, // rendered once at creation, stored alongside
}

impl MoodEntry {
    /// Create an entry, rendering the timestamp in local time with `format`
    pub fn new(timestamp: i64, mood: Mood, format: &str) -> Self {
        Self {
            timestamp,
            mood: mood.label().to_string(),
            timestamp_formatted: crate::utils::format_timestamp(timestamp, format),
        }
    }

    /// Palette entry for the stored label, if it still names one
    pub fn mood_kind(&self) -> Option<Mood> {
        Mood::from_label(&self.mood)
    }
}
