use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The fixed mood vocabulary. Every classifier output is one of these.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Angry,
    Surprised,
    #[default]
    Neutral,
    Sleepy,
    Excited,
    Stressed,
    Calm,
    Confused,
    Fearful,
    Disgusted,
    Bored,
    Depressed,
    Anxious,
    Frustrated,
    Lonely,
    Guilty,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown mood: {0}")]
pub struct UnknownMood(pub String);

impl Mood {
    /// Vocabulary in canonical order. Classifier output units follow this order.
    pub const ALL: [Mood; 18] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Angry,
        Mood::Surprised,
        Mood::Neutral,
        Mood::Sleepy,
        Mood::Excited,
        Mood::Stressed,
        Mood::Calm,
        Mood::Confused,
        Mood::Fearful,
        Mood::Disgusted,
        Mood::Bored,
        Mood::Depressed,
        Mood::Anxious,
        Mood::Frustrated,
        Mood::Lonely,
        Mood::Guilty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Angry => "angry",
            Mood::Surprised => "surprised",
            Mood::Neutral => "neutral",
            Mood::Sleepy => "sleepy",
            Mood::Excited => "excited",
            Mood::Stressed => "stressed",
            Mood::Calm => "calm",
            Mood::Confused => "confused",
            Mood::Fearful => "fearful",
            Mood::Disgusted => "disgusted",
            Mood::Bored => "bored",
            Mood::Depressed => "depressed",
            Mood::Anxious => "anxious",
            Mood::Frustrated => "frustrated",
            Mood::Lonely => "lonely",
            Mood::Guilty => "guilty",
        }
    }

    /// Parse a label, coercing anything outside the vocabulary to `Neutral`.
    pub fn from_label(label: &str) -> Mood {
        label.parse().unwrap_or(Mood::Neutral)
    }

    /// Position in [`Mood::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Mood at position `index` of [`Mood::ALL`], `Neutral` when out of range.
    pub fn from_index(index: usize) -> Mood {
        Mood::ALL.get(index).copied().unwrap_or(Mood::Neutral)
    }

    /// One-line explanation shown next to the detected mood.
    pub fn description(&self) -> &'static str {
        match self {
            Mood::Happy => "Positive mouth curvature and active eyes: cheerful state.",
            Mood::Sad => "Low facial activation and downturned lips: low-energy state.",
            Mood::Angry => "High-frequency eye pattern with tight mouth indicates agitation or tension.",
            Mood::Surprised => "High amplitude and rapid motion indicate surprise.",
            Mood::Neutral => "Balanced movement and curvature suggest neutral mood.",
            Mood::Sleepy => "Low amplitude and slower temporal variation indicate drowsiness.",
            Mood::Excited => "Strong activity and a smiling profile indicate excitement.",
            Mood::Stressed => "Mixed jitter with compressed mouth profile indicates stress.",
            Mood::Calm => "Stable, low-variance movements suggest calmness.",
            Mood::Confused => "Uneven activity with uncertain mouth profile suggests confusion.",
            Mood::Fearful => "High alert-eye pattern with constrained smile suggests fearfulness.",
            Mood::Disgusted => "Tight upper-lip profile with irregular eye response suggests disgust.",
            Mood::Bored => "Low movement and flat curvature indicate boredom.",
            Mood::Depressed => "Very low facial-energy profile suggests a depressed affect state.",
            Mood::Anxious => "High micro-variability in eye signal indicates anxious state.",
            Mood::Frustrated => "Tension-heavy profile with uneven mouth movement indicates frustration.",
            Mood::Lonely => "Muted expression with low engagement suggests loneliness.",
            Mood::Guilty => "Constrained smile and unstable eye rhythm indicate possible guilt-like mood.",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = UnknownMood;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Mood::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownMood(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_labels() {
        for mood in Mood::ALL {
            assert_eq!(mood.as_str().parse::<Mood>().unwrap(), mood);
            assert_eq!(Mood::from_index(mood.index()), mood);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("  Happy ".parse::<Mood>().unwrap(), Mood::Happy);
    }

    #[test]
    fn test_unknown_label_coerces_to_neutral() {
        assert!("euphoric".parse::<Mood>().is_err());
        assert_eq!(Mood::from_label("euphoric"), Mood::Neutral);
        assert_eq!(Mood::from_index(99), Mood::Neutral);
    }

    #[test]
    fn test_every_mood_has_description() {
        for mood in Mood::ALL {
            assert!(!mood.description().is_empty());
        }
    }

    #[test]
    fn test_display_is_lowercase() {
        assert_eq!(Mood::Sleepy.to_string(), "sleepy");
    }
}
