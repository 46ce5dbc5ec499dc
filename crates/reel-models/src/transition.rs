//! Visual transitions accepted by FFmpeg's `xfade` filter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Transition effect used when crossfading two video clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    /// Blend with a noisy dissolve
    #[default]
    Dissolve,
    /// Plain linear crossfade
    Fade,
    FadeBlack,
    FadeWhite,
    WipeLeft,
    WipeRight,
    SlideLeft,
    SlideRight,
    CircleOpen,
    CircleClose,
    Pixelize,
}

impl Transition {
    pub const ALL: &'static [Transition] = &[
        Transition::Dissolve,
        Transition::Fade,
        Transition::FadeBlack,
        Transition::FadeWhite,
        Transition::WipeLeft,
        Transition::WipeRight,
        Transition::SlideLeft,
        Transition::SlideRight,
        Transition::CircleOpen,
        Transition::CircleClose,
        Transition::Pixelize,
    ];

    /// Name understood by `xfade=transition=`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Dissolve => "dissolve",
            Transition::Fade => "fade",
            Transition::FadeBlack => "fadeblack",
            Transition::FadeWhite => "fadewhite",
            Transition::WipeLeft => "wipeleft",
            Transition::WipeRight => "wiperight",
            Transition::SlideLeft => "slideleft",
            Transition::SlideRight => "slideright",
            Transition::CircleOpen => "circleopen",
            Transition::CircleClose => "circleclose",
            Transition::Pixelize => "pixelize",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Transition {
    type Err = TransitionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| TransitionParseError(s.to_string()))
    }
}

#[derive(Debug, Error)]
#[error("Unknown transition: {0}")]
pub struct TransitionParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_parse() {
        assert_eq!("dissolve".parse::<Transition>().unwrap(), Transition::Dissolve);
        assert_eq!("WipeLeft".parse::<Transition>().unwrap(), Transition::WipeLeft);
        assert!("swirl".parse::<Transition>().is_err());
        assert_eq!(Transition::default(), Transition::Dissolve);
    }

    #[test]
    fn test_transition_serde_matches_filter_name() {
        for t in Transition::ALL {
            let json = serde_json::to_string(t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
        }
    }
}
