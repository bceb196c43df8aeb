use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The option marked for a single question, or `Blank` when nothing was
/// marked.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AnswerLabel {
    A,
    B,
    C,
    D,
    E,
    Blank,
}

pub const BLANK_MARKER: &str = "BLANK";

/// Answers in question order, index 0 is question 1.
pub type AnswerList = Vec<AnswerLabel>;

impl AnswerLabel {
    pub const OPTIONS: [AnswerLabel; 5] = [
        AnswerLabel::A,
        AnswerLabel::B,
        AnswerLabel::C,
        AnswerLabel::D,
        AnswerLabel::E,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerLabel::A => "A",
            AnswerLabel::B => "B",
            AnswerLabel::C => "C",
            AnswerLabel::D => "D",
            AnswerLabel::E => "E",
            AnswerLabel::Blank => BLANK_MARKER,
        }
    }

    pub fn is_blank(&self) -> bool {
        *self == AnswerLabel::Blank
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAnswerLabelError(pub String);

impl Display for ParseAnswerLabelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid answer label: {:?}", self.0)
    }
}

impl std::error::Error for ParseAnswerLabelError {}

impl FromStr for AnswerLabel {
    type Err = ParseAnswerLabelError;

    /// Empty text reads as blank, everything else must be a canonical label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" => Ok(AnswerLabel::A),
            "B" => Ok(AnswerLabel::B),
            "C" => Ok(AnswerLabel::C),
            "D" => Ok(AnswerLabel::D),
            "E" => Ok(AnswerLabel::E),
            "" | BLANK_MARKER => Ok(AnswerLabel::Blank),
            other => Err(ParseAnswerLabelError(other.to_string())),
        }
    }
}

impl Display for AnswerLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<'de> Deserialize<'de> for AnswerLabel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for AnswerLabel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Outcome of comparing a submission against an answer key.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScoreTally {
    pub correct: u32,
    pub incorrect: u32,
    pub blank: u32,
}

impl Display for ScoreTally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "correct: {}, incorrect: {}, blank: {}",
            self.correct, self.incorrect, self.blank
        )
    }
}
