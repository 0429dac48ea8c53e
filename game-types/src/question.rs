use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;
use uuid::Uuid;

/// Option letter shown to the player. Serialized lowercase (`"a"`..`"d"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Letter {
    A,
    B,
    C,
    D,
}

impl Letter {
    pub const ALL: [Letter; 4] = [Letter::A, Letter::B, Letter::C, Letter::D];

    pub fn index(self) -> usize {
        match self {
            Letter::A => 0,
            Letter::B => 1,
            Letter::C => 2,
            Letter::D => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Letter::A => "a",
            Letter::B => "b",
            Letter::C => "c",
            Letter::D => "d",
        }
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Letter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(Letter::A),
            "b" => Ok(Letter::B),
            "c" => Ok(Letter::C),
            "d" => Ok(Letter::D),
            other => Err(format!("Unknown answer letter: {}", other)),
        }
    }
}

/// Question content as supplied by the question bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Question {
    pub id: Uuid,
    pub level: u8,
    pub text: String,
    pub answers: [String; 4],
    pub correct_index: u8,
}

impl Question {
    pub fn correct_answer(&self) -> &str {
        &self.answers[self.correct_index as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_parsing() {
        assert_eq!("a".parse::<Letter>(), Ok(Letter::A));
        assert_eq!(" D ".parse::<Letter>(), Ok(Letter::D));
        assert!("e".parse::<Letter>().is_err());
    }

    #[test]
    fn test_letter_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Letter::B).unwrap(), "\"b\"");
    }
}
