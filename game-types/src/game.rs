use crate::{GameId, Letter, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum GameStatus {
    InProgress, // Waiting for an answer
    Won,        // Whole ladder answered
    Fail,       // Wrong answer given
    Money,      // Player cashed out
    Timeout,    // Time limit reported as elapsed
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        self != GameStatus::InProgress
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::InProgress => "in_progress",
            GameStatus::Won => "won",
            GameStatus::Fail => "fail",
            GameStatus::Money => "money",
            GameStatus::Timeout => "timeout",
        }
    }

    pub fn parse(value: &str) -> Option<GameStatus> {
        match value {
            "in_progress" => Some(GameStatus::InProgress),
            "won" => Some(GameStatus::Won),
            "fail" => Some(GameStatus::Fail),
            "money" => Some(GameStatus::Money),
            "timeout" => Some(GameStatus::Timeout),
            _ => None,
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum HelpType {
    AudienceHelp,
    FiftyFifty,
    FriendCall,
}

impl HelpType {
    pub const ALL: [HelpType; 3] = [
        HelpType::AudienceHelp,
        HelpType::FiftyFifty,
        HelpType::FriendCall,
    ];
}

/// Payloads left behind by lifelines on one question. Entries are only ever added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HelpHash {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience_help: Option<BTreeMap<Letter, u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fifty_fifty: Option<Vec<Letter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friend_call: Option<String>,
}

impl HelpHash {
    pub fn is_empty(&self) -> bool {
        self.audience_help.is_none() && self.fifty_fifty.is_none() && self.friend_call.is_none()
    }
}

/// Per-game lifeline flags; each flips false -> true at most once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HelpUsage {
    pub audience_help_used: bool,
    pub fifty_fifty_used: bool,
    pub friend_call_used: bool,
}

impl HelpUsage {
    pub fn is_used(&self, help: HelpType) -> bool {
        match help {
            HelpType::AudienceHelp => self.audience_help_used,
            HelpType::FiftyFifty => self.fifty_fifty_used,
            HelpType::FriendCall => self.friend_call_used,
        }
    }

    pub fn mark_used(&mut self, help: HelpType) {
        match help {
            HelpType::AudienceHelp => self.audience_help_used = true,
            HelpType::FiftyFifty => self.fifty_fifty_used = true,
            HelpType::FriendCall => self.friend_call_used = true,
        }
    }
}

/// Read-only projection of a game for presentation layers.
/// Never exposes which letter is correct.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameView {
    pub id: GameId,
    pub user_id: UserId,
    pub status: GameStatus,
    pub current_level: u32,
    pub prize: u32,
    pub help_usage: HelpUsage,
    pub current_question: Option<QuestionView>,
    pub created_at: String,          // ISO 8601 string
    pub finished_at: Option<String>, // ISO 8601 string
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuestionView {
    pub level: u8,
    pub text: String,
    /// Variants still on screen: all four, or two after fifty-fifty.
    pub variants: BTreeMap<Letter, String>,
    pub help: HelpHash,
}

/// Result of submitting an answer, returned to presentation layers.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnswerResult {
    pub answer_correct: bool,
    /// Revealed only once the game has ended on this answer.
    pub correct_answer: Option<Letter>,
    pub game: GameView,
}

/// One line of a user's game history, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameSummary {
    pub id: GameId,
    pub status: GameStatus,
    pub current_level: u32,
    pub prize: u32,
    pub created_at: String,          // ISO 8601 string
    pub finished_at: Option<String>, // ISO 8601 string
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_storage_name() {
        for status in [
            GameStatus::InProgress,
            GameStatus::Won,
            GameStatus::Fail,
            GameStatus::Money,
            GameStatus::Timeout,
        ] {
            assert_eq!(GameStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(GameStatus::parse("finished"), None);
        assert!(!GameStatus::InProgress.is_terminal());
        assert!(GameStatus::Timeout.is_terminal());
    }

    #[test]
    fn test_empty_help_hash_serializes_to_empty_object() {
        let json = serde_json::to_string(&HelpHash::default()).unwrap();
        assert_eq!(json, "{}");

        let parsed: HelpHash = serde_json::from_str("{}").unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_help_hash_keys_use_letters() {
        let hash = HelpHash {
            fifty_fifty: Some(vec![Letter::A, Letter::C]),
            ..Default::default()
        };
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, r#"{"fifty_fifty":["a","c"]}"#);
        assert!(!hash.is_empty());
    }

    #[test]
    fn test_help_usage_flags() {
        let mut usage = HelpUsage::default();
        assert!(!usage.is_used(HelpType::AudienceHelp));
        usage.mark_used(HelpType::AudienceHelp);
        assert!(usage.is_used(HelpType::AudienceHelp));
        assert!(!usage.is_used(HelpType::FriendCall));
    }
}
