use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{GameId, GameStatus, HelpType, UserId};

/// Coarse classification used by callers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ErrorKind {
    Conflict,
    InvalidState,
    NotFound,
    Forbidden,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, thiserror::Error)]
#[ts(export)]
pub enum GameError {
    #[error("User {user_id} already has an active game")]
    ActiveGameExists {
        user_id: UserId,
        game_id: Option<GameId>,
    },
    #[error("Game is already finished ({status})")]
    GameAlreadyFinished { status: GameStatus },
    #[error("Help {help:?} has already been used in this game")]
    HelpAlreadyUsed { help: HelpType },
    #[error("Cannot take money before answering the first question")]
    NothingToTake,
    #[error("Game was modified concurrently, reload and retry")]
    StaleGame,
    #[error("Game not found: {game_id}")]
    GameNotFound { game_id: GameId },
    #[error("User not found: {user_id}")]
    UserNotFound { user_id: UserId },
    #[error("Game {game_id} belongs to another user")]
    NotGameOwner { game_id: GameId },
    #[error("Question bank has no question for level {level}")]
    NoQuestionForLevel { level: u8 },
    #[error("Invalid game data: {message}")]
    InvalidGameData { message: String },
    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::ActiveGameExists { .. } => ErrorKind::Conflict,
            GameError::GameAlreadyFinished { .. }
            | GameError::HelpAlreadyUsed { .. }
            | GameError::NothingToTake
            | GameError::StaleGame => ErrorKind::InvalidState,
            GameError::GameNotFound { .. } | GameError::UserNotFound { .. } => ErrorKind::NotFound,
            GameError::NotGameOwner { .. } => ErrorKind::Forbidden,
            GameError::NoQuestionForLevel { .. }
            | GameError::InvalidGameData { .. }
            | GameError::Storage { .. } => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_kinds() {
        let conflict = GameError::ActiveGameExists {
            user_id: Uuid::new_v4(),
            game_id: Some(Uuid::new_v4()),
        };
        assert_eq!(conflict.kind(), ErrorKind::Conflict);
        assert_eq!(
            GameError::HelpAlreadyUsed { help: HelpType::FiftyFifty }.kind(),
            ErrorKind::InvalidState
        );
        assert_eq!(GameError::StaleGame.kind(), ErrorKind::InvalidState);
        assert_eq!(
            GameError::GameNotFound { game_id: Uuid::new_v4() }.kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_error_messages() {
        let err = GameError::GameAlreadyFinished { status: GameStatus::Money };
        assert_eq!(err.to_string(), "Game is already finished (money)");
    }
}
