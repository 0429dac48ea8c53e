pub mod connection;
pub mod entities;
pub mod repositories;

use game_types::GameError;
use sea_orm::DbErr;

/// Storage failures surface to callers as internal errors.
pub fn storage_error(err: DbErr) -> GameError {
    tracing::error!("Database error: {}", err);
    GameError::Storage {
        message: err.to_string(),
    }
}
