pub mod game;
pub mod question;
pub mod user;
pub mod errors;

pub type GameId = uuid::Uuid;
pub type UserId = uuid::Uuid;

// Re-export all types
pub use game::*;
pub use question::*;
pub use user::*;
pub use errors::*;
