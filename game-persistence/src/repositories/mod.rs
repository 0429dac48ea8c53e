pub mod game_repository;
pub mod question_repository;
pub mod user_repository;

pub use game_repository::{GameRepository, StoredGame};
pub use question_repository::QuestionRepository;
pub use user_repository::UserRepository;
