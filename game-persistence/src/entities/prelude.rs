pub use super::game_questions::Entity as GameQuestions;
pub use super::games::Entity as Games;
pub use super::questions::Entity as Questions;
pub use super::users::Entity as Users;
