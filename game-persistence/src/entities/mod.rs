pub mod prelude;

pub mod game_questions;
pub mod games;
pub mod questions;
pub mod users;
