pub mod game_question;
pub mod game_state;
pub mod lifelines;
pub mod prize_table;
pub mod question_bank;
pub mod rng;
pub mod timeout;

// Re-export main components
pub use game_question::*;
pub use game_state::*;
pub use lifelines::*;
pub use prize_table::*;
pub use question_bank::*;
pub use rng::*;
pub use timeout::*;
