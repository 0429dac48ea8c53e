#![allow(dead_code)]

use game_core::{GameRng, GameRules, TimeoutPolicy};
use game_persistence::connection::connect_to_memory_database;
use game_server::game_service::GameService;
use game_types::{GameId, GameView, Letter, Question, User};
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// `count` questions spread round-robin over 15 levels. The right answer's text starts
/// with "correct" so tests can find it after shuffling.
pub fn generate_questions(count: usize) -> Vec<Question> {
    (0..count)
        .map(|n| {
            let level = (n % 15) as u8;
            Question {
                id: Uuid::new_v4(),
                level,
                text: format!("Question {} for level {}", n, level),
                answers: [
                    format!("correct {}", n),
                    format!("wrong {}-1", n),
                    format!("wrong {}-2", n),
                    format!("wrong {}-3", n),
                ],
                correct_index: 0,
            }
        })
        .collect()
}

/// Test setup that provides a migrated in-memory database with a seeded question bank
pub struct TestGameServerSetup {
    pub game_service: Arc<GameService>,
    pub user: User,
}

impl TestGameServerSetup {
    pub async fn new() -> Self {
        Self::with_policy(GameRules::default(), TimeoutPolicy::default()).await
    }

    pub async fn with_policy(rules: GameRules, timeout_policy: TimeoutPolicy) -> Self {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let game_service = Arc::new(GameService::new(db, rules, timeout_policy, GameRng::new(7)));
        game_service
            .questions()
            .insert_questions(&generate_questions(60))
            .await
            .unwrap();
        let user = game_service.users().create_user("Alice").await.unwrap();

        Self { game_service, user }
    }

    /// Setup whose games are overdue as soon as they exist.
    pub async fn with_instant_timeout() -> Self {
        Self::with_policy(GameRules::default(), TimeoutPolicy::new(Duration::ZERO)).await
    }

    pub async fn create_user(&self, name: &str) -> User {
        self.game_service.users().create_user(name).await.unwrap()
    }

    pub async fn start_game(&self) -> GameView {
        self.game_service.create_game(self.user.id).await.unwrap()
    }

    pub async fn balance(&self) -> i64 {
        self.game_service.find_user(self.user.id).await.unwrap().balance
    }

    pub async fn view(&self, game_id: GameId) -> GameView {
        self.game_service.get_game(game_id, self.user.id).await.unwrap()
    }

    /// Answer the current question correctly `count` times.
    pub async fn advance(&self, game_id: GameId, count: u32) -> GameView {
        let mut view = self.view(game_id).await;
        for _ in 0..count {
            let letter = correct_letter(&view);
            view = self
                .game_service
                .submit_answer(game_id, self.user.id, letter)
                .await
                .unwrap()
                .game;
        }
        view
    }
}

pub fn correct_letter(view: &GameView) -> Letter {
    let question = view.current_question.as_ref().unwrap();
    question
        .variants
        .iter()
        .find(|(_, text)| text.starts_with("correct"))
        .map(|(letter, _)| *letter)
        .unwrap()
}

pub fn wrong_letter(view: &GameView) -> Letter {
    let question = view.current_question.as_ref().unwrap();
    question
        .variants
        .iter()
        .find(|(_, text)| text.starts_with("wrong"))
        .map(|(letter, _)| *letter)
        .unwrap()
}
