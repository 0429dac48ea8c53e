#![allow(dead_code)]

use async_trait::async_trait;
use game_core::{Game, GameRng, GameRules, QuestionBank};
use game_types::{GameError, Letter, Question};
use uuid::Uuid;

/// Question bank backed by a fixed list, picking randomly among questions of each level.
pub struct FixtureQuestionBank {
    pub questions: Vec<Question>,
}

#[async_trait]
impl QuestionBank for FixtureQuestionBank {
    async fn questions_for_levels(
        &self,
        levels: &[u8],
        rng: &mut GameRng,
    ) -> Result<Vec<Question>, GameError> {
        levels
            .iter()
            .map(|&level| {
                let candidates: Vec<&Question> =
                    self.questions.iter().filter(|q| q.level == level).collect();
                rng.choose(&candidates)
                    .map(|q| (*q).clone())
                    .ok_or(GameError::NoQuestionForLevel { level })
            })
            .collect()
    }
}

/// `count` questions spread round-robin over 15 levels; the first answer is always right.
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

pub fn create_test_bank() -> FixtureQuestionBank {
    FixtureQuestionBank {
        questions: generate_questions(60),
    }
}

pub async fn create_test_game(seed: u64) -> (Game, GameRules, GameRng) {
    let rules = GameRules::default();
    let mut rng = GameRng::new(seed);
    let game = Game::create(
        Uuid::new_v4(),
        Uuid::new_v4(),
        &create_test_bank(),
        &rules,
        &mut rng,
    )
    .await
    .unwrap();
    (game, rules, rng)
}

pub fn correct_letter(game: &Game) -> Letter {
    game.current_question().unwrap().correct_answer_key()
}

pub fn wrong_letter(game: &Game) -> Letter {
    let correct = correct_letter(game);
    Letter::ALL.into_iter().find(|&l| l != correct).unwrap()
}

pub fn advance(game: &mut Game, rules: &GameRules, answers: u32) {
    for _ in 0..answers {
        let letter = correct_letter(game);
        game.answer(letter, rules).unwrap();
    }
}
