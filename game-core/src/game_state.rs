use chrono::{DateTime, Utc};
use game_types::{
    GameError, GameId, GameStatus, GameView, HelpType, HelpUsage, Letter, Question, QuestionView,
    UserId,
};
use tracing::info;

use crate::{GameQuestion, GameRng, PrizeTable, QuestionBank, apply_help};

/// Tunables applied to every game.
#[derive(Debug, Clone, Default)]
pub struct GameRules {
    pub prize_table: PrizeTable,
    /// Whether a player may cash out before answering anything (and walk away with 0).
    pub allow_take_money_at_start: bool,
}

/// What happened after an answer was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct { current_level: u32 },
    Won { prize: u32 },
    Wrong { correct: Letter, prize: u32 },
}

impl AnswerOutcome {
    pub fn is_correct(&self) -> bool {
        !matches!(self, AnswerOutcome::Wrong { .. })
    }
}

/// One play-through. Mutated only through `answer`, `use_help`, `take_money` and `time_out`;
/// once `status` is terminal every mutator refuses.
#[derive(Debug, Clone)]
pub struct Game {
    pub id: GameId,
    pub user_id: UserId,
    pub current_level: u32,
    pub prize: u32,
    pub status: GameStatus,
    pub help_usage: HelpUsage,
    pub questions: Vec<GameQuestion>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Game {
    /// Start a game from one question per level, shuffling each question's options.
    pub fn new(
        id: GameId,
        user_id: UserId,
        questions: Vec<Question>,
        rules: &GameRules,
        rng: &mut GameRng,
    ) -> Result<Self, GameError> {
        let expected = rules.prize_table.levels() as usize;
        if questions.len() != expected {
            return Err(GameError::InvalidGameData {
                message: format!("expected {} questions, got {}", expected, questions.len()),
            });
        }

        let questions = questions
            .into_iter()
            .map(|question| GameQuestion::new(question, rng))
            .collect();

        Ok(Self {
            id,
            user_id,
            current_level: 0,
            prize: 0,
            status: GameStatus::InProgress,
            help_usage: HelpUsage::default(),
            questions,
            created_at: Utc::now(),
            finished_at: None,
        })
    }

    /// Fetch the ladder's questions from `bank` and start a game.
    pub async fn create(
        id: GameId,
        user_id: UserId,
        bank: &dyn QuestionBank,
        rules: &GameRules,
        rng: &mut GameRng,
    ) -> Result<Self, GameError> {
        let levels = rules.prize_table.level_indices();
        let questions = bank.questions_for_levels(&levels, rng).await?;
        Self::new(id, user_id, questions, rules, rng)
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn current_question(&self) -> Option<&GameQuestion> {
        if self.is_finished() {
            return None;
        }
        self.questions.get(self.current_level as usize)
    }

    pub fn answer(
        &mut self,
        letter: Letter,
        rules: &GameRules,
    ) -> Result<AnswerOutcome, GameError> {
        self.ensure_in_progress()?;
        let question = self.current_question_or_err()?;
        let correct = question.correct_answer_key();

        if letter != correct {
            let prize = rules.prize_table.checkpoint_prize(self.current_level);
            self.finish(GameStatus::Fail, prize);
            return Ok(AnswerOutcome::Wrong { correct, prize });
        }

        self.current_level += 1;
        if self.current_level >= rules.prize_table.levels() {
            let prize = rules.prize_table.top_prize();
            self.finish(GameStatus::Won, prize);
            return Ok(AnswerOutcome::Won { prize });
        }

        if rules.prize_table.is_checkpoint(self.current_level) {
            info!(
                "Game {} passed checkpoint {}, {} is now safe",
                self.id,
                self.current_level,
                rules.prize_table.checkpoint_prize(self.current_level)
            );
        }

        Ok(AnswerOutcome::Correct {
            current_level: self.current_level,
        })
    }

    pub fn use_help(&mut self, help: HelpType, rng: &mut GameRng) -> Result<(), GameError> {
        self.ensure_in_progress()?;
        if self.help_usage.is_used(help) {
            return Err(GameError::HelpAlreadyUsed { help });
        }

        let index = self.current_level as usize;
        let question = self
            .questions
            .get_mut(index)
            .ok_or_else(|| GameError::InvalidGameData {
                message: format!("no question at level {}", index),
            })?;
        apply_help(question, help, rng);
        self.help_usage.mark_used(help);
        Ok(())
    }

    /// Cash out with the prize of the last fully answered question.
    pub fn take_money(&mut self, rules: &GameRules) -> Result<u32, GameError> {
        self.ensure_in_progress()?;
        if self.current_level == 0 && !rules.allow_take_money_at_start {
            return Err(GameError::NothingToTake);
        }

        let prize = rules.prize_table.prize_for(self.current_level);
        self.finish(GameStatus::Money, prize);
        Ok(prize)
    }

    /// Time ran out: same fireproof floor as a wrong answer.
    pub fn time_out(&mut self, rules: &GameRules) -> Result<u32, GameError> {
        self.ensure_in_progress()?;
        let prize = rules.prize_table.checkpoint_prize(self.current_level);
        self.finish(GameStatus::Timeout, prize);
        Ok(prize)
    }

    pub fn view(&self) -> GameView {
        GameView {
            id: self.id,
            user_id: self.user_id,
            status: self.status,
            current_level: self.current_level,
            prize: self.prize,
            help_usage: self.help_usage,
            current_question: self.current_question().map(|question| QuestionView {
                level: question.level(),
                text: question.text().to_string(),
                variants: question.presented_variants(),
                help: question.help_hash.clone(),
            }),
            created_at: self.created_at.to_rfc3339(),
            finished_at: self.finished_at.map(|at| at.to_rfc3339()),
        }
    }

    fn ensure_in_progress(&self) -> Result<(), GameError> {
        if self.is_finished() {
            return Err(GameError::GameAlreadyFinished {
                status: self.status,
            });
        }
        Ok(())
    }

    fn current_question_or_err(&self) -> Result<&GameQuestion, GameError> {
        self.current_question()
            .ok_or_else(|| GameError::InvalidGameData {
                message: format!("no question at level {}", self.current_level),
            })
    }

    fn finish(&mut self, status: GameStatus, prize: u32) {
        self.status = status;
        self.prize = prize;
        self.finished_at = Some(Utc::now());
        info!(
            "Game {} finished: {} at level {} with prize {}",
            self.id, status, self.current_level, prize
        );
    }
}
