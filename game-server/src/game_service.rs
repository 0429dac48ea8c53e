use chrono::Utc;
use dashmap::DashMap;
use sea_orm::{DatabaseConnection, TransactionTrait};
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};
use uuid::Uuid;

use game_core::{AnswerOutcome, Game, GameRng, GameRules, TimeoutPolicy};
use game_persistence::repositories::{GameRepository, QuestionRepository, UserRepository};
use game_persistence::storage_error;
use game_types::{
    AnswerResult, GameError, GameId, GameSummary, GameView, HelpType, Letter, User, UserId,
};

/// Operation surface of the game engine backed by the database.
///
/// Each mutating call loads the game, applies one transition, writes it back with an
/// optimistic version check and credits the prize, all inside one transaction. Calls on
/// the same game are additionally serialised in-process.
pub struct GameService {
    db: DatabaseConnection,
    users: UserRepository,
    questions: QuestionRepository,
    games: GameRepository,
    rules: GameRules,
    timeout_policy: TimeoutPolicy,
    rng: Mutex<GameRng>,
    game_locks: DashMap<GameId, Arc<AsyncMutex<()>>>,
}

impl GameService {
    pub fn new(
        db: DatabaseConnection,
        rules: GameRules,
        timeout_policy: TimeoutPolicy,
        rng: GameRng,
    ) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            questions: QuestionRepository::new(db.clone()),
            games: GameRepository::new(db.clone()),
            db,
            rules,
            timeout_policy,
            rng: Mutex::new(rng),
            game_locks: DashMap::new(),
        }
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn users(&self) -> &UserRepository {
        &self.users
    }

    pub fn questions(&self) -> &QuestionRepository {
        &self.questions
    }

    /// Private random stream for one operation, so no lock is held across awaits.
    fn fork_rng(&self) -> GameRng {
        match self.rng.lock() {
            Ok(mut rng) => rng.fork(),
            Err(poisoned) => poisoned.into_inner().fork(),
        }
    }

    fn game_lock(&self, game_id: GameId) -> Arc<AsyncMutex<()>> {
        self.game_locks.entry(game_id).or_default().clone()
    }

    pub async fn find_user(&self, user_id: UserId) -> Result<User, GameError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(GameError::UserNotFound { user_id })
    }

    pub async fn create_game(&self, user_id: UserId) -> Result<GameView, GameError> {
        self.find_user(user_id).await?;

        if let Some(game_id) = self.games.find_active_for_user(&self.db, user_id).await? {
            warn!("User {} tried to start a second game while {} is active", user_id, game_id);
            return Err(GameError::ActiveGameExists {
                user_id,
                game_id: Some(game_id),
            });
        }

        // Question picking happens before the transaction claims the connection.
        let mut rng = self.fork_rng();
        let game = Game::create(Uuid::new_v4(), user_id, &self.questions, &self.rules, &mut rng)
            .await?;

        let txn = self.db.begin().await.map_err(storage_error)?;
        if let Some(game_id) = self.games.find_active_for_user(&txn, user_id).await? {
            return Err(GameError::ActiveGameExists {
                user_id,
                game_id: Some(game_id),
            });
        }
        self.games.insert(&txn, &game).await?;
        txn.commit().await.map_err(storage_error)?;

        info!("Created game {} for user {}", game.id, user_id);
        Ok(game.view())
    }

    pub async fn get_game(&self, game_id: GameId, user_id: UserId) -> Result<GameView, GameError> {
        let stored = self
            .games
            .load(&self.db, game_id)
            .await?
            .ok_or(GameError::GameNotFound { game_id })?;
        if stored.game.user_id != user_id {
            return Err(GameError::NotGameOwner { game_id });
        }
        Ok(stored.game.view())
    }

    pub async fn submit_answer(
        &self,
        game_id: GameId,
        user_id: UserId,
        letter: Letter,
    ) -> Result<AnswerResult, GameError> {
        let rules = &self.rules;
        let (outcome, game) = self
            .transition(game_id, Some(user_id), move |game, _| game.answer(letter, rules))
            .await?;

        let correct_answer = match outcome {
            AnswerOutcome::Wrong { correct, .. } => Some(correct),
            _ => None,
        };
        Ok(AnswerResult {
            answer_correct: outcome.is_correct(),
            correct_answer,
            game,
        })
    }

    pub async fn use_help(
        &self,
        game_id: GameId,
        user_id: UserId,
        help: HelpType,
    ) -> Result<GameView, GameError> {
        let (_, game) = self
            .transition(game_id, Some(user_id), move |game, rng| game.use_help(help, rng))
            .await?;
        Ok(game)
    }

    pub async fn take_money(&self, game_id: GameId, user_id: UserId) -> Result<GameView, GameError> {
        let rules = &self.rules;
        let (_, game) = self
            .transition(game_id, Some(user_id), move |game, _| game.take_money(rules))
            .await?;
        Ok(game)
    }

    /// The owner reports that the game's time ran out.
    pub async fn notify_timeout(
        &self,
        game_id: GameId,
        user_id: UserId,
    ) -> Result<GameView, GameError> {
        self.time_out(game_id, Some(user_id)).await
    }

    async fn time_out(
        &self,
        game_id: GameId,
        user_id: Option<UserId>,
    ) -> Result<GameView, GameError> {
        let rules = &self.rules;
        let (_, game) = self
            .transition(game_id, user_id, move |game, _| game.time_out(rules))
            .await?;
        Ok(game)
    }

    /// Game history for the user's page.
    pub async fn list_games(&self, user_id: UserId) -> Result<Vec<GameSummary>, GameError> {
        self.find_user(user_id).await?;
        self.games.list_for_user(&self.db, user_id).await
    }

    /// Time out every in-progress game past the limit. Returns how many were closed.
    pub async fn expire_overdue_games(&self) -> Result<usize, GameError> {
        let cutoff = self.timeout_policy.cutoff(Utc::now());
        let overdue = self.games.find_overdue(&self.db, cutoff).await?;

        let mut expired = 0;
        for game_id in overdue {
            match self.time_out(game_id, None).await {
                Ok(_) => expired += 1,
                // Finished or touched by a player in the meantime
                Err(GameError::GameAlreadyFinished { .. } | GameError::StaleGame) => {}
                Err(err) => warn!("Failed to time out game {}: {}", game_id, err),
            }
        }

        if expired > 0 {
            info!("Timed out {} overdue games", expired);
        }
        Ok(expired)
    }

    async fn transition<T, F>(
        &self,
        game_id: GameId,
        user_id: Option<UserId>,
        op: F,
    ) -> Result<(T, GameView), GameError>
    where
        F: FnOnce(&mut Game, &mut GameRng) -> Result<T, GameError> + Send,
        T: Send,
    {
        let lock = self.game_lock(game_id);
        let result = {
            let _guard = lock.lock().await;
            self.apply(game_id, user_id, op).await
        };
        self.release_game_lock(game_id, &lock);
        result
    }

    /// Drop the map entry once no other call is holding or waiting on it.
    fn release_game_lock(&self, game_id: GameId, lock: &Arc<AsyncMutex<()>>) {
        // One reference in the map, one held by the caller.
        self.game_locks.remove_if(&game_id, |_, entry| {
            Arc::ptr_eq(entry, lock) && Arc::strong_count(entry) == 2
        });
    }

    async fn apply<T, F>(
        &self,
        game_id: GameId,
        user_id: Option<UserId>,
        op: F,
    ) -> Result<(T, GameView), GameError>
    where
        F: FnOnce(&mut Game, &mut GameRng) -> Result<T, GameError> + Send,
        T: Send,
    {
        let mut rng = self.fork_rng();

        let txn = self.db.begin().await.map_err(storage_error)?;
        let stored = self
            .games
            .load(&txn, game_id)
            .await?
            .ok_or(GameError::GameNotFound { game_id })?;
        if let Some(user_id) = user_id {
            if stored.game.user_id != user_id {
                return Err(GameError::NotGameOwner { game_id });
            }
        }

        let mut game = stored.game;
        let position = game.current_level;
        let help_before = game.current_question().map(|q| q.help_hash.clone());

        let result = match op(&mut game, &mut rng) {
            Ok(result) => result,
            Err(err) => {
                warn!("Rejected operation on game {}: {}", game_id, err);
                return Err(err);
            }
        };

        self.games.update(&txn, &game, stored.version).await?;

        let help_after = game.questions.get(position as usize).map(|q| &q.help_hash);
        if let (Some(before), Some(after)) = (help_before.as_ref(), help_after) {
            if before != after {
                self.games
                    .save_help_hash(&txn, game_id, position, after)
                    .await?;
            }
        }

        if game.is_finished() {
            self.users
                .credit_balance(&txn, game.user_id, game.prize)
                .await?;
        }

        txn.commit().await.map_err(storage_error)?;
        Ok((result, game.view()))
    }
}
