use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr,
};
use uuid::Uuid;

use crate::entities::{game_questions, games, prelude::*};
use crate::repositories::QuestionRepository;
use crate::storage_error;
use game_core::{Game, GameQuestion};
use game_types::{GameError, GameId, GameStatus, GameSummary, HelpHash, HelpUsage, UserId};

/// A game as loaded from storage, with the row version it was read at.
#[derive(Debug, Clone)]
pub struct StoredGame {
    pub game: Game,
    pub version: i32,
}

/// Games and their questions. Every method takes the connection to run on so callers can
/// group reads and writes into one transaction.
pub struct GameRepository {
    questions: QuestionRepository,
}

fn to_db_time(at: DateTime<Utc>) -> DateTime<FixedOffset> {
    at.into()
}

fn encode_mapping(mapping: [u8; 4]) -> String {
    mapping.iter().map(|index| char::from(b'0' + index)).collect()
}

fn decode_mapping(encoded: &str) -> Result<[u8; 4], GameError> {
    let digits: Vec<u8> = encoded
        .chars()
        .map(|c| c.to_digit(10).map(|d| d as u8))
        .collect::<Option<_>>()
        .unwrap_or_default();
    digits.try_into().map_err(|_| GameError::InvalidGameData {
        message: format!("bad option mapping {:?}", encoded),
    })
}

fn encode_help(help: &HelpHash) -> Result<String, GameError> {
    serde_json::to_string(help).map_err(|e| GameError::InvalidGameData {
        message: format!("cannot encode help hash: {}", e),
    })
}

impl GameRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            questions: QuestionRepository::new(db),
        }
    }

    /// Id of the user's in-progress game, if any.
    pub async fn find_active_for_user<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: UserId,
    ) -> Result<Option<GameId>, GameError> {
        Games::find()
            .select_only()
            .column(games::Column::Id)
            .filter(games::Column::ActiveUserId.eq(user_id))
            .into_tuple()
            .one(conn)
            .await
            .map_err(storage_error)
    }

    /// Insert a fresh game with its questions. A second active game for the same user
    /// trips the unique index and comes back as a conflict.
    pub async fn insert<C: ConnectionTrait>(&self, conn: &C, game: &Game) -> Result<(), GameError> {
        let now = to_db_time(Utc::now());
        let game_model = games::ActiveModel {
            id: ActiveValue::Set(game.id),
            user_id: ActiveValue::Set(game.user_id),
            active_user_id: ActiveValue::Set((!game.is_finished()).then_some(game.user_id)),
            status: ActiveValue::Set(game.status.as_str().to_string()),
            current_level: ActiveValue::Set(game.current_level as i32),
            prize: ActiveValue::Set(i64::from(game.prize)),
            audience_help_used: ActiveValue::Set(game.help_usage.audience_help_used),
            fifty_fifty_used: ActiveValue::Set(game.help_usage.fifty_fifty_used),
            friend_call_used: ActiveValue::Set(game.help_usage.friend_call_used),
            version: ActiveValue::Set(0),
            created_at: ActiveValue::Set(to_db_time(game.created_at)),
            finished_at: ActiveValue::Set(game.finished_at.map(to_db_time)),
            updated_at: ActiveValue::Set(now),
        };

        if let Err(err) = Games::insert(game_model).exec(conn).await {
            if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
                return Err(GameError::ActiveGameExists {
                    user_id: game.user_id,
                    game_id: None,
                });
            }
            return Err(storage_error(err));
        }

        let question_models = game
            .questions
            .iter()
            .enumerate()
            .map(|(position, question)| {
                Ok(game_questions::ActiveModel {
                    id: ActiveValue::Set(Uuid::new_v4()),
                    game_id: ActiveValue::Set(game.id),
                    question_id: ActiveValue::Set(question.question().id),
                    position: ActiveValue::Set(position as i32),
                    option_mapping: ActiveValue::Set(encode_mapping(question.option_mapping())),
                    help_hash: ActiveValue::Set(encode_help(&question.help_hash)?),
                })
            })
            .collect::<Result<Vec<_>, GameError>>()?;

        GameQuestions::insert_many(question_models)
            .exec(conn)
            .await
            .map_err(storage_error)?;

        Ok(())
    }

    pub async fn load<C: ConnectionTrait>(
        &self,
        conn: &C,
        game_id: GameId,
    ) -> Result<Option<StoredGame>, GameError> {
        let Some(model) = Games::find_by_id(game_id)
            .one(conn)
            .await
            .map_err(storage_error)?
        else {
            return Ok(None);
        };

        let rows = GameQuestions::find()
            .filter(game_questions::Column::GameId.eq(game_id))
            .order_by_asc(game_questions::Column::Position)
            .all(conn)
            .await
            .map_err(storage_error)?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.question_id).collect();
        let contents = self.questions.find_by_ids(conn, &ids).await?;

        let questions = rows
            .into_iter()
            .map(|row| {
                let question =
                    contents
                        .get(&row.question_id)
                        .cloned()
                        .ok_or_else(|| GameError::InvalidGameData {
                            message: format!("question {} is missing", row.question_id),
                        })?;
                let help_hash: HelpHash =
                    serde_json::from_str(&row.help_hash).map_err(|e| GameError::InvalidGameData {
                        message: format!("bad help hash on {}: {}", row.id, e),
                    })?;
                GameQuestion::from_parts(question, decode_mapping(&row.option_mapping)?, help_hash)
            })
            .collect::<Result<Vec<_>, GameError>>()?;

        let status = GameStatus::parse(&model.status).ok_or_else(|| GameError::InvalidGameData {
            message: format!("unknown status {:?}", model.status),
        })?;

        let game = Game {
            id: model.id,
            user_id: model.user_id,
            current_level: u32::try_from(model.current_level).unwrap_or(0),
            prize: u32::try_from(model.prize).unwrap_or(0),
            status,
            help_usage: HelpUsage {
                audience_help_used: model.audience_help_used,
                fifty_fifty_used: model.fifty_fifty_used,
                friend_call_used: model.friend_call_used,
            },
            questions,
            created_at: model.created_at.with_timezone(&Utc),
            finished_at: model.finished_at.map(|at| at.with_timezone(&Utc)),
        };

        Ok(Some(StoredGame {
            game,
            version: model.version,
        }))
    }

    /// Write the game row back if nobody changed it since `version` was read.
    /// Returns the new version.
    pub async fn update<C: ConnectionTrait>(
        &self,
        conn: &C,
        game: &Game,
        version: i32,
    ) -> Result<i32, GameError> {
        let active_user_id: Option<Uuid> = (!game.is_finished()).then_some(game.user_id);
        let result = Games::update_many()
            .col_expr(games::Column::Status, Expr::value(game.status.as_str()))
            .col_expr(games::Column::ActiveUserId, Expr::value(active_user_id))
            .col_expr(
                games::Column::CurrentLevel,
                Expr::value(game.current_level as i32),
            )
            .col_expr(games::Column::Prize, Expr::value(i64::from(game.prize)))
            .col_expr(
                games::Column::AudienceHelpUsed,
                Expr::value(game.help_usage.audience_help_used),
            )
            .col_expr(
                games::Column::FiftyFiftyUsed,
                Expr::value(game.help_usage.fifty_fifty_used),
            )
            .col_expr(
                games::Column::FriendCallUsed,
                Expr::value(game.help_usage.friend_call_used),
            )
            .col_expr(
                games::Column::FinishedAt,
                Expr::value(game.finished_at.map(to_db_time)),
            )
            .col_expr(games::Column::UpdatedAt, Expr::value(to_db_time(Utc::now())))
            .col_expr(games::Column::Version, Expr::value(version + 1))
            .filter(games::Column::Id.eq(game.id))
            .filter(games::Column::Version.eq(version))
            .exec(conn)
            .await
            .map_err(storage_error)?;

        if result.rows_affected == 0 {
            return Err(GameError::StaleGame);
        }
        Ok(version + 1)
    }

    pub async fn save_help_hash<C: ConnectionTrait>(
        &self,
        conn: &C,
        game_id: GameId,
        position: u32,
        help: &HelpHash,
    ) -> Result<(), GameError> {
        GameQuestions::update_many()
            .col_expr(game_questions::Column::HelpHash, Expr::value(encode_help(help)?))
            .filter(game_questions::Column::GameId.eq(game_id))
            .filter(game_questions::Column::Position.eq(position as i32))
            .exec(conn)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    /// In-progress games created before `cutoff`.
    pub async fn find_overdue<C: ConnectionTrait>(
        &self,
        conn: &C,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<GameId>, GameError> {
        Games::find()
            .select_only()
            .column(games::Column::Id)
            .filter(games::Column::Status.eq(GameStatus::InProgress.as_str()))
            .filter(games::Column::CreatedAt.lt(to_db_time(cutoff)))
            .order_by_asc(games::Column::CreatedAt)
            .into_tuple()
            .all(conn)
            .await
            .map_err(storage_error)
    }

    /// The user's games, newest first.
    pub async fn list_for_user<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: UserId,
    ) -> Result<Vec<GameSummary>, GameError> {
        Games::find()
            .filter(games::Column::UserId.eq(user_id))
            .order_by_desc(games::Column::CreatedAt)
            .all(conn)
            .await
            .map_err(storage_error)?
            .into_iter()
            .map(|model| {
                let status =
                    GameStatus::parse(&model.status).ok_or_else(|| GameError::InvalidGameData {
                        message: format!("unknown status {:?}", model.status),
                    })?;
                Ok(GameSummary {
                    id: model.id,
                    status,
                    current_level: u32::try_from(model.current_level).unwrap_or(0),
                    prize: u32::try_from(model.prize).unwrap_or(0),
                    created_at: model.created_at.with_timezone(&Utc).to_rfc3339(),
                    finished_at: model
                        .finished_at
                        .map(|at| at.with_timezone(&Utc).to_rfc3339()),
                })
            })
            .collect()
    }
}
