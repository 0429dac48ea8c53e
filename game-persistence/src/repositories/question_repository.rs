use async_trait::async_trait;
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::entities::{prelude::*, questions};
use crate::storage_error;
use game_core::{GameRng, QuestionBank};
use game_types::{GameError, Question};

pub struct QuestionRepository {
    db: DatabaseConnection,
}

impl QuestionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_question(model: questions::Model) -> Result<Question, GameError> {
        let level = u8::try_from(model.level).map_err(|_| GameError::InvalidGameData {
            message: format!("question {} has level {}", model.id, model.level),
        })?;
        let correct_index = u8::try_from(model.correct_index)
            .ok()
            .filter(|&index| index < 4)
            .ok_or_else(|| GameError::InvalidGameData {
                message: format!(
                    "question {} has correct index {}",
                    model.id, model.correct_index
                ),
            })?;

        Ok(Question {
            id: model.id,
            level,
            text: model.text,
            answers: [model.answer1, model.answer2, model.answer3, model.answer4],
            correct_index,
        })
    }

    pub async fn insert_questions(&self, questions: &[Question]) -> Result<usize, GameError> {
        if questions.is_empty() {
            return Ok(0);
        }

        let models = questions.iter().map(|question| {
            let [answer1, answer2, answer3, answer4] = question.answers.clone();
            questions::ActiveModel {
                id: ActiveValue::Set(question.id),
                level: ActiveValue::Set(i32::from(question.level)),
                text: ActiveValue::Set(question.text.clone()),
                answer1: ActiveValue::Set(answer1),
                answer2: ActiveValue::Set(answer2),
                answer3: ActiveValue::Set(answer3),
                answer4: ActiveValue::Set(answer4),
                correct_index: ActiveValue::Set(i32::from(question.correct_index)),
            }
        });

        Questions::insert_many(models)
            .exec(&self.db)
            .await
            .map_err(storage_error)?;

        tracing::info!("Imported {} questions", questions.len());
        Ok(questions.len())
    }

    pub async fn count(&self) -> Result<u64, GameError> {
        Questions::find().count(&self.db).await.map_err(storage_error)
    }

    /// Load questions by id through the caller's connection.
    pub async fn find_by_ids<C: ConnectionTrait>(
        &self,
        conn: &C,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Question>, GameError> {
        let models = Questions::find()
            .filter(questions::Column::Id.is_in(ids.iter().copied()))
            .all(conn)
            .await
            .map_err(storage_error)?;

        models
            .into_iter()
            .map(|model| Self::model_to_question(model).map(|question| (question.id, question)))
            .collect()
    }
}

#[async_trait]
impl QuestionBank for QuestionRepository {
    async fn questions_for_levels(
        &self,
        levels: &[u8],
        rng: &mut GameRng,
    ) -> Result<Vec<Question>, GameError> {
        let mut chosen = Vec::with_capacity(levels.len());
        for &level in levels {
            let ids: Vec<Uuid> = Questions::find()
                .select_only()
                .column(questions::Column::Id)
                .filter(questions::Column::Level.eq(i32::from(level)))
                .order_by_asc(questions::Column::Id)
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(storage_error)?;

            let id = rng
                .choose(&ids)
                .copied()
                .ok_or(GameError::NoQuestionForLevel { level })?;
            chosen.push(id);
        }

        let mut by_id = self.find_by_ids(&self.db, &chosen).await?;
        chosen
            .iter()
            .zip(levels)
            .map(|(id, &level)| by_id.remove(id).ok_or(GameError::NoQuestionForLevel { level }))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use migration::{Migrator, MigratorTrait};

    async fn setup_test_db() -> QuestionRepository {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        QuestionRepository::new(db)
    }

    fn question(level: u8, n: usize) -> Question {
        Question {
            id: Uuid::new_v4(),
            level,
            text: format!("Question {} at level {}", n, level),
            answers: [
                format!("right {}", n),
                format!("wrong {}a", n),
                format!("wrong {}b", n),
                format!("wrong {}c", n),
            ],
            correct_index: 0,
        }
    }

    #[tokio::test]
    async fn test_insert_and_pick_one_per_level() {
        let repo = setup_test_db().await;
        let questions: Vec<Question> = (0..60).map(|n| question((n % 15) as u8, n)).collect();
        assert_eq!(repo.insert_questions(&questions).await.unwrap(), 60);
        assert_eq!(repo.count().await.unwrap(), 60);

        let levels: Vec<u8> = (0..15).collect();
        let picked = repo
            .questions_for_levels(&levels, &mut GameRng::new(3))
            .await
            .unwrap();

        assert_eq!(picked.len(), 15);
        for (question, level) in picked.iter().zip(&levels) {
            assert_eq!(question.level, *level);
            assert_eq!(question.correct_answer(), question.answers[0]);
        }
    }

    #[tokio::test]
    async fn test_pick_is_deterministic_for_seed() {
        let repo = setup_test_db().await;
        let questions: Vec<Question> = (0..30).map(|n| question((n % 3) as u8, n)).collect();
        repo.insert_questions(&questions).await.unwrap();

        let levels = [0, 1, 2];
        let first = repo.questions_for_levels(&levels, &mut GameRng::new(9)).await.unwrap();
        let second = repo.questions_for_levels(&levels, &mut GameRng::new(9)).await.unwrap();
        let first_ids: Vec<Uuid> = first.iter().map(|q| q.id).collect();
        let second_ids: Vec<Uuid> = second.iter().map(|q| q.id).collect();
        assert_eq!(first_ids, second_ids);
    }

    #[tokio::test]
    async fn test_missing_level() {
        let repo = setup_test_db().await;
        repo.insert_questions(&[question(0, 1)]).await.unwrap();

        let result = repo.questions_for_levels(&[0, 1], &mut GameRng::new(1)).await;
        assert_eq!(result, Err(GameError::NoQuestionForLevel { level: 1 }));
    }
}
