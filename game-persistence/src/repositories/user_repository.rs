use sea_orm::sea_query::Expr;
use sea_orm::{ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entities::{prelude::*, users};
use crate::storage_error;
use game_types::{GameError, User, UserId};

/// Users and their balances. Crediting takes the caller's connection so prize payouts
/// commit together with the game transition that earned them.
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_user(model: users::Model) -> User {
        User {
            id: model.id,
            name: model.name,
            balance: model.balance,
            created_at: model.created_at.to_rfc3339(),
        }
    }

    pub async fn find_by_id(&self, id: UserId) -> Result<Option<User>, GameError> {
        let user_model = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(storage_error)?;
        Ok(user_model.map(Self::model_to_user))
    }

    pub async fn create_user(&self, name: &str) -> Result<User, GameError> {
        let now = chrono::Utc::now().into();
        let user_model = users::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            name: ActiveValue::Set(name.to_string()),
            balance: ActiveValue::Set(0),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        let saved_model = Users::insert(user_model)
            .exec(&self.db)
            .await
            .map_err(storage_error)?;

        // Fetch the created user
        self.find_by_id(saved_model.last_insert_id)
            .await?
            .ok_or(GameError::UserNotFound {
                user_id: saved_model.last_insert_id,
            })
    }

    /// Add `amount` to the user's balance in a single UPDATE.
    pub async fn credit_balance<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: UserId,
        amount: u32,
    ) -> Result<(), GameError> {
        let result = Users::update_many()
            .col_expr(
                users::Column::Balance,
                Expr::col(users::Column::Balance).add(i64::from(amount)),
            )
            .col_expr(
                users::Column::UpdatedAt,
                Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(chrono::Utc::now())),
            )
            .filter(users::Column::Id.eq(user_id))
            .exec(conn)
            .await
            .map_err(storage_error)?;

        if result.rows_affected == 0 {
            return Err(GameError::UserNotFound { user_id });
        }

        tracing::info!("Credited {} to user {}", amount, user_id);
        Ok(())
    }
}
