use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "games")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    /// Equal to `user_id` while in progress, NULL once finished.
    pub active_user_id: Option<Uuid>,
    pub status: String,
    pub current_level: i32,
    pub prize: i64,
    pub audience_help_used: bool,
    pub fifty_fifty_used: bool,
    pub friend_call_used: bool,
    pub version: i32,
    pub created_at: DateTimeWithTimeZone,
    pub finished_at: Option<DateTimeWithTimeZone>,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::game_questions::Entity")]
    GameQuestions,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::game_questions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GameQuestions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
