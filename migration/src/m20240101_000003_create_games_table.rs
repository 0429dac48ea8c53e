use sea_orm_migration::prelude::*;

use crate::m20240101_000001_create_users_table::Users;
use crate::m20240101_000002_create_questions_table::Questions;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Games::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Games::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Games::UserId).uuid().not_null())
                    // Holds the owner only while the game is in progress; the unique index
                    // allows many NULLs but at most one active game per user.
                    .col(ColumnDef::new(Games::ActiveUserId).uuid().null())
                    .col(ColumnDef::new(Games::Status).string().not_null())
                    .col(
                        ColumnDef::new(Games::CurrentLevel)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Games::Prize).big_integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Games::AudienceHelpUsed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Games::FiftyFiftyUsed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Games::FriendCallUsed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Games::Version).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Games::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Games::FinishedAt).timestamp_with_time_zone().null())
                    .col(
                        ColumnDef::new(Games::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_games_user")
                            .from(Games::Table, Games::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_games_active_user")
                    .table(Games::Table)
                    .col(Games::ActiveUserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Timeout sweep scans in-progress games by age
        manager
            .create_index(
                Index::create()
                    .name("idx_games_status_created_at")
                    .table(Games::Table)
                    .col(Games::Status)
                    .col(Games::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GameQuestions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GameQuestions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(GameQuestions::GameId).uuid().not_null())
                    .col(ColumnDef::new(GameQuestions::QuestionId).uuid().not_null())
                    .col(ColumnDef::new(GameQuestions::Position).integer().not_null())
                    .col(ColumnDef::new(GameQuestions::OptionMapping).string().not_null())
                    .col(
                        ColumnDef::new(GameQuestions::HelpHash)
                            .text()
                            .not_null()
                            .default("{}"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_questions_game")
                            .from(GameQuestions::Table, GameQuestions::GameId)
                            .to(Games::Table, Games::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_questions_question")
                            .from(GameQuestions::Table, GameQuestions::QuestionId)
                            .to(Questions::Table, Questions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_game_questions_game_position")
                    .table(GameQuestions::Table)
                    .col(GameQuestions::GameId)
                    .col(GameQuestions::Position)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GameQuestions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Games::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Games {
    Table,
    Id,
    UserId,
    ActiveUserId,
    Status,
    CurrentLevel,
    Prize,
    AudienceHelpUsed,
    FiftyFiftyUsed,
    FriendCallUsed,
    Version,
    CreatedAt,
    FinishedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GameQuestions {
    Table,
    Id,
    GameId,
    QuestionId,
    Position,
    OptionMapping,
    HelpHash,
}
