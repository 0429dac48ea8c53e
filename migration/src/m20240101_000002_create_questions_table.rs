use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Questions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Questions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Questions::Level).integer().not_null())
                    .col(ColumnDef::new(Questions::Text).text().not_null())
                    .col(ColumnDef::new(Questions::Answer1).string().not_null())
                    .col(ColumnDef::new(Questions::Answer2).string().not_null())
                    .col(ColumnDef::new(Questions::Answer3).string().not_null())
                    .col(ColumnDef::new(Questions::Answer4).string().not_null())
                    .col(
                        ColumnDef::new(Questions::CorrectIndex)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // Question selection filters by level
        manager
            .create_index(
                Index::create()
                    .name("idx_questions_level")
                    .table(Questions::Table)
                    .col(Questions::Level)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Questions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Questions {
    Table,
    Id,
    Level,
    Text,
    Answer1,
    Answer2,
    Answer3,
    Answer4,
    CorrectIndex,
}
