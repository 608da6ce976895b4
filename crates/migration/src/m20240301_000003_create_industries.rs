//! Create `industries` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Industries::Table)
                    .if_not_exists()
                    .col(uuid(Industries::Id).primary_key())
                    .col(string_len(Industries::Slug, 100).not_null())
                    .col(string_len(Industries::Name, 100).not_null())
                    .col(text(Industries::Description).not_null())
                    .col(boolean(Industries::IsActive).not_null().default(true))
                    .col(integer(Industries::SortOrder).not_null().default(0))
                    .col(timestamp_with_time_zone(Industries::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Industries::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Industries::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Industries {
    Table,
    Id,
    Slug,
    Name,
    Description,
    IsActive,
    SortOrder,
    CreatedAt,
    UpdatedAt,
}
