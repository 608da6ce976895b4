//! Create `affiliations` table (professional bodies the firm belongs to).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Affiliations::Table)
                    .if_not_exists()
                    .col(uuid(Affiliations::Id).primary_key())
                    .col(string_len(Affiliations::Name, 150).not_null())
                    .col(string_len_null(Affiliations::Acronym, 50))
                    .col(text_null(Affiliations::Description))
                    .col(integer(Affiliations::SortOrder).not_null().default(0))
                    .col(boolean(Affiliations::IsActive).not_null().default(true))
                    .col(timestamp_with_time_zone(Affiliations::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Affiliations::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Affiliations::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Affiliations { Table, Id, Name, Acronym, Description, SortOrder, IsActive, CreatedAt, UpdatedAt }
