//! Create `partners` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Partners::Table)
                    .if_not_exists()
                    .col(uuid(Partners::Id).primary_key())
                    .col(string_len(Partners::Name, 100).not_null())
                    .col(string_len(Partners::Image, 512).not_null())
                    .col(integer(Partners::SortOrder).not_null().default(0))
                    .col(boolean(Partners::IsActive).not_null().default(true))
                    .col(timestamp_with_time_zone(Partners::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Partners::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Partners::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Partners { Table, Id, Name, Image, SortOrder, IsActive, CreatedAt, UpdatedAt }
