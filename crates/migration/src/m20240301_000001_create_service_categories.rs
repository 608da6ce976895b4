//! Create `service_categories` table.
//! Groups services on the public site; slug uniqueness lives in the index migration.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceCategories::Table)
                    .if_not_exists()
                    .col(uuid(ServiceCategories::Id).primary_key())
                    .col(string_len(ServiceCategories::Slug, 100).not_null())
                    .col(string_len(ServiceCategories::Name, 100).not_null())
                    .col(text_null(ServiceCategories::Description))
                    .col(boolean(ServiceCategories::IsActive).not_null().default(true))
                    .col(integer(ServiceCategories::SortOrder).not_null().default(0))
                    .col(timestamp_with_time_zone(ServiceCategories::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(ServiceCategories::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceCategories::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceCategories {
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
