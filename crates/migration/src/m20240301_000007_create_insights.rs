//! Create `insights` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Insights::Table)
                    .if_not_exists()
                    .col(uuid(Insights::Id).primary_key())
                    .col(string_len(Insights::Title, 200).not_null())
                    .col(text(Insights::Content).not_null())
                    .col(string_len(Insights::Image, 512).not_null().default(""))
                    .col(integer(Insights::ViewCount).not_null().default(0))
                    .col(integer(Insights::DisplayOrder).not_null().default(0))
                    .col(boolean(Insights::IsActive).not_null().default(true))
                    .col(uuid_null(Insights::IndustryId))
                    .col(timestamp_with_time_zone(Insights::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Insights::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_insights_industry")
                            .from(Insights::Table, Insights::IndustryId)
                            .to(Industries::Table, Industries::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Insights::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Insights {
    Table,
    Id,
    Title,
    Content,
    Image,
    ViewCount,
    DisplayOrder,
    IsActive,
    IndustryId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Industries { Table, Id }
