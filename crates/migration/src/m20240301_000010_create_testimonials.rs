//! Create `testimonials` table. New rows wait for approval before going public.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Testimonials::Table)
                    .if_not_exists()
                    .col(uuid(Testimonials::Id).primary_key())
                    .col(string_len(Testimonials::LeaderName, 100).not_null())
                    .col(string_len(Testimonials::CompanyName, 200).not_null())
                    .col(string_len(Testimonials::Role, 150).not_null())
                    .col(text(Testimonials::Quote).not_null())
                    .col(string_len(Testimonials::LeaderImage, 512).not_null().default(""))
                    .col(boolean(Testimonials::Approved).not_null().default(false))
                    .col(integer(Testimonials::SortOrder).not_null().default(0))
                    .col(timestamp_with_time_zone(Testimonials::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Testimonials::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Testimonials::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Testimonials {
    Table,
    Id,
    LeaderName,
    CompanyName,
    Role,
    Quote,
    LeaderImage,
    Approved,
    SortOrder,
    CreatedAt,
    UpdatedAt,
}
