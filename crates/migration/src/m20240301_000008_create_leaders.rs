//! Create `leaders` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Leaders::Table)
                    .if_not_exists()
                    .col(uuid(Leaders::Id).primary_key())
                    .col(string_len(Leaders::Name, 100).not_null())
                    .col(string_len(Leaders::Title, 150).not_null())
                    .col(string_len(Leaders::Department, 100).not_null().default(""))
                    .col(text(Leaders::Bio).not_null())
                    .col(string_len(Leaders::Image, 512).not_null().default(""))
                    .col(string_len(Leaders::Location, 100).not_null().default(""))
                    .col(integer(Leaders::Experience).not_null().default(0))
                    .col(integer(Leaders::ProjectsLed).not_null().default(0))
                    .col(string_len_null(Leaders::LinkedinUrl, 512))
                    .col(string_len_null(Leaders::Email, 255))
                    .col(array(Leaders::Credentials, ColumnType::Text).not_null().default(Expr::cust("'{}'")))
                    .col(array(Leaders::Specialties, ColumnType::Text).not_null().default(Expr::cust("'{}'")))
                    .col(integer(Leaders::SortOrder).not_null().default(0))
                    .col(boolean(Leaders::IsActive).not_null().default(true))
                    .col(timestamp_with_time_zone(Leaders::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Leaders::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Leaders::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Leaders {
    Table,
    Id,
    Name,
    Title,
    Department,
    Bio,
    Image,
    Location,
    Experience,
    ProjectsLed,
    LinkedinUrl,
    Email,
    Credentials,
    Specialties,
    SortOrder,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
