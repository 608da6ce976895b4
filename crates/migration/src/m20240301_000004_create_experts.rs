//! Create `experts` table.
//! Tag lists (education, specialties, memberships) are Postgres text arrays.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Experts::Table)
                    .if_not_exists()
                    .col(uuid(Experts::Id).primary_key())
                    .col(string_len(Experts::Name, 100).not_null())
                    .col(string_len(Experts::Title, 150).not_null())
                    .col(text(Experts::Bio).not_null().default(""))
                    .col(string_len(Experts::Image, 512).not_null().default(""))
                    .col(string_len(Experts::Location, 100).not_null().default(""))
                    .col(integer(Experts::Experience).not_null().default(0))
                    .col(integer(Experts::ProjectsLed).not_null().default(0))
                    .col(string_len_null(Experts::LinkedinUrl, 512))
                    .col(string_len_null(Experts::Email, 255))
                    .col(string_len_null(Experts::Phone, 32))
                    .col(array(Experts::Education, ColumnType::Text).not_null().default(Expr::cust("'{}'")))
                    .col(array(Experts::Specialties, ColumnType::Text).not_null().default(Expr::cust("'{}'")))
                    .col(array(Experts::ProfessionalMembership, ColumnType::Text).not_null().default(Expr::cust("'{}'")))
                    .col(integer(Experts::SortOrder).not_null().default(0))
                    .col(boolean(Experts::IsActive).not_null().default(true))
                    .col(timestamp_with_time_zone(Experts::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Experts::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Experts::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Experts {
    Table,
    Id,
    Name,
    Title,
    Bio,
    Image,
    Location,
    Experience,
    ProjectsLed,
    LinkedinUrl,
    Email,
    Phone,
    Education,
    Specialties,
    ProfessionalMembership,
    SortOrder,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
