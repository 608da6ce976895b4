//! Create `contact_messages` table for the public contact form.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContactMessages::Table)
                    .if_not_exists()
                    .col(uuid(ContactMessages::Id).primary_key())
                    .col(string_len(ContactMessages::Name, 100).not_null())
                    .col(string_len(ContactMessages::Email, 255).not_null())
                    .col(string_len_null(ContactMessages::Phone, 32))
                    .col(string_len(ContactMessages::Company, 200).not_null())
                    .col(string_len(ContactMessages::Subject, 200).not_null())
                    .col(string_len(ContactMessages::ServiceInterest, 64).not_null())
                    .col(text(ContactMessages::Message).not_null())
                    .col(boolean(ContactMessages::Responded).not_null().default(false))
                    .col(timestamp_with_time_zone(ContactMessages::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(ContactMessages::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ContactMessages::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ContactMessages {
    Table,
    Id,
    Name,
    Email,
    Phone,
    Company,
    Subject,
    ServiceInterest,
    Message,
    Responded,
    CreatedAt,
    UpdatedAt,
}
