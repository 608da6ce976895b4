//! Create the `service_experts` and `industry_experts` join tables.
//! Composite primary keys make attach idempotent at the storage level; both
//! sides cascade so deleting either end removes the link.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceExperts::Table)
                    .if_not_exists()
                    .col(uuid(ServiceExperts::ServiceId).not_null())
                    .col(uuid(ServiceExperts::ExpertId).not_null())
                    .col(timestamp_with_time_zone(ServiceExperts::CreatedAt).not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_service_experts")
                            .col(ServiceExperts::ServiceId)
                            .col(ServiceExperts::ExpertId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_experts_service")
                            .from(ServiceExperts::Table, ServiceExperts::ServiceId)
                            .to(Services::Table, Services::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_experts_expert")
                            .from(ServiceExperts::Table, ServiceExperts::ExpertId)
                            .to(Experts::Table, Experts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IndustryExperts::Table)
                    .if_not_exists()
                    .col(uuid(IndustryExperts::IndustryId).not_null())
                    .col(uuid(IndustryExperts::ExpertId).not_null())
                    .col(timestamp_with_time_zone(IndustryExperts::CreatedAt).not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_industry_experts")
                            .col(IndustryExperts::IndustryId)
                            .col(IndustryExperts::ExpertId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_industry_experts_industry")
                            .from(IndustryExperts::Table, IndustryExperts::IndustryId)
                            .to(Industries::Table, Industries::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_industry_experts_expert")
                            .from(IndustryExperts::Table, IndustryExperts::ExpertId)
                            .to(Experts::Table, Experts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(IndustryExperts::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(ServiceExperts::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceExperts { Table, ServiceId, ExpertId, CreatedAt }

#[derive(DeriveIden)]
enum IndustryExperts { Table, IndustryId, ExpertId, CreatedAt }

#[derive(DeriveIden)]
enum Services { Table, Id }

#[derive(DeriveIden)]
enum Industries { Table, Id }

#[derive(DeriveIden)]
enum Experts { Table, Id }
