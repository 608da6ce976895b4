//! Create `case_studies` table.
//! Owned by an industry and/or a service; removing the owner removes the case study.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CaseStudies::Table)
                    .if_not_exists()
                    .col(uuid(CaseStudies::Id).primary_key())
                    .col(string_len(CaseStudies::Title, 200).not_null())
                    .col(text(CaseStudies::Description).not_null())
                    .col(text(CaseStudies::Impact).not_null().default(""))
                    .col(string_len(CaseStudies::ImpactLevel, 32).not_null().default("Medium"))
                    .col(integer(CaseStudies::DisplayOrder).not_null().default(0))
                    .col(boolean(CaseStudies::IsActive).not_null().default(true))
                    .col(uuid_null(CaseStudies::IndustryId))
                    .col(uuid_null(CaseStudies::ServiceId))
                    .col(timestamp_with_time_zone(CaseStudies::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(CaseStudies::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_case_studies_industry")
                            .from(CaseStudies::Table, CaseStudies::IndustryId)
                            .to(Industries::Table, Industries::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_case_studies_service")
                            .from(CaseStudies::Table, CaseStudies::ServiceId)
                            .to(Services::Table, Services::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(CaseStudies::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum CaseStudies {
    Table,
    Id,
    Title,
    Description,
    Impact,
    ImpactLevel,
    DisplayOrder,
    IsActive,
    IndustryId,
    ServiceId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Industries { Table, Id }

#[derive(DeriveIden)]
enum Services { Table, Id }
