//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_service_categories;
mod m20240301_000002_create_services;
mod m20240301_000003_create_industries;
mod m20240301_000004_create_experts;
mod m20240301_000005_create_expert_links;
mod m20240301_000006_create_case_studies;
mod m20240301_000007_create_insights;
mod m20240301_000008_create_leaders;
mod m20240301_000009_create_partners;
mod m20240301_000010_create_testimonials;
mod m20240301_000011_create_affiliations;
mod m20240301_000012_create_contact_messages;
mod m20240301_000099_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_service_categories::Migration),
            Box::new(m20240301_000002_create_services::Migration),
            Box::new(m20240301_000003_create_industries::Migration),
            Box::new(m20240301_000004_create_experts::Migration),
            Box::new(m20240301_000005_create_expert_links::Migration),
            Box::new(m20240301_000006_create_case_studies::Migration),
            Box::new(m20240301_000007_create_insights::Migration),
            Box::new(m20240301_000008_create_leaders::Migration),
            Box::new(m20240301_000009_create_partners::Migration),
            Box::new(m20240301_000010_create_testimonials::Migration),
            Box::new(m20240301_000011_create_affiliations::Migration),
            Box::new(m20240301_000012_create_contact_messages::Migration),
            // Indexes should always be applied last
            Box::new(m20240301_000099_add_indexes::Migration),
        ]
    }
}
