//! Dashboard totals.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;

use models::{
    affiliation, case_study, contact_message, expert, industry, insight, leader, partner, service, service_category,
    testimonial,
};

use crate::errors::ServiceError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub experts: u64,
    pub leaders: u64,
    pub industries: u64,
    pub services: u64,
    pub service_categories: u64,
    pub case_studies: u64,
    pub insights: u64,
    pub partners: u64,
    pub testimonials: u64,
    pub affiliations: u64,
    pub contact_messages: u64,
    pub unresponded_messages: u64,
    pub pending_testimonials: u64,
}

pub async fn dashboard(db: &DatabaseConnection) -> Result<DashboardStats, ServiceError> {
    Ok(DashboardStats {
        experts: expert::Entity::find().count(db).await?,
        leaders: leader::Entity::find().count(db).await?,
        industries: industry::Entity::find().count(db).await?,
        services: service::Entity::find().count(db).await?,
        service_categories: service_category::Entity::find().count(db).await?,
        case_studies: case_study::Entity::find().count(db).await?,
        insights: insight::Entity::find().count(db).await?,
        partners: partner::Entity::find().count(db).await?,
        testimonials: testimonial::Entity::find().count(db).await?,
        affiliations: affiliation::Entity::find().count(db).await?,
        contact_messages: contact_message::Entity::find().count(db).await?,
        unresponded_messages: contact_message::Entity::find()
            .filter(contact_message::Column::Responded.eq(false))
            .count(db)
            .await?,
        pending_testimonials: testimonial::Entity::find()
            .filter(testimonial::Column::Approved.eq(false))
            .count(db)
            .await?,
    })
}
