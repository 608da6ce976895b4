use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use models::testimonial;

use crate::{
    checks::Checks,
    errors::ServiceError,
    guards,
    input::optional_text,
    ordering::{self, Collection},
    pagination::{self, fetch_page, parse_bool, search_condition, ListQuery, Page},
    storage::{ImageStore, PendingImage, UploadedImage},
};

pub const DEFAULT_LIMIT: u64 = 20;

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialInput {
    #[serde(default, deserialize_with = "optional_text")]
    #[validate(length(min = 2, max = 100, message = "Leader name must be between 2 and 100 characters"))]
    pub leader_name: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    #[validate(length(min = 2, max = 100, message = "Company name must be between 2 and 100 characters"))]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    #[validate(length(min = 2, max = 100, message = "Role must be between 2 and 100 characters"))]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    #[validate(length(min = 10, max = 1000, message = "Quote must be between 10 and 1000 characters"))]
    pub quote: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    #[validate(length(max = 500, message = "Image URL must be at most 500 characters"))]
    pub leader_image: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub approved: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialQuery {
    #[serde(flatten)]
    pub list: ListQuery,
    pub approved: Option<String>,
}

fn sort_column(name: Option<&str>) -> testimonial::Column {
    match name {
        Some("leaderName") => testimonial::Column::LeaderName,
        Some("companyName") => testimonial::Column::CompanyName,
        Some("createdAt") => testimonial::Column::CreatedAt,
        _ => testimonial::Column::SortOrder,
    }
}

#[instrument(skip(db))]
pub async fn list(db: &DatabaseConnection, query: &TestimonialQuery) -> Result<Page<testimonial::Model>, ServiceError> {
    let mut issues = Vec::new();
    let params = query.list.collect(DEFAULT_LIMIT, &mut issues);
    let approved = parse_bool("approved", query.approved.as_deref(), &mut issues);
    let params = pagination::finish(params, issues)?;

    let mut select = testimonial::Entity::find();
    if let Some(approved) = approved { select = select.filter(testimonial::Column::Approved.eq(approved)); }
    if let Some(term) = &params.search {
        select = select.filter(search_condition(
            &[testimonial::Column::LeaderName, testimonial::Column::CompanyName, testimonial::Column::Quote],
            term,
        ));
    }
    let select = select
        .order_by(sort_column(params.sort_by.as_deref()), params.order())
        .order_by_asc(testimonial::Column::LeaderName)
        .order_by_asc(testimonial::Column::CreatedAt)
        .order_by_asc(testimonial::Column::Id);
    fetch_page(db, select, &params).await
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<testimonial::Model, ServiceError> {
    guards::require::<testimonial::Entity, _>(db, id, "Testimonial").await
}

/// Public submission: always stored unapproved, whatever the body says.
#[instrument(skip(db, images, input, upload))]
pub async fn submit(
    db: &DatabaseConnection,
    images: &dyn ImageStore,
    mut input: TestimonialInput,
    upload: Option<UploadedImage>,
) -> Result<testimonial::Model, ServiceError> {
    let mut checks = Checks::from_derive(input.validate());
    for (field, value) in [
        ("leaderName", &input.leader_name),
        ("companyName", &input.company_name),
        ("role", &input.role),
        ("quote", &input.quote),
    ] {
        if value.is_none() {
            checks.push(field, format!("{field} is required"));
        }
    }
    if input.leader_image.is_none() && upload.is_none() {
        checks.push("leaderImage", "Leader image is required");
    }
    checks.finish()?;
    let image = PendingImage::resolve(images, upload, input.leader_image.take()).await?;
    let result = insert(db, input, image.url().unwrap_or_default()).await;
    image.settle(images, result).await
}

async fn insert(
    db: &DatabaseConnection,
    input: TestimonialInput,
    leader_image: String,
) -> Result<testimonial::Model, ServiceError> {
    let txn = db.begin().await?;
    ordering::lock(&txn, Collection::Testimonials).await?;
    let position = ordering::next_position::<testimonial::Entity, _>(&txn, None).await?;
    let now = crate::now();
    let created = testimonial::ActiveModel {
        id: Set(Uuid::new_v4()),
        leader_name: Set(input.leader_name.unwrap_or_default()),
        company_name: Set(input.company_name.unwrap_or_default()),
        role: Set(input.role.unwrap_or_default()),
        quote: Set(input.quote.unwrap_or_default()),
        leader_image: Set(leader_image),
        approved: Set(false),
        sort_order: Set(position),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    info!(id = %created.id, "testimonial submitted for approval");
    Ok(created)
}

#[instrument(skip(db, images, input, upload))]
pub async fn update(
    db: &DatabaseConnection,
    images: &dyn ImageStore,
    id: Uuid,
    mut input: TestimonialInput,
    upload: Option<UploadedImage>,
) -> Result<testimonial::Model, ServiceError> {
    Checks::from_derive(input.validate()).finish()?;
    let image = PendingImage::resolve(images, upload, input.leader_image.take()).await?;
    let result = apply(db, id, input, image.url()).await;
    image.settle(images, result).await
}

async fn apply(
    db: &DatabaseConnection,
    id: Uuid,
    input: TestimonialInput,
    leader_image: Option<String>,
) -> Result<testimonial::Model, ServiceError> {
    let current = get(db, id).await?;
    let mut am: testimonial::ActiveModel = current.into();
    if let Some(v) = input.leader_name { am.leader_name = Set(v); }
    if let Some(v) = input.company_name { am.company_name = Set(v); }
    if let Some(v) = input.role { am.role = Set(v); }
    if let Some(v) = input.quote { am.quote = Set(v); }
    if let Some(v) = leader_image { am.leader_image = Set(v); }
    if let Some(v) = input.approved { am.approved = Set(v); }
    am.updated_at = Set(crate::now());
    Ok(am.update(db).await?)
}

#[instrument(skip(db))]
pub async fn set_approval(db: &DatabaseConnection, id: Uuid, approved: bool) -> Result<testimonial::Model, ServiceError> {
    let current = get(db, id).await?;
    let mut am: testimonial::ActiveModel = current.into();
    am.approved = Set(approved);
    am.updated_at = Set(crate::now());
    let updated = am.update(db).await?;
    info!(%id, approved, "testimonial approval changed");
    Ok(updated)
}

#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let res = testimonial::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("Testimonial"));
    }
    info!(%id, "testimonial deleted");
    Ok(())
}
