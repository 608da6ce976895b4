use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use tracing::{debug, info, instrument};
use uuid::Uuid;
use validator::Validate;

use models::{industry, insight};

use crate::{
    checks::Checks,
    errors::ServiceError,
    guards,
    input::{nullable, optional_text},
    ordering::{self, Collection},
    pagination::{self, fetch_page, parse_uuid, search_condition, ListQuery, Page},
    storage::{ImageStore, PendingImage, UploadedImage},
};

pub const DEFAULT_LIMIT: u64 = 20;
pub const HIGHLIGHT_DEFAULT: u64 = 5;
pub const HIGHLIGHT_MAX: u64 = 50;

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInsight {
    #[serde(default)]
    #[validate(length(min = 5, max = 200, message = "Title must be between 5 and 200 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 100, max = 10000, message = "Content must be between 100 and 10000 characters"))]
    pub content: String,
    #[serde(default, deserialize_with = "optional_text")]
    #[validate(length(max = 500, message = "Image URL must be at most 500 characters"))]
    pub image: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub industry_id: Option<Uuid>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub is_active: Option<bool>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInsight {
    #[validate(length(min = 5, max = 200, message = "Title must be between 5 and 200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 100, max = 10000, message = "Content must be between 100 and 10000 characters"))]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    #[validate(length(max = 500, message = "Image URL must be at most 500 characters"))]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub industry_id: Option<Option<Uuid>>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightQuery {
    #[serde(flatten)]
    pub list: ListQuery,
    pub industry_id: Option<String>,
}

fn sort_column(name: Option<&str>) -> insight::Column {
    match name {
        Some("title") => insight::Column::Title,
        Some("viewCount") => insight::Column::ViewCount,
        Some("createdAt") => insight::Column::CreatedAt,
        _ => insight::Column::DisplayOrder,
    }
}

#[instrument(skip(db))]
pub async fn list(db: &DatabaseConnection, query: &InsightQuery) -> Result<Page<insight::Model>, ServiceError> {
    let mut issues = Vec::new();
    let params = query.list.collect(DEFAULT_LIMIT, &mut issues);
    let industry_id = parse_uuid("industryId", query.industry_id.as_deref(), &mut issues);
    let params = pagination::finish(params, issues)?;

    let mut select = insight::Entity::find();
    if let Some(id) = industry_id { select = select.filter(insight::Column::IndustryId.eq(id)); }
    if let Some(active) = params.is_active { select = select.filter(insight::Column::IsActive.eq(active)); }
    if let Some(term) = &params.search {
        select = select.filter(search_condition(&[insight::Column::Title, insight::Column::Content], term));
    }
    let select = select
        .order_by(sort_column(params.sort_by.as_deref()), params.order())
        .order_by_asc(insight::Column::Title)
        .order_by_asc(insight::Column::CreatedAt)
        .order_by_asc(insight::Column::Id);
    fetch_page(db, select, &params).await
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<insight::Model, ServiceError> {
    guards::require::<insight::Entity, _>(db, id, "Insight").await
}

pub(crate) async fn list_for_industry_unchecked(
    db: &DatabaseConnection,
    industry_id: Uuid,
) -> Result<Vec<insight::Model>, ServiceError> {
    Ok(insight::Entity::find()
        .filter(insight::Column::IndustryId.eq(industry_id))
        .order_by_asc(insight::Column::DisplayOrder)
        .order_by_desc(insight::Column::CreatedAt)
        .order_by_asc(insight::Column::Id)
        .all(db)
        .await?)
}

/// 404 when the industry does not exist.
pub async fn list_for_industry(db: &DatabaseConnection, industry_id: Uuid) -> Result<Vec<insight::Model>, ServiceError> {
    guards::require::<industry::Entity, _>(db, industry_id, "Industry").await?;
    list_for_industry_unchecked(db, industry_id).await
}

pub async fn popular(db: &DatabaseConnection, limit: Option<&str>) -> Result<Vec<insight::Model>, ServiceError> {
    let limit = pagination::parse_limit(limit, HIGHLIGHT_DEFAULT, HIGHLIGHT_MAX)?;
    Ok(insight::Entity::find()
        .filter(insight::Column::IsActive.eq(true))
        .order_by_desc(insight::Column::ViewCount)
        .order_by_desc(insight::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await?)
}

pub async fn recent(db: &DatabaseConnection, limit: Option<&str>) -> Result<Vec<insight::Model>, ServiceError> {
    let limit = pagination::parse_limit(limit, HIGHLIGHT_DEFAULT, HIGHLIGHT_MAX)?;
    Ok(insight::Entity::find()
        .filter(insight::Column::IsActive.eq(true))
        .order_by_desc(insight::Column::CreatedAt)
        .order_by_asc(insight::Column::Id)
        .limit(limit)
        .all(db)
        .await?)
}

/// Atomic `view_count + 1`; returns the new count.
pub async fn record_view(db: &DatabaseConnection, id: Uuid) -> Result<i32, ServiceError> {
    let updated = insight::Entity::update_many()
        .col_expr(insight::Column::ViewCount, Expr::col(insight::Column::ViewCount).add(1))
        .filter(insight::Column::Id.eq(id))
        .exec_with_returning(db)
        .await?;
    let count = updated.first().map(|m| m.view_count).ok_or_else(|| ServiceError::not_found("Insight"))?;
    debug!(%id, view_count = count, "insight viewed");
    Ok(count)
}

#[instrument(skip(db, images, input, upload))]
pub async fn create(
    db: &DatabaseConnection,
    images: &dyn ImageStore,
    mut input: CreateInsight,
    upload: Option<UploadedImage>,
) -> Result<insight::Model, ServiceError> {
    let mut checks = Checks::from_derive(input.validate());
    if input.image.is_none() && upload.is_none() {
        checks.push("image", "Image is required");
    }
    checks.finish()?;
    let image = PendingImage::resolve(images, upload, input.image.take()).await?;
    let result = insert(db, input, image.url().unwrap_or_default()).await;
    image.settle(images, result).await
}

async fn insert(db: &DatabaseConnection, input: CreateInsight, image: String) -> Result<insight::Model, ServiceError> {
    let txn = db.begin().await?;
    if let Some(industry_id) = input.industry_id {
        guards::require::<industry::Entity, _>(&txn, industry_id, "Industry").await?;
    }
    ordering::lock(&txn, Collection::Insights).await?;
    let position = ordering::next_position::<insight::Entity, _>(&txn, None).await?;
    let now = crate::now();
    let created = insight::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(input.title),
        content: Set(input.content),
        image: Set(image),
        view_count: Set(0),
        display_order: Set(position),
        is_active: Set(input.is_active.unwrap_or(true)),
        industry_id: Set(input.industry_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    info!(id = %created.id, display_order = position, "insight created");
    Ok(created)
}

#[instrument(skip(db, images, input, upload))]
pub async fn update(
    db: &DatabaseConnection,
    images: &dyn ImageStore,
    id: Uuid,
    mut input: UpdateInsight,
    upload: Option<UploadedImage>,
) -> Result<insight::Model, ServiceError> {
    Checks::from_derive(input.validate()).finish()?;
    let image = PendingImage::resolve(images, upload, input.image.take()).await?;
    let result = apply(db, id, input, image.url()).await;
    image.settle(images, result).await
}

async fn apply(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateInsight,
    image: Option<String>,
) -> Result<insight::Model, ServiceError> {
    let current = get(db, id).await?;
    if let Some(Some(industry_id)) = input.industry_id {
        guards::require::<industry::Entity, _>(db, industry_id, "Industry").await?;
    }
    let mut am: insight::ActiveModel = current.into();
    if let Some(v) = input.title { am.title = Set(v); }
    if let Some(v) = input.content { am.content = Set(v); }
    if let Some(v) = image { am.image = Set(v); }
    if let Some(v) = input.industry_id { am.industry_id = Set(v); }
    if let Some(v) = input.is_active { am.is_active = Set(v); }
    am.updated_at = Set(crate::now());
    Ok(am.update(db).await?)
}

#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let res = insight::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("Insight"));
    }
    info!(%id, "insight deleted");
    Ok(())
}

pub async fn toggle_status(db: &DatabaseConnection, id: Uuid) -> Result<insight::Model, ServiceError> {
    let current = get(db, id).await?;
    let active = !current.is_active;
    let mut am: insight::ActiveModel = current.into();
    am.is_active = Set(active);
    am.updated_at = Set(crate::now());
    Ok(am.update(db).await?)
}
