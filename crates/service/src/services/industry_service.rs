use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use models::{case_study, expert, industry, insight};

use crate::{
    checks::Checks,
    errors::ServiceError,
    guards,
    ordering::{self, Collection},
    pagination::{fetch_page, search_condition, ListQuery, Page},
    relation_service::{self, Owner},
    services::{
        case_study_service::{self, InlineCaseStudy},
        insight_service,
    },
};

pub const DEFAULT_LIMIT: u64 = 10;
const SLUG_TAKEN: &str = "An industry with this slug already exists";

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateIndustry {
    #[serde(default)]
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    #[validate(length(min = 50, max = 2000, message = "Description must be between 50 and 2000 characters"))]
    pub description: String,
    pub is_active: Option<bool>,
    pub expert_ids: Option<Vec<Uuid>>,
    pub case_studies: Option<Vec<InlineCaseStudy>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIndustry {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: Option<String>,
    pub slug: Option<String>,
    #[validate(length(min = 50, max = 2000, message = "Description must be between 50 and 2000 characters"))]
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub expert_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryDetail {
    #[serde(flatten)]
    pub industry: industry::Model,
    pub experts: Vec<expert::Model>,
    pub case_studies: Vec<case_study::Model>,
    pub insights: Vec<insight::Model>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryStats {
    pub total_experts: u64,
    pub total_case_studies: u64,
    pub total_insights: u64,
    pub active_case_studies: u64,
    pub active_insights: u64,
}

fn sort_column(name: Option<&str>) -> industry::Column {
    match name {
        Some("slug") => industry::Column::Slug,
        Some("isActive") => industry::Column::IsActive,
        Some("sortOrder") => industry::Column::SortOrder,
        Some("createdAt") => industry::Column::CreatedAt,
        _ => industry::Column::Name,
    }
}

#[instrument(skip(db))]
pub async fn list(db: &DatabaseConnection, query: &ListQuery) -> Result<Page<industry::Model>, ServiceError> {
    let params = query.validate(DEFAULT_LIMIT)?;
    let mut select = industry::Entity::find();
    if let Some(active) = params.is_active { select = select.filter(industry::Column::IsActive.eq(active)); }
    if let Some(term) = &params.search {
        select = select.filter(search_condition(&[industry::Column::Name, industry::Column::Description], term));
    }
    let select = select
        .order_by(sort_column(params.sort_by.as_deref()), params.order())
        .order_by_asc(industry::Column::Name)
        .order_by_asc(industry::Column::CreatedAt)
        .order_by_asc(industry::Column::Id);
    fetch_page(db, select, &params).await
}

async fn detail(db: &DatabaseConnection, industry: industry::Model) -> Result<IndustryDetail, ServiceError> {
    let owner = Owner::Industry(industry.id);
    let experts = relation_service::experts_of(db, owner).await?;
    let case_studies = case_study_service::list_for(db, owner).await?;
    let insights = insight_service::list_for_industry_unchecked(db, industry.id).await?;
    Ok(IndustryDetail { industry, experts, case_studies, insights })
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<IndustryDetail, ServiceError> {
    let industry = guards::require::<industry::Entity, _>(db, id, "Industry").await?;
    detail(db, industry).await
}

pub async fn get_by_slug(db: &DatabaseConnection, slug: &str) -> Result<IndustryDetail, ServiceError> {
    let industry = industry::Entity::find()
        .filter(industry::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Industry"))?;
    detail(db, industry).await
}

#[instrument(skip(db, input), fields(slug = %input.slug))]
pub async fn create(db: &DatabaseConnection, input: CreateIndustry) -> Result<IndustryDetail, ServiceError> {
    let mut checks = Checks::from_derive(input.validate());
    checks.slug("slug", Some(&input.slug));
    checks.finish()?;
    case_study_service::check_inline(input.case_studies.as_deref().unwrap_or_default())?;

    let txn = db.begin().await?;
    ordering::lock(&txn, Collection::Industries).await?;
    guards::ensure_absent::<industry::Entity, _>(&txn, industry::Column::Slug.eq(input.slug.as_str()), SLUG_TAKEN)
        .await?;
    let position = ordering::next_position::<industry::Entity, _>(&txn, None).await?;
    let now = crate::now();
    let created = industry::ActiveModel {
        id: Set(Uuid::new_v4()),
        slug: Set(input.slug),
        name: Set(input.name),
        description: Set(input.description),
        is_active: Set(input.is_active.unwrap_or(true)),
        sort_order: Set(position),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    if let Some(ids) = input.expert_ids.as_deref() {
        relation_service::replace(&txn, Owner::Industry(created.id), ids).await?;
    }
    if let Some(items) = input.case_studies {
        case_study_service::insert_inline(&txn, Owner::Industry(created.id), items).await?;
    }
    txn.commit().await?;
    info!(id = %created.id, sort_order = position, "industry created");
    detail(db, created).await
}

#[instrument(skip(db, input))]
pub async fn update(db: &DatabaseConnection, id: Uuid, input: UpdateIndustry) -> Result<IndustryDetail, ServiceError> {
    let mut checks = Checks::from_derive(input.validate());
    checks.slug("slug", input.slug.as_deref());
    checks.finish()?;

    let txn = db.begin().await?;
    let mut am: industry::ActiveModel = guards::require::<industry::Entity, _>(&txn, id, "Industry").await?.into();
    if let Some(slug) = input.slug {
        guards::ensure_absent::<industry::Entity, _>(
            &txn,
            industry::Column::Slug.eq(slug.as_str()).and(industry::Column::Id.ne(id)),
            SLUG_TAKEN,
        )
        .await?;
        am.slug = Set(slug);
    }
    if let Some(name) = input.name { am.name = Set(name); }
    if let Some(description) = input.description { am.description = Set(description); }
    if let Some(active) = input.is_active { am.is_active = Set(active); }
    am.updated_at = Set(crate::now());
    let updated = am.update(&txn).await?;
    if let Some(ids) = input.expert_ids.as_deref() {
        relation_service::replace(&txn, Owner::Industry(id), ids).await?;
    }
    txn.commit().await?;
    detail(db, updated).await
}

/// Case studies, insights and expert links are removed with it.
#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let res = industry::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("Industry"));
    }
    info!(%id, "industry deleted");
    Ok(())
}

pub async fn toggle_status(db: &DatabaseConnection, id: Uuid) -> Result<industry::Model, ServiceError> {
    let current = guards::require::<industry::Entity, _>(db, id, "Industry").await?;
    let active = !current.is_active;
    let mut am: industry::ActiveModel = current.into();
    am.is_active = Set(active);
    am.updated_at = Set(crate::now());
    Ok(am.update(db).await?)
}

pub async fn stats(db: &DatabaseConnection, id: Uuid) -> Result<IndustryStats, ServiceError> {
    guards::require::<industry::Entity, _>(db, id, "Industry").await?;
    let cases = || case_study::Entity::find().filter(case_study::Column::IndustryId.eq(id));
    let insights = || insight::Entity::find().filter(insight::Column::IndustryId.eq(id));
    Ok(IndustryStats {
        total_experts: relation_service::count_experts(db, Owner::Industry(id)).await?,
        total_case_studies: cases().count(db).await?,
        total_insights: insights().count(db).await?,
        active_case_studies: cases().filter(case_study::Column::IsActive.eq(true)).count(db).await?,
        active_insights: insights().filter(insight::Column::IsActive.eq(true)).count(db).await?,
    })
}
