//! Services offered by the firm (the `services` table).

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use models::{case_study, expert, service, service_category};

use crate::{
    checks::Checks,
    errors::ServiceError,
    guards,
    input::nullable,
    ordering::{self, Collection},
    pagination::{fetch_page, search_condition, ListQuery, Page, PageMeta},
    relation_service::{self, Owner},
    services::case_study_service::{self, InlineCaseStudy},
};

pub const DEFAULT_LIMIT: u64 = 50;
const SLUG_TAKEN: &str = "A service with this slug already exists";

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateService {
    #[serde(default)]
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    #[validate(length(min = 50, max = 2000, message = "Description must be between 50 and 2000 characters"))]
    pub description: String,
    pub category_id: Option<Uuid>,
    pub is_active: Option<bool>,
    pub expert_ids: Option<Vec<Uuid>>,
    pub case_studies: Option<Vec<InlineCaseStudy>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateService {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: Option<String>,
    pub slug: Option<String>,
    #[validate(length(min = 50, max = 2000, message = "Description must be between 50 and 2000 characters"))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub category_id: Option<Option<Uuid>>,
    pub is_active: Option<bool>,
    pub expert_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceQuery {
    #[serde(flatten)]
    pub list: ListQuery,
    /// Category slug.
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    #[serde(flatten)]
    pub service: service::Model,
    pub category: Option<service_category::Model>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDetail {
    #[serde(flatten)]
    pub service: service::Model,
    pub category: Option<service_category::Model>,
    pub experts: Vec<expert::Model>,
    pub case_studies: Vec<case_study::Model>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStats {
    pub total_experts: u64,
    pub total_case_studies: u64,
    pub active_case_studies: u64,
}

fn sort_column(name: Option<&str>) -> service::Column {
    match name {
        Some("name") => service::Column::Name,
        Some("slug") => service::Column::Slug,
        Some("isActive") => service::Column::IsActive,
        Some("createdAt") => service::Column::CreatedAt,
        _ => service::Column::SortOrder,
    }
}

#[instrument(skip(db))]
pub async fn list(db: &DatabaseConnection, query: &ServiceQuery) -> Result<Page<ServiceSummary>, ServiceError> {
    let params = query.list.validate(DEFAULT_LIMIT)?;
    let mut select = service::Entity::find();
    if let Some(slug) = query.category.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let category = service_category::Entity::find()
            .filter(service_category::Column::Slug.eq(slug))
            .one(db)
            .await?;
        match category {
            Some(c) => select = select.filter(service::Column::CategoryId.eq(c.id)),
            None => return Ok(Page { items: Vec::new(), meta: PageMeta::new(params.page, params.limit, 0) }),
        }
    }
    if let Some(active) = params.is_active { select = select.filter(service::Column::IsActive.eq(active)); }
    if let Some(term) = &params.search {
        select = select.filter(search_condition(&[service::Column::Name, service::Column::Description], term));
    }
    let select = select
        .order_by(sort_column(params.sort_by.as_deref()), params.order())
        .order_by_asc(service::Column::Name)
        .order_by_asc(service::Column::CreatedAt)
        .order_by_asc(service::Column::Id);
    let page = fetch_page(db, select, &params).await?;

    let category_ids: Vec<Uuid> = page.items.iter().filter_map(|s| s.category_id).collect();
    let categories: HashMap<Uuid, service_category::Model> = if category_ids.is_empty() {
        HashMap::new()
    } else {
        service_category::Entity::find()
            .filter(service_category::Column::Id.is_in(category_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect()
    };
    Ok(page.map(|service| {
        let category = service.category_id.and_then(|id| categories.get(&id).cloned());
        ServiceSummary { service, category }
    }))
}

async fn detail(db: &DatabaseConnection, service: service::Model) -> Result<ServiceDetail, ServiceError> {
    let category = match service.category_id {
        Some(id) => service_category::Entity::find_by_id(id).one(db).await?,
        None => None,
    };
    let experts = relation_service::experts_of(db, Owner::Service(service.id)).await?;
    let case_studies = case_study_service::list_for(db, Owner::Service(service.id)).await?;
    Ok(ServiceDetail { service, category, experts, case_studies })
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<ServiceDetail, ServiceError> {
    let service = guards::require::<service::Entity, _>(db, id, "Service").await?;
    detail(db, service).await
}

pub async fn get_by_slug(db: &DatabaseConnection, slug: &str) -> Result<ServiceDetail, ServiceError> {
    let service = service::Entity::find()
        .filter(service::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Service"))?;
    detail(db, service).await
}

#[instrument(skip(db, input), fields(slug = %input.slug))]
pub async fn create(db: &DatabaseConnection, input: CreateService) -> Result<ServiceDetail, ServiceError> {
    let mut checks = Checks::from_derive(input.validate());
    checks.slug("slug", Some(&input.slug));
    checks.finish()?;
    case_study_service::check_inline(input.case_studies.as_deref().unwrap_or_default())?;

    let txn = db.begin().await?;
    ordering::lock(&txn, Collection::Services).await?;
    guards::ensure_absent::<service::Entity, _>(&txn, service::Column::Slug.eq(input.slug.as_str()), SLUG_TAKEN).await?;
    if let Some(category_id) = input.category_id {
        guards::ensure_reference::<service_category::Entity, _>(&txn, category_id, "categoryId", "Category").await?;
    }
    let position = ordering::next_position::<service::Entity, _>(&txn, None).await?;
    let now = crate::now();
    let created = service::ActiveModel {
        id: Set(Uuid::new_v4()),
        slug: Set(input.slug),
        name: Set(input.name),
        description: Set(input.description),
        category_id: Set(input.category_id),
        is_active: Set(input.is_active.unwrap_or(true)),
        sort_order: Set(position),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    if let Some(ids) = input.expert_ids.as_deref() {
        relation_service::replace(&txn, Owner::Service(created.id), ids).await?;
    }
    if let Some(items) = input.case_studies {
        case_study_service::insert_inline(&txn, Owner::Service(created.id), items).await?;
    }
    txn.commit().await?;
    info!(id = %created.id, sort_order = position, "service created");
    detail(db, created).await
}

#[instrument(skip(db, input))]
pub async fn update(db: &DatabaseConnection, id: Uuid, input: UpdateService) -> Result<ServiceDetail, ServiceError> {
    let mut checks = Checks::from_derive(input.validate());
    checks.slug("slug", input.slug.as_deref());
    checks.finish()?;

    let txn = db.begin().await?;
    let mut am: service::ActiveModel = guards::require::<service::Entity, _>(&txn, id, "Service").await?.into();
    if let Some(slug) = input.slug {
        guards::ensure_absent::<service::Entity, _>(
            &txn,
            service::Column::Slug.eq(slug.as_str()).and(service::Column::Id.ne(id)),
            SLUG_TAKEN,
        )
        .await?;
        am.slug = Set(slug);
    }
    if let Some(category_id) = input.category_id {
        if let Some(cid) = category_id {
            guards::ensure_reference::<service_category::Entity, _>(&txn, cid, "categoryId", "Category").await?;
        }
        am.category_id = Set(category_id);
    }
    if let Some(name) = input.name { am.name = Set(name); }
    if let Some(description) = input.description { am.description = Set(description); }
    if let Some(active) = input.is_active { am.is_active = Set(active); }
    am.updated_at = Set(crate::now());
    let updated = am.update(&txn).await?;
    if let Some(ids) = input.expert_ids.as_deref() {
        relation_service::replace(&txn, Owner::Service(id), ids).await?;
    }
    txn.commit().await?;
    detail(db, updated).await
}

/// Case studies and expert links go with it.
#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let res = service::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("Service"));
    }
    info!(%id, "service deleted");
    Ok(())
}

pub async fn toggle_status(db: &DatabaseConnection, id: Uuid) -> Result<service::Model, ServiceError> {
    let current = guards::require::<service::Entity, _>(db, id, "Service").await?;
    let active = !current.is_active;
    let mut am: service::ActiveModel = current.into();
    am.is_active = Set(active);
    am.updated_at = Set(crate::now());
    Ok(am.update(db).await?)
}

pub async fn stats(db: &DatabaseConnection, id: Uuid) -> Result<ServiceStats, ServiceError> {
    guards::require::<service::Entity, _>(db, id, "Service").await?;
    let total_experts = relation_service::count_experts(db, Owner::Service(id)).await?;
    let total_case_studies =
        case_study::Entity::find().filter(case_study::Column::ServiceId.eq(id)).count(db).await?;
    let active_case_studies = case_study::Entity::find()
        .filter(case_study::Column::ServiceId.eq(id))
        .filter(case_study::Column::IsActive.eq(true))
        .count(db)
        .await?;
    Ok(ServiceStats { total_experts, total_case_studies, active_case_studies })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::{category_service, expert_service};
    use crate::test_support::{get_db, unique};

    pub(crate) const DESCRIPTION: &str =
        "Independent assurance over financial statements for listed and private companies.";

    pub(crate) async fn create_service(db: &DatabaseConnection) -> Result<ServiceDetail, ServiceError> {
        create(
            db,
            CreateService {
                name: "External Audit".into(),
                slug: unique("svc"),
                description: DESCRIPTION.into(),
                ..Default::default()
            },
        )
        .await
    }

    #[tokio::test]
    async fn create_with_experts_and_inline_case_studies() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let category = category_service::tests::create_category(&db).await?;
        let expert = expert_service::tests::create_expert(&db).await?;
        let created = create(
            &db,
            CreateService {
                name: "Tax Advisory".into(),
                slug: unique("tax"),
                description: DESCRIPTION.into(),
                category_id: Some(category.id),
                expert_ids: Some(vec![expert.id]),
                case_studies: Some(vec![
                    InlineCaseStudy {
                        title: "Transfer pricing review".into(),
                        description: "x".repeat(60),
                        impact: None,
                        impact_level: Some("Low".into()),
                    },
                    InlineCaseStudy {
                        title: "VAT recovery programme".into(),
                        description: "y".repeat(60),
                        impact: Some("Recovered overpaid VAT".into()),
                        impact_level: None,
                    },
                ]),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(created.category.as_ref().map(|c| c.id), Some(category.id));
        assert_eq!(created.experts.len(), 1);
        let orders: Vec<i32> = created.case_studies.iter().map(|c| c.display_order).collect();
        assert_eq!(orders, vec![1, 2]);

        let by_slug = get_by_slug(&db, &created.service.slug).await?;
        assert_eq!(by_slug.service.id, created.service.id);

        // category still referenced
        let err = category_service::delete(&db, category.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let stats = stats(&db, created.service.id).await?;
        assert_eq!((stats.total_experts, stats.total_case_studies, stats.active_case_studies), (1, 2, 2));

        delete(&db, created.service.id).await?;
        assert!(case_study_service::list_for(&db, Owner::Service(created.service.id)).await?.is_empty());
        category_service::delete(&db, category.id).await?;
        expert_service::delete(&db, expert.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn unknown_category_and_unknown_expert_are_rejected() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let base = CreateService {
            name: "Risk".into(),
            slug: unique("risk"),
            description: DESCRIPTION.into(),
            ..Default::default()
        };
        let err = create(&db, CreateService { category_id: Some(Uuid::new_v4()), ..base.clone() }).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let err = create(&db, CreateService { expert_ids: Some(vec![Uuid::new_v4()]), ..base.clone() }).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        // nothing was written by the failed attempts
        assert!(matches!(get_by_slug(&db, &base.slug).await.unwrap_err(), ServiceError::NotFound(_)));
        Ok(())
    }

    #[tokio::test]
    async fn patch_is_idempotent_and_category_can_be_cleared() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let category = category_service::tests::create_category(&db).await?;
        let svc = create_service(&db).await?;
        let patch = UpdateService { category_id: Some(Some(category.id)), name: Some("Audit".into()), ..Default::default() };
        let once = update(&db, svc.service.id, patch.clone()).await?;
        let twice = update(&db, svc.service.id, patch).await?;
        assert_eq!(once.service.name, twice.service.name);
        assert_eq!(twice.service.category_id, Some(category.id));
        assert_eq!(once.service.sort_order, twice.service.sort_order);

        let cleared = update(&db, svc.service.id, UpdateService { category_id: Some(None), ..Default::default() }).await?;
        assert_eq!(cleared.service.category_id, None);

        let toggled = toggle_status(&db, svc.service.id).await?;
        assert!(!toggled.is_active);

        delete(&db, svc.service.id).await?;
        category_service::delete(&db, category.id).await?;
        Ok(())
    }
}
