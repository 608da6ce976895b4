use std::collections::BTreeMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use models::{
    case_study::{self, ImpactLevel},
    industry, service,
};

use crate::{
    checks::Checks,
    errors::ServiceError,
    guards,
    input::nullable,
    ordering::{self, Collection},
    pagination::{self, fetch_page, parse_uuid, search_condition, ListQuery, Page},
    relation_service::Owner,
};

pub const DEFAULT_LIMIT: u64 = 50;
pub const FEATURED_DEFAULT: u64 = 6;
pub const FEATURED_MAX: u64 = 20;

const IMPACT_HINT: &str = "impactLevel must be one of Low, Medium, High, Transformational";

fn parse_impact(checks: &mut Checks, raw: Option<&str>) -> Option<ImpactLevel> {
    let raw = raw?;
    let level = ImpactLevel::parse(raw.trim());
    if level.is_none() {
        checks.push("impactLevel", IMPACT_HINT);
    }
    level
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaseStudy {
    #[serde(default)]
    #[validate(length(min = 5, max = 200, message = "Title must be between 5 and 200 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 50, max = 2000, message = "Description must be between 50 and 2000 characters"))]
    pub description: String,
    #[serde(default)]
    #[validate(length(min = 10, max = 1000, message = "Impact must be between 10 and 1000 characters"))]
    pub impact: String,
    pub impact_level: Option<String>,
    pub is_active: Option<bool>,
    pub industry_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
}

impl CreateCaseStudy {
    fn check(&self) -> Result<ImpactLevel, ServiceError> {
        let mut checks = Checks::from_derive(self.validate());
        let level = parse_impact(&mut checks, self.impact_level.as_deref());
        if self.industry_id.is_none() && self.service_id.is_none() {
            checks.push("industryId", "Either industryId or serviceId is required");
        }
        checks.finish()?;
        Ok(level.unwrap_or_default())
    }
}

/// Case study submitted together with its parent service or industry.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InlineCaseStudy {
    #[serde(default)]
    #[validate(length(min = 5, max = 200, message = "Title must be between 5 and 200 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 50, max = 2000, message = "Description must be between 50 and 2000 characters"))]
    pub description: String,
    #[validate(length(min = 10, max = 1000, message = "Impact must be between 10 and 1000 characters"))]
    pub impact: Option<String>,
    pub impact_level: Option<String>,
}

/// Validate inline case studies, reporting fields as `caseStudies[i].field`.
pub fn check_inline(items: &[InlineCaseStudy]) -> Result<(), ServiceError> {
    let mut checks = Checks::default();
    for (idx, item) in items.iter().enumerate() {
        let mut inner = Checks::from_derive(item.validate());
        parse_impact(&mut inner, item.impact_level.as_deref());
        if let Err(ServiceError::Validation(issues)) = inner.finish() {
            for issue in issues {
                checks.push(&format!("caseStudies[{idx}].{}", issue.field), issue.message);
            }
        }
    }
    checks.finish()
}

/// Insert inline case studies under a freshly created parent, appending
/// display positions within that parent. Caller owns the transaction.
pub async fn insert_inline<C: ConnectionTrait>(
    conn: &C,
    owner: Owner,
    items: Vec<InlineCaseStudy>,
) -> Result<Vec<case_study::Model>, ServiceError> {
    if items.is_empty() {
        return Ok(Vec::new());
    }
    ordering::lock(conn, Collection::CaseStudies).await?;
    let (industry_id, service_id, scope) = match owner {
        Owner::Industry(id) => (Some(id), None, case_study::Column::IndustryId.eq(id)),
        Owner::Service(id) => (None, Some(id), case_study::Column::ServiceId.eq(id)),
    };
    let first = ordering::next_position::<case_study::Entity, _>(conn, Some(Condition::all().add(scope))).await?;
    let now = crate::now();
    let mut created = Vec::with_capacity(items.len());
    for (offset, item) in items.into_iter().enumerate() {
        let level = item.impact_level.as_deref().and_then(ImpactLevel::parse).unwrap_or_default();
        let model = case_study::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(item.title),
            description: Set(item.description),
            impact: Set(item.impact.unwrap_or_default()),
            impact_level: Set(level),
            display_order: Set(first + offset as i32),
            is_active: Set(true),
            industry_id: Set(industry_id),
            service_id: Set(service_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await?;
        created.push(model);
    }
    Ok(created)
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCaseStudy {
    #[validate(length(min = 5, max = 200, message = "Title must be between 5 and 200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 50, max = 2000, message = "Description must be between 50 and 2000 characters"))]
    pub description: Option<String>,
    #[validate(length(min = 10, max = 1000, message = "Impact must be between 10 and 1000 characters"))]
    pub impact: Option<String>,
    pub impact_level: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub industry_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "nullable")]
    pub service_id: Option<Option<Uuid>>,
}

/// Listing filters on top of the common query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStudyQuery {
    #[serde(flatten)]
    pub list: ListQuery,
    pub industry_id: Option<String>,
    pub service_id: Option<String>,
    pub impact_level: Option<String>,
}

fn sort_column(name: Option<&str>) -> case_study::Column {
    match name {
        Some("title") => case_study::Column::Title,
        Some("impactLevel") => case_study::Column::ImpactLevel,
        Some("createdAt") => case_study::Column::CreatedAt,
        _ => case_study::Column::DisplayOrder,
    }
}

#[instrument(skip(db))]
pub async fn list(db: &DatabaseConnection, query: &CaseStudyQuery) -> Result<Page<case_study::Model>, ServiceError> {
    let mut issues = Vec::new();
    let params = query.list.collect(DEFAULT_LIMIT, &mut issues);
    let industry_id = parse_uuid("industryId", query.industry_id.as_deref(), &mut issues);
    let service_id = parse_uuid("serviceId", query.service_id.as_deref(), &mut issues);
    let mut level_checks = Checks::default();
    let level = parse_impact(&mut level_checks, query.impact_level.as_deref().filter(|s| !s.trim().is_empty()));
    if let Err(ServiceError::Validation(more)) = level_checks.finish() {
        issues.extend(more);
    }
    let params = pagination::finish(params, issues)?;

    let mut select = case_study::Entity::find();
    if let Some(id) = industry_id { select = select.filter(case_study::Column::IndustryId.eq(id)); }
    if let Some(id) = service_id { select = select.filter(case_study::Column::ServiceId.eq(id)); }
    if let Some(level) = level { select = select.filter(case_study::Column::ImpactLevel.eq(level)); }
    if let Some(active) = params.is_active { select = select.filter(case_study::Column::IsActive.eq(active)); }
    if let Some(term) = &params.search {
        select = select.filter(search_condition(
            &[case_study::Column::Title, case_study::Column::Description, case_study::Column::Impact],
            term,
        ));
    }
    let select = select
        .order_by(sort_column(params.sort_by.as_deref()), params.order())
        .order_by_asc(case_study::Column::Title)
        .order_by_asc(case_study::Column::CreatedAt)
        .order_by_asc(case_study::Column::Id);
    fetch_page(db, select, &params).await
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<case_study::Model, ServiceError> {
    guards::require::<case_study::Entity, _>(db, id, "Case study").await
}

async fn check_parents<C: ConnectionTrait>(
    conn: &C,
    industry_id: Option<Uuid>,
    service_id: Option<Uuid>,
) -> Result<(), ServiceError> {
    if let Some(id) = industry_id {
        guards::require::<industry::Entity, _>(conn, id, "Industry").await?;
    }
    if let Some(id) = service_id {
        guards::require::<service::Entity, _>(conn, id, "Service").await?;
    }
    Ok(())
}

#[instrument(skip(db, input))]
pub async fn create(db: &DatabaseConnection, input: CreateCaseStudy) -> Result<case_study::Model, ServiceError> {
    let level = input.check()?;
    let txn = db.begin().await?;
    check_parents(&txn, input.industry_id, input.service_id).await?;
    ordering::lock(&txn, Collection::CaseStudies).await?;
    let position = ordering::next_position::<case_study::Entity, _>(&txn, None).await?;
    let now = crate::now();
    let created = case_study::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(input.title),
        description: Set(input.description),
        impact: Set(input.impact),
        impact_level: Set(level),
        display_order: Set(position),
        is_active: Set(input.is_active.unwrap_or(true)),
        industry_id: Set(input.industry_id),
        service_id: Set(input.service_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    info!(id = %created.id, display_order = position, "case study created");
    Ok(created)
}

#[instrument(skip(db, input))]
pub async fn update(db: &DatabaseConnection, id: Uuid, input: UpdateCaseStudy) -> Result<case_study::Model, ServiceError> {
    let mut checks = Checks::from_derive(input.validate());
    let level = parse_impact(&mut checks, input.impact_level.as_deref());
    checks.finish()?;

    let txn = db.begin().await?;
    let current = guards::require::<case_study::Entity, _>(&txn, id, "Case study").await?;
    let industry_id = input.industry_id.unwrap_or(current.industry_id);
    let service_id = input.service_id.unwrap_or(current.service_id);
    if industry_id.is_none() && service_id.is_none() {
        return Err(ServiceError::invalid("industryId", "A case study must belong to an industry or a service"));
    }
    check_parents(
        &txn,
        input.industry_id.flatten(),
        input.service_id.flatten(),
    )
    .await?;

    let mut am: case_study::ActiveModel = current.into();
    if let Some(title) = input.title { am.title = Set(title); }
    if let Some(description) = input.description { am.description = Set(description); }
    if let Some(impact) = input.impact { am.impact = Set(impact); }
    if let Some(level) = level { am.impact_level = Set(level); }
    if let Some(active) = input.is_active { am.is_active = Set(active); }
    am.industry_id = Set(industry_id);
    am.service_id = Set(service_id);
    am.updated_at = Set(crate::now());
    let updated = am.update(&txn).await?;
    txn.commit().await?;
    Ok(updated)
}

#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let res = case_study::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("Case study"));
    }
    info!(%id, "case study deleted");
    Ok(())
}

pub async fn toggle_status(db: &DatabaseConnection, id: Uuid) -> Result<case_study::Model, ServiceError> {
    let current = get(db, id).await?;
    let active = !current.is_active;
    let mut am: case_study::ActiveModel = current.into();
    am.is_active = Set(active);
    am.updated_at = Set(crate::now());
    Ok(am.update(db).await?)
}

/// Case studies of one parent, newest first within equal positions. A parent
/// that does not exist (or was deleted with its case studies) yields an empty list.
pub async fn list_for<C: ConnectionTrait>(conn: &C, owner: Owner) -> Result<Vec<case_study::Model>, ServiceError> {
    let filter = match owner {
        Owner::Industry(id) => case_study::Column::IndustryId.eq(id),
        Owner::Service(id) => case_study::Column::ServiceId.eq(id),
    };
    Ok(case_study::Entity::find()
        .filter(filter)
        .order_by_asc(case_study::Column::DisplayOrder)
        .order_by_desc(case_study::Column::CreatedAt)
        .order_by_asc(case_study::Column::Id)
        .all(conn)
        .await?)
}

/// Like [`list_for`] but 404 when the parent does not exist.
pub async fn list_for_parent(db: &DatabaseConnection, owner: Owner) -> Result<Vec<case_study::Model>, ServiceError> {
    crate::relation_service::ensure_owner(db, owner).await?;
    list_for(db, owner).await
}

pub async fn by_impact(db: &DatabaseConnection, raw_level: &str) -> Result<Vec<case_study::Model>, ServiceError> {
    let level = ImpactLevel::parse(raw_level.trim()).ok_or_else(|| ServiceError::invalid("impactLevel", IMPACT_HINT))?;
    Ok(case_study::Entity::find()
        .filter(case_study::Column::ImpactLevel.eq(level))
        .filter(case_study::Column::IsActive.eq(true))
        .order_by_asc(case_study::Column::DisplayOrder)
        .order_by_desc(case_study::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn featured(db: &DatabaseConnection, limit: Option<&str>) -> Result<Vec<case_study::Model>, ServiceError> {
    let limit = pagination::parse_limit(limit, FEATURED_DEFAULT, FEATURED_MAX)?;
    Ok(case_study::Entity::find()
        .filter(case_study::Column::IsActive.eq(true))
        .order_by_asc(case_study::Column::DisplayOrder)
        .order_by_desc(case_study::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await?)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStudyOverview {
    pub total: u64,
    pub active: u64,
    pub industry_case_studies: u64,
    pub service_case_studies: u64,
    pub by_impact: BTreeMap<&'static str, u64>,
}

pub async fn overview(db: &DatabaseConnection) -> Result<CaseStudyOverview, ServiceError> {
    let total = case_study::Entity::find().count(db).await?;
    let active = case_study::Entity::find().filter(case_study::Column::IsActive.eq(true)).count(db).await?;
    let industry_case_studies =
        case_study::Entity::find().filter(case_study::Column::IndustryId.is_not_null()).count(db).await?;
    let service_case_studies =
        case_study::Entity::find().filter(case_study::Column::ServiceId.is_not_null()).count(db).await?;
    let mut by_impact = BTreeMap::new();
    for level in [ImpactLevel::Low, ImpactLevel::Medium, ImpactLevel::High, ImpactLevel::Transformational] {
        let n = case_study::Entity::find().filter(case_study::Column::ImpactLevel.eq(level)).count(db).await?;
        by_impact.insert(level.as_str(), n);
    }
    Ok(CaseStudyOverview { total, active, industry_case_studies, service_case_studies, by_impact })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::{catalog_service, industry_service};
    use crate::test_support::get_db;
    use sea_orm::{DatabaseBackend, MockDatabase};

    pub(crate) fn sample(industry_id: Option<Uuid>, service_id: Option<Uuid>) -> CreateCaseStudy {
        CreateCaseStudy {
            title: "Group-wide audit modernisation".into(),
            description: "Rebuilt the audit workflow of a regional bank across nine subsidiaries.".into(),
            impact: "Closing time down by a third".into(),
            impact_level: Some("high".into()),
            is_active: None,
            industry_id,
            service_id,
        }
    }

    #[test]
    fn create_requires_a_parent_and_a_known_level() {
        let mut input = sample(None, None);
        input.impact_level = Some("enormous".into());
        let ServiceError::Validation(issues) = input.check().unwrap_err() else { panic!() };
        let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["impactLevel", "industryId"]);
    }

    #[tokio::test]
    async fn listing_by_a_deleted_parent_is_empty() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<case_study::Model>::new()])
            .into_connection();
        let listed = list_for(&db, Owner::Industry(Uuid::new_v4())).await.unwrap();
        assert!(listed.is_empty());
        // one query only: the parent is never looked up
        assert_eq!(db.into_transaction_log().len(), 1);
    }

    #[test]
    fn impact_level_defaults_to_medium() {
        let mut input = sample(Some(Uuid::new_v4()), None);
        input.impact_level = None;
        assert_eq!(input.check().unwrap(), ImpactLevel::Medium);
    }

    #[test]
    fn inline_issues_are_prefixed_with_their_index() {
        let items = vec![
            InlineCaseStudy {
                title: "Valid enough title".into(),
                description: "x".repeat(60),
                impact: None,
                impact_level: None,
            },
            InlineCaseStudy { title: "no".into(), description: "x".repeat(60), impact: None, impact_level: None },
        ];
        let ServiceError::Validation(issues) = check_inline(&items).unwrap_err() else { panic!() };
        assert_eq!(issues[0].field, "caseStudies[1].title");
    }

    #[tokio::test]
    async fn industry_delete_cascades_to_case_studies() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let industry = industry_service::tests::create_industry(&db).await?;
        let cs = create(&db, sample(Some(industry.id), None)).await?;
        assert_eq!(cs.impact_level, ImpactLevel::High);

        let listed = list_for_parent(&db, Owner::Industry(industry.id)).await?;
        assert_eq!(listed.len(), 1);

        industry_service::delete(&db, industry.id).await?;
        assert!(matches!(get(&db, cs.id).await.unwrap_err(), ServiceError::NotFound(_)));
        assert!(list_for(&db, Owner::Industry(industry.id)).await?.is_empty());
        let err = list_for_parent(&db, Owner::Industry(industry.id)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_parent_is_not_found_and_update_keeps_a_parent() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let err = create(&db, sample(Some(Uuid::new_v4()), None)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let svc = catalog_service::tests::create_service(&db).await?.service;
        let cs = create(&db, sample(None, Some(svc.id))).await?;
        let orphaning = UpdateCaseStudy { service_id: Some(None), ..Default::default() };
        assert!(matches!(update(&db, cs.id, orphaning).await.unwrap_err(), ServiceError::Validation(_)));

        let toggled = toggle_status(&db, cs.id).await?;
        assert!(!toggled.is_active);
        let patch = UpdateCaseStudy { impact_level: Some("Transformational".into()), ..Default::default() };
        let first = update(&db, cs.id, patch.clone()).await?;
        let second = update(&db, cs.id, patch).await?;
        assert_eq!(first.impact_level, second.impact_level);
        assert_eq!(first.title, second.title);

        catalog_service::delete(&db, svc.id).await?;
        assert!(matches!(get(&db, cs.id).await.unwrap_err(), ServiceError::NotFound(_)));
        Ok(())
    }

    #[tokio::test]
    async fn list_validates_filters() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let q = CaseStudyQuery { industry_id: Some("not-a-uuid".into()), impact_level: Some("huge".into()), ..Default::default() };
        let ServiceError::Validation(issues) = list(&db, &q).await.unwrap_err() else { panic!() };
        assert_eq!(issues.len(), 2);
        Ok(())
    }
}
