//! Manual display ordering.
//!
//! Every ordered collection keeps an integer position per row (1-based).
//! Appends and reorders for a collection are serialised with a Postgres
//! transaction-scoped advisory lock, so concurrent creates never share a
//! position and a reorder is applied all-or-nothing.

use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{
    prelude::DateTimeWithTimeZone, sea_query::Expr, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Statement, TransactionTrait,
};
use serde_json::Value;
use tracing::{info, instrument};
use uuid::Uuid;

use models::{
    affiliation, case_study, expert, industry, insight, leader, partner, service, service_category, testimonial,
};

use crate::errors::{FieldIssue, ServiceError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collection {
    ServiceCategories,
    Services,
    Industries,
    Experts,
    Leaders,
    Partners,
    Testimonials,
    Affiliations,
    CaseStudies,
    Insights,
}

impl Collection {
    /// Singular label used in messages.
    pub fn item_name(self) -> &'static str {
        match self {
            Collection::ServiceCategories => "category",
            Collection::Services => "service",
            Collection::Industries => "industry",
            Collection::Experts => "expert",
            Collection::Leaders => "leader",
            Collection::Partners => "partner",
            Collection::Testimonials => "testimonial",
            Collection::Affiliations => "affiliation",
            Collection::CaseStudies => "case study",
            Collection::Insights => "insight",
        }
    }

    fn lock_key(self) -> i64 {
        // "CMSO" in the high bytes keeps us clear of other advisory lock users.
        0x434D_534F_0000_0000 + self as i64
    }
}

/// An entity with a manual position column.
pub trait Ordered: EntityTrait {
    const COLLECTION: Collection;
    fn id_column() -> Self::Column;
    fn position_column() -> Self::Column;
    fn updated_at_column() -> Self::Column;
}

macro_rules! ordered {
    ($module:ident, $collection:ident, $position:ident) => {
        impl Ordered for $module::Entity {
            const COLLECTION: Collection = Collection::$collection;
            fn id_column() -> Self::Column { $module::Column::Id }
            fn position_column() -> Self::Column { $module::Column::$position }
            fn updated_at_column() -> Self::Column { $module::Column::UpdatedAt }
        }
    };
}

ordered!(service_category, ServiceCategories, SortOrder);
ordered!(service, Services, SortOrder);
ordered!(industry, Industries, SortOrder);
ordered!(expert, Experts, SortOrder);
ordered!(leader, Leaders, SortOrder);
ordered!(partner, Partners, SortOrder);
ordered!(testimonial, Testimonials, SortOrder);
ordered!(affiliation, Affiliations, SortOrder);
ordered!(case_study, CaseStudies, DisplayOrder);
ordered!(insight, Insights, DisplayOrder);

/// Block until this transaction owns the collection's ordering lock.
/// Released automatically at commit or rollback.
pub async fn lock<C: ConnectionTrait>(conn: &C, collection: Collection) -> Result<(), DbErr> {
    conn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT pg_advisory_xact_lock($1)",
        [collection.lock_key().into()],
    ))
    .await?;
    Ok(())
}

/// Next free position (`max + 1`, or 1 for an empty collection).
/// Call inside a transaction that already holds [`lock`].
pub async fn next_position<E, C>(conn: &C, scope: Option<Condition>) -> Result<i32, DbErr>
where
    E: Ordered,
    C: ConnectionTrait,
{
    let mut query = E::find().select_only().expr_as(E::position_column().max(), "max_position");
    if let Some(cond) = scope {
        query = query.filter(cond);
    }
    let max: Option<Option<i32>> = query.into_tuple::<Option<i32>>().one(conn).await?;
    Ok(max.flatten().unwrap_or(0) + 1)
}

/// A validated reorder request: non-empty, distinct identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderPlan {
    ids: Vec<Uuid>,
}

impl ReorderPlan {
    pub fn new(field: &str, ids: Vec<Uuid>) -> Result<Self, ServiceError> {
        if ids.is_empty() {
            return Err(ServiceError::invalid(field, format!("{field} must be a non-empty array")));
        }
        let mut seen = HashSet::with_capacity(ids.len());
        let mut issues = Vec::new();
        for (idx, id) in ids.iter().enumerate() {
            if !seen.insert(*id) {
                issues.push(FieldIssue::new(format!("{field}[{idx}]"), format!("duplicate id {id}")));
            }
        }
        if !issues.is_empty() {
            return Err(ServiceError::Validation(issues));
        }
        Ok(Self { ids })
    }

    /// Read `{ <field>: [uuid, ...] }` from a JSON body, reporting each bad entry.
    pub fn from_body(field: &str, body: &Value) -> Result<Self, ServiceError> {
        let Some(items) = body.get(field).and_then(Value::as_array) else {
            return Err(ServiceError::invalid(field, format!("{field} must be a non-empty array")));
        };
        let mut ids = Vec::with_capacity(items.len());
        let mut issues = Vec::new();
        for (idx, item) in items.iter().enumerate() {
            match item.as_str().and_then(|s| Uuid::parse_str(s).ok()) {
                Some(id) => ids.push(id),
                None => issues.push(FieldIssue::new(format!("{field}[{idx}]"), "must be a valid UUID")),
            }
        }
        if !issues.is_empty() {
            return Err(ServiceError::Validation(issues));
        }
        Self::new(field, ids)
    }

    pub fn ids(&self) -> &[Uuid] { &self.ids }

    /// `(id, position)` pairs, positions starting at 1.
    pub fn positions(&self) -> impl Iterator<Item = (Uuid, i32)> + '_ {
        self.ids.iter().enumerate().map(|(idx, id)| (*id, idx as i32 + 1))
    }

    pub fn missing(&self, found: &HashSet<Uuid>) -> Vec<Uuid> {
        self.ids.iter().filter(|id| !found.contains(id)).copied().collect()
    }
}

/// Apply `plan` atomically: every id must exist in the collection, otherwise
/// nothing changes.
#[instrument(skip(db, plan), fields(collection = ?E::COLLECTION, count = plan.ids().len()))]
pub async fn reorder<E>(db: &DatabaseConnection, plan: &ReorderPlan) -> Result<(), ServiceError>
where
    E: Ordered,
{
    let txn = db.begin().await?;
    lock(&txn, E::COLLECTION).await?;

    let found: HashSet<Uuid> = E::find()
        .select_only()
        .column(E::id_column())
        .filter(E::id_column().is_in(plan.ids().to_vec()))
        .into_tuple::<Uuid>()
        .all(&txn)
        .await?
        .into_iter()
        .collect();
    let missing = plan.missing(&found);
    if !missing.is_empty() {
        txn.rollback().await?;
        let list: Vec<String> = missing.iter().map(Uuid::to_string).collect();
        return Err(ServiceError::NotFound(format!(
            "{} not found: {}",
            E::COLLECTION.item_name(),
            list.join(", ")
        )));
    }

    let now: DateTimeWithTimeZone = Utc::now().into();
    for (id, position) in plan.positions() {
        E::update_many()
            .col_expr(E::position_column(), Expr::value(position))
            .col_expr(E::updated_at_column(), Expr::value(now))
            .filter(E::id_column().eq(id))
            .exec(&txn)
            .await?;
    }
    txn.commit().await?;
    info!(collection = ?E::COLLECTION, count = plan.ids().len(), "reordered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use sea_orm::{MockDatabase, Value as DbValue};
    use serde_json::json;

    fn max_position_row(max: Option<i32>) -> BTreeMap<&'static str, DbValue> {
        BTreeMap::from([("max_position", DbValue::Int(max))])
    }

    #[tokio::test]
    async fn first_item_of_an_empty_collection_gets_position_one() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![max_position_row(None)]])
            .into_connection();
        assert_eq!(next_position::<service_category::Entity, _>(&db, None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn next_position_follows_the_current_maximum() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![max_position_row(Some(7))]])
            .into_connection();
        let scope = Condition::all().add(case_study::Column::ServiceId.eq(Uuid::new_v4()));
        assert_eq!(next_position::<case_study::Entity, _>(&db, Some(scope)).await.unwrap(), 8);
    }

    #[test]
    fn positions_are_one_based_in_submitted_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let plan = ReorderPlan::new("ids", vec![b, a]).unwrap();
        let got: Vec<_> = plan.positions().collect();
        assert_eq!(got, vec![(b, 1), (a, 2)]);
    }

    #[test]
    fn empty_and_duplicate_ids_are_rejected() {
        assert!(matches!(ReorderPlan::new("ids", vec![]), Err(ServiceError::Validation(_))));
        let a = Uuid::new_v4();
        let Err(ServiceError::Validation(issues)) = ReorderPlan::new("expertIds", vec![a, a]) else { panic!() };
        assert_eq!(issues[0].field, "expertIds[1]");
    }

    #[test]
    fn body_must_carry_uuid_strings_under_the_field() {
        let id = Uuid::new_v4();
        let plan = ReorderPlan::from_body("categoryIds", &json!({"categoryIds": [id.to_string()]})).unwrap();
        assert_eq!(plan.ids(), &[id]);

        assert!(ReorderPlan::from_body("categoryIds", &json!({"ids": [id.to_string()]})).is_err());
        let Err(ServiceError::Validation(issues)) =
            ReorderPlan::from_body("categoryIds", &json!({"categoryIds": [id.to_string(), "nope", 3]}))
        else {
            panic!()
        };
        let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["categoryIds[1]", "categoryIds[2]"]);
    }

    #[test]
    fn missing_reports_unknown_ids_in_order() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let plan = ReorderPlan::new("ids", vec![a, b, c]).unwrap();
        let found: HashSet<Uuid> = [b].into_iter().collect();
        assert_eq!(plan.missing(&found), vec![a, c]);
    }

    #[test]
    fn lock_keys_are_distinct() {
        let keys: HashSet<i64> = [
            Collection::ServiceCategories,
            Collection::Services,
            Collection::Industries,
            Collection::Experts,
            Collection::Leaders,
            Collection::Partners,
            Collection::Testimonials,
            Collection::Affiliations,
            Collection::CaseStudies,
            Collection::Insights,
        ]
        .into_iter()
        .map(Collection::lock_key)
        .collect();
        assert_eq!(keys.len(), 10);
    }
}
