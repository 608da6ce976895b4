use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use models::affiliation;

use crate::{
    checks::Checks,
    errors::ServiceError,
    guards,
    input::{nullable_text, optional_text},
    ordering::{self, Collection},
    pagination::{fetch_page, search_condition, ListQuery, Page},
};

pub const DEFAULT_LIMIT: u64 = 50;
const NAME_TAKEN: &str = "An affiliation with this name already exists";
const ACRONYM_TAKEN: &str = "An affiliation with this acronym already exists";

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAffiliation {
    #[serde(default)]
    #[validate(length(min = 2, max = 200, message = "Name must be between 2 and 200 characters"))]
    pub name: String,
    #[serde(default, deserialize_with = "optional_text")]
    #[validate(length(min = 1, max = 20, message = "Acronym must be at most 20 characters"))]
    pub acronym: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAffiliation {
    #[validate(length(min = 2, max = 200, message = "Name must be between 2 and 200 characters"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable_text")]
    pub acronym: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable_text")]
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl UpdateAffiliation {
    fn check(&self) -> Result<(), ServiceError> {
        let mut checks = Checks::from_derive(self.validate());
        checks.length("acronym", "Acronym", self.acronym.clone().flatten().as_deref(), 1, 20);
        checks.length("description", "Description", self.description.clone().flatten().as_deref(), 0, 1000);
        checks.finish()
    }
}

fn sort_column(name: Option<&str>) -> affiliation::Column {
    match name {
        Some("name") => affiliation::Column::Name,
        Some("acronym") => affiliation::Column::Acronym,
        Some("createdAt") => affiliation::Column::CreatedAt,
        _ => affiliation::Column::SortOrder,
    }
}

/// Only active affiliations unless `isActive` is given explicitly.
#[instrument(skip(db))]
pub async fn list(db: &DatabaseConnection, query: &ListQuery) -> Result<Page<affiliation::Model>, ServiceError> {
    let params = query.validate(DEFAULT_LIMIT)?;
    let select = affiliation::Entity::find()
        .filter(affiliation::Column::IsActive.eq(params.is_active.unwrap_or(true)));
    let select = match &params.search {
        Some(term) => select.filter(search_condition(
            &[affiliation::Column::Name, affiliation::Column::Acronym, affiliation::Column::Description],
            term,
        )),
        None => select,
    };
    let select = select
        .order_by(sort_column(params.sort_by.as_deref()), params.order())
        .order_by_asc(affiliation::Column::Name)
        .order_by_asc(affiliation::Column::CreatedAt)
        .order_by_asc(affiliation::Column::Id);
    fetch_page(db, select, &params).await
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<affiliation::Model, ServiceError> {
    guards::require::<affiliation::Entity, _>(db, id, "Affiliation").await
}

async fn ensure_unique<C: sea_orm::ConnectionTrait>(
    conn: &C,
    name: Option<&str>,
    acronym: Option<&str>,
    exclude: Option<Uuid>,
) -> Result<(), ServiceError> {
    let not_self = |cond: Condition| match exclude {
        Some(id) => cond.add(affiliation::Column::Id.ne(id)),
        None => cond,
    };
    if let Some(name) = name {
        let cond = not_self(Condition::all().add(affiliation::Column::Name.eq(name)));
        guards::ensure_absent::<affiliation::Entity, _>(conn, cond, NAME_TAKEN).await?;
    }
    if let Some(acronym) = acronym {
        let cond = not_self(Condition::all().add(affiliation::Column::Acronym.eq(acronym)));
        guards::ensure_absent::<affiliation::Entity, _>(conn, cond, ACRONYM_TAKEN).await?;
    }
    Ok(())
}

#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create(db: &DatabaseConnection, input: CreateAffiliation) -> Result<affiliation::Model, ServiceError> {
    Checks::from_derive(input.validate()).finish()?;
    let txn = db.begin().await?;
    ordering::lock(&txn, Collection::Affiliations).await?;
    ensure_unique(&txn, Some(&input.name), input.acronym.as_deref(), None).await?;
    let position = ordering::next_position::<affiliation::Entity, _>(&txn, None).await?;
    let now = crate::now();
    let created = affiliation::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name),
        acronym: Set(input.acronym),
        description: Set(input.description),
        sort_order: Set(position),
        is_active: Set(input.is_active.unwrap_or(true)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    info!(id = %created.id, sort_order = position, "affiliation created");
    Ok(created)
}

#[instrument(skip(db, input))]
pub async fn update(db: &DatabaseConnection, id: Uuid, input: UpdateAffiliation) -> Result<affiliation::Model, ServiceError> {
    input.check()?;
    let txn = db.begin().await?;
    let current = guards::require::<affiliation::Entity, _>(&txn, id, "Affiliation").await?;
    ensure_unique(&txn, input.name.as_deref(), input.acronym.clone().flatten().as_deref(), Some(id)).await?;
    let mut am: affiliation::ActiveModel = current.into();
    if let Some(v) = input.name { am.name = Set(v); }
    if let Some(v) = input.acronym { am.acronym = Set(v); }
    if let Some(v) = input.description { am.description = Set(v); }
    if let Some(v) = input.is_active { am.is_active = Set(v); }
    am.updated_at = Set(crate::now());
    let updated = am.update(&txn).await?;
    txn.commit().await?;
    Ok(updated)
}

#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let res = affiliation::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("Affiliation"));
    }
    info!(%id, "affiliation deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, unique};

    #[tokio::test]
    async fn name_and_acronym_are_unique() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let acronym = unique("I")[..10].to_uppercase();
        let a = create(
            &db,
            CreateAffiliation { name: unique("Institute"), acronym: Some(acronym.clone()), ..Default::default() },
        )
        .await?;
        let same_name = CreateAffiliation { name: a.name.clone(), ..Default::default() };
        assert!(matches!(create(&db, same_name).await.unwrap_err(), ServiceError::Conflict(_)));
        let same_acronym =
            CreateAffiliation { name: unique("Other"), acronym: Some(acronym.clone()), ..Default::default() };
        assert!(matches!(create(&db, same_acronym).await.unwrap_err(), ServiceError::Conflict(_)));

        // its own acronym is fine; clearing it too
        let keep = UpdateAffiliation { acronym: Some(Some(acronym)), ..Default::default() };
        update(&db, a.id, keep).await?;
        let cleared = update(&db, a.id, UpdateAffiliation { acronym: Some(None), ..Default::default() }).await?;
        assert_eq!(cleared.acronym, None);

        delete(&db, a.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn inactive_rows_are_hidden_by_default() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let name = unique("Dormant");
        let a = create(&db, CreateAffiliation { name: name.clone(), is_active: Some(false), ..Default::default() }).await?;
        let q = ListQuery { search: Some(name.clone()), ..Default::default() };
        assert_eq!(list(&db, &q).await?.meta.total, 0);
        let q = ListQuery { search: Some(name), is_active: Some("false".into()), ..Default::default() };
        assert_eq!(list(&db, &q).await?.meta.total, 1);
        delete(&db, a.id).await?;
        Ok(())
    }
}
