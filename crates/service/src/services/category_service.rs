use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use models::{service, service_category};

use crate::{
    checks::Checks,
    errors::ServiceError,
    guards,
    input::{nullable_text, optional_text},
    ordering::{self, Collection},
};

const SLUG_TAKEN: &str = "A category with this slug already exists";

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategory {
    #[serde(default)]
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, deserialize_with = "optional_text")]
    #[validate(length(min = 10, max = 2000, message = "Description must be between 10 and 2000 characters"))]
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl CreateCategory {
    pub fn check(&self) -> Result<(), ServiceError> {
        let mut checks = Checks::from_derive(self.validate());
        checks.slug("slug", Some(&self.slug));
        checks.finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategory {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "nullable_text")]
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl UpdateCategory {
    pub fn check(&self) -> Result<(), ServiceError> {
        let mut checks = Checks::from_derive(self.validate());
        checks.slug("slug", self.slug.as_deref());
        checks.length("description", "Description", self.description.as_ref().and_then(|d| d.as_deref()), 10, 2000);
        checks.finish()
    }
}

/// All categories in display order.
pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<service_category::Model>, ServiceError> {
    Ok(service_category::Entity::find()
        .order_by_asc(service_category::Column::SortOrder)
        .order_by_asc(service_category::Column::Name)
        .order_by_asc(service_category::Column::Id)
        .all(db)
        .await?)
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<service_category::Model, ServiceError> {
    guards::require::<service_category::Entity, _>(db, id, "Category").await
}

#[instrument(skip(db, input), fields(slug = %input.slug))]
pub async fn create(db: &DatabaseConnection, input: CreateCategory) -> Result<service_category::Model, ServiceError> {
    input.check()?;
    let txn = db.begin().await?;
    ordering::lock(&txn, Collection::ServiceCategories).await?;
    guards::ensure_absent::<service_category::Entity, _>(
        &txn,
        service_category::Column::Slug.eq(input.slug.as_str()),
        SLUG_TAKEN,
    )
    .await?;
    let position = ordering::next_position::<service_category::Entity, _>(&txn, None).await?;
    let now = crate::now();
    let created = service_category::ActiveModel {
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
    txn.commit().await?;
    info!(id = %created.id, sort_order = position, "category created");
    Ok(created)
}

#[instrument(skip(db, input))]
pub async fn update(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateCategory,
) -> Result<service_category::Model, ServiceError> {
    input.check()?;
    let txn = db.begin().await?;
    let mut am: service_category::ActiveModel =
        guards::require::<service_category::Entity, _>(&txn, id, "Category").await?.into();
    if let Some(slug) = input.slug {
        guards::ensure_absent::<service_category::Entity, _>(
            &txn,
            service_category::Column::Slug.eq(slug.as_str()).and(service_category::Column::Id.ne(id)),
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
    txn.commit().await?;
    Ok(updated)
}

/// Refuses while services still reference the category.
#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    guards::require::<service_category::Entity, _>(db, id, "Category").await?;
    let in_use = service::Entity::find().filter(service::Column::CategoryId.eq(id)).count(db).await?;
    if in_use > 0 {
        return Err(ServiceError::Conflict(format!(
            "Cannot delete category: {in_use} service(s) still assigned to it"
        )));
    }
    service_category::Entity::delete_by_id(id).exec(db).await?;
    info!(%id, "category deleted");
    Ok(())
}
