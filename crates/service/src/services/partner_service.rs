use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use models::partner;

use crate::{
    checks::Checks,
    errors::ServiceError,
    guards,
    input::optional_text,
    ordering::{self, Collection},
    pagination::{fetch_page, search_condition, ListQuery, Page},
    storage::{ImageStore, PendingImage, UploadedImage},
};

pub const DEFAULT_LIMIT: u64 = 50;

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PartnerInput {
    #[serde(default, deserialize_with = "optional_text")]
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    #[validate(length(max = 500, message = "Image URL must be at most 500 characters"))]
    pub image: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub is_active: Option<bool>,
}

fn sort_column(name: Option<&str>) -> partner::Column {
    match name {
        Some("name") => partner::Column::Name,
        Some("createdAt") => partner::Column::CreatedAt,
        _ => partner::Column::SortOrder,
    }
}

#[instrument(skip(db))]
pub async fn list(db: &DatabaseConnection, query: &ListQuery) -> Result<Page<partner::Model>, ServiceError> {
    let params = query.validate(DEFAULT_LIMIT)?;
    let mut select = partner::Entity::find();
    if let Some(active) = params.is_active { select = select.filter(partner::Column::IsActive.eq(active)); }
    if let Some(term) = &params.search {
        select = select.filter(search_condition(&[partner::Column::Name], term));
    }
    let select = select
        .order_by(sort_column(params.sort_by.as_deref()), params.order())
        .order_by_asc(partner::Column::Name)
        .order_by_asc(partner::Column::CreatedAt)
        .order_by_asc(partner::Column::Id);
    fetch_page(db, select, &params).await
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<partner::Model, ServiceError> {
    guards::require::<partner::Entity, _>(db, id, "Partner").await
}

/// Name and logo are both required on create.
#[instrument(skip(db, images, input, upload))]
pub async fn create(
    db: &DatabaseConnection,
    images: &dyn ImageStore,
    mut input: PartnerInput,
    upload: Option<UploadedImage>,
) -> Result<partner::Model, ServiceError> {
    let mut checks = Checks::from_derive(input.validate());
    if input.name.is_none() {
        checks.push("name", "Name is required");
    }
    if input.image.is_none() && upload.is_none() {
        checks.push("image", "Partner image is required");
    }
    checks.finish()?;
    let image = PendingImage::resolve(images, upload, input.image.take()).await?;
    let result = insert(db, input, image.url().unwrap_or_default()).await;
    image.settle(images, result).await
}

async fn insert(db: &DatabaseConnection, input: PartnerInput, image: String) -> Result<partner::Model, ServiceError> {
    let txn = db.begin().await?;
    ordering::lock(&txn, Collection::Partners).await?;
    let position = ordering::next_position::<partner::Entity, _>(&txn, None).await?;
    let now = crate::now();
    let created = partner::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name.unwrap_or_default()),
        image: Set(image),
        sort_order: Set(position),
        is_active: Set(input.is_active.unwrap_or(true)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    info!(id = %created.id, sort_order = position, "partner created");
    Ok(created)
}

#[instrument(skip(db, images, input, upload))]
pub async fn update(
    db: &DatabaseConnection,
    images: &dyn ImageStore,
    id: Uuid,
    mut input: PartnerInput,
    upload: Option<UploadedImage>,
) -> Result<partner::Model, ServiceError> {
    Checks::from_derive(input.validate()).finish()?;
    let image = PendingImage::resolve(images, upload, input.image.take()).await?;
    let result = apply(db, id, input, image.url()).await;
    image.settle(images, result).await
}

async fn apply(
    db: &DatabaseConnection,
    id: Uuid,
    input: PartnerInput,
    image: Option<String>,
) -> Result<partner::Model, ServiceError> {
    let current = get(db, id).await?;
    let mut am: partner::ActiveModel = current.into();
    if let Some(v) = input.name { am.name = Set(v); }
    if let Some(v) = image { am.image = Set(v); }
    if let Some(v) = input.is_active { am.is_active = Set(v); }
    am.updated_at = Set(crate::now());
    Ok(am.update(db).await?)
}

#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let res = partner::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("Partner"));
    }
    info!(%id, "partner deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::expert_service::tests::store;
    use crate::storage::UploadedImage;
    use crate::test_support::get_db;

    #[test]
    fn form_text_values_are_decoded() {
        let input: PartnerInput =
            serde_json::from_value(serde_json::json!({"name": "Northwind", "image": "", "isActive": "false"})).unwrap();
        assert_eq!(input.image, None);
        assert_eq!(input.is_active, Some(false));
        assert!(Checks::from_derive(input.validate()).finish().is_ok());
    }

    #[tokio::test]
    async fn uploaded_logo_wins_over_url() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let upload = UploadedImage {
            field: "image".into(),
            file_name: Some("logo.png".into()),
            content_type: "image/png".into(),
            bytes: vec![1, 2, 3],
        };
        let input = PartnerInput {
            name: Some("Northwind".into()),
            image: Some("https://example.com/ignored.png".into()),
            is_active: None,
        };
        let created = create(&db, &store(), input, Some(upload)).await?;
        assert!(created.image.starts_with("/uploads/"));
        assert!(created.image.ends_with(".png"));
        assert!(created.is_active);

        let err = create(&db, &store(), PartnerInput { name: Some("Nologo".into()), ..Default::default() }, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        delete(&db, created.id).await?;
        Ok(())
    }
}
