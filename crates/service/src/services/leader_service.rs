use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use models::leader;

use crate::{
    checks::Checks,
    errors::ServiceError,
    guards,
    input::{nullable_text, optional_text, string_list},
    ordering::{self, Collection},
    pagination::{fetch_page, search_condition, ListQuery, Page},
    storage::{ImageStore, PendingImage, UploadedImage},
};

pub const DEFAULT_LIMIT: u64 = 20;
const DUPLICATE: &str = "A leader with this name and title already exists";

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeader {
    #[serde(default)]
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 2, max = 150, message = "Title must be between 2 and 150 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 2, max = 100, message = "Department must be between 2 and 100 characters"))]
    pub department: String,
    #[serde(default)]
    #[validate(length(min = 50, max = 1000, message = "Bio must be between 50 and 1000 characters"))]
    pub bio: String,
    #[serde(default, deserialize_with = "optional_text")]
    #[validate(length(max = 500, message = "Image URL must be at most 500 characters"))]
    pub image: Option<String>,
    #[serde(default)]
    #[validate(length(min = 2, max = 100, message = "Location must be between 2 and 100 characters"))]
    pub location: String,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[validate(range(min = 0, max = 50, message = "Experience must be between 0 and 50 years"))]
    pub experience: Option<i32>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[validate(range(min = 0, max = 1000, message = "Projects led must be between 0 and 1000"))]
    pub projects_led: Option<i32>,
    #[serde(default, deserialize_with = "optional_text")]
    pub linkedin_url: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub credentials: Option<Vec<String>>,
    #[serde(default, deserialize_with = "string_list")]
    pub specialties: Option<Vec<String>>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub is_active: Option<bool>,
}

impl CreateLeader {
    pub fn check(&self, has_upload: bool) -> Result<(), ServiceError> {
        let mut checks = Checks::from_derive(self.validate());
        if self.image.is_none() && !has_upload {
            checks.push("image", "Image is required");
        }
        checks.url("linkedinUrl", self.linkedin_url.as_deref());
        checks.email("email", self.email.as_deref());
        checks.list("credentials", self.credentials.as_deref(), 100);
        checks.list("specialties", self.specialties.as_deref(), 100);
        checks.finish()
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeader {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 2, max = 150, message = "Title must be between 2 and 150 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 2, max = 100, message = "Department must be between 2 and 100 characters"))]
    pub department: Option<String>,
    #[validate(length(min = 50, max = 1000, message = "Bio must be between 50 and 1000 characters"))]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    #[validate(length(max = 500, message = "Image URL must be at most 500 characters"))]
    pub image: Option<String>,
    #[validate(length(min = 2, max = 100, message = "Location must be between 2 and 100 characters"))]
    pub location: Option<String>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[validate(range(min = 0, max = 50, message = "Experience must be between 0 and 50 years"))]
    pub experience: Option<i32>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[validate(range(min = 0, max = 1000, message = "Projects led must be between 0 and 1000"))]
    pub projects_led: Option<i32>,
    #[serde(default, deserialize_with = "nullable_text")]
    pub linkedin_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable_text")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "string_list")]
    pub credentials: Option<Vec<String>>,
    #[serde(default, deserialize_with = "string_list")]
    pub specialties: Option<Vec<String>>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub is_active: Option<bool>,
}

impl UpdateLeader {
    pub fn check(&self) -> Result<(), ServiceError> {
        let mut checks = Checks::from_derive(self.validate());
        checks.url("linkedinUrl", self.linkedin_url.clone().flatten().as_deref());
        checks.email("email", self.email.clone().flatten().as_deref());
        checks.list("credentials", self.credentials.as_deref(), 100);
        checks.list("specialties", self.specialties.as_deref(), 100);
        checks.finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderQuery {
    #[serde(flatten)]
    pub list: ListQuery,
    pub department: Option<String>,
}

fn sort_column(name: Option<&str>) -> leader::Column {
    match name {
        Some("name") => leader::Column::Name,
        Some("title") => leader::Column::Title,
        Some("department") => leader::Column::Department,
        Some("experience") => leader::Column::Experience,
        Some("createdAt") => leader::Column::CreatedAt,
        _ => leader::Column::SortOrder,
    }
}

#[instrument(skip(db))]
pub async fn list(db: &DatabaseConnection, query: &LeaderQuery) -> Result<Page<leader::Model>, ServiceError> {
    let params = query.list.validate(DEFAULT_LIMIT)?;
    let mut select = leader::Entity::find();
    if let Some(active) = params.is_active { select = select.filter(leader::Column::IsActive.eq(active)); }
    if let Some(dept) = query.department.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        select = select.filter(leader::Column::Department.eq(dept));
    }
    if let Some(term) = &params.search {
        select = select.filter(search_condition(&[leader::Column::Name, leader::Column::Title, leader::Column::Bio], term));
    }
    let select = select
        .order_by(sort_column(params.sort_by.as_deref()), params.order())
        .order_by_asc(leader::Column::Name)
        .order_by_asc(leader::Column::CreatedAt)
        .order_by_asc(leader::Column::Id);
    fetch_page(db, select, &params).await
}

/// Distinct non-empty departments, alphabetically.
pub async fn departments(db: &DatabaseConnection) -> Result<Vec<String>, ServiceError> {
    let rows: Vec<String> = leader::Entity::find()
        .select_only()
        .column(leader::Column::Department)
        .distinct()
        .filter(leader::Column::Department.ne(""))
        .order_by_asc(leader::Column::Department)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows)
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<leader::Model, ServiceError> {
    guards::require::<leader::Entity, _>(db, id, "Leader").await
}

#[instrument(skip(db, images, input, upload), fields(name = %input.name))]
pub async fn create(
    db: &DatabaseConnection,
    images: &dyn ImageStore,
    mut input: CreateLeader,
    upload: Option<UploadedImage>,
) -> Result<leader::Model, ServiceError> {
    input.check(upload.is_some())?;
    let image = PendingImage::resolve(images, upload, input.image.take()).await?;
    let result = insert(db, input, image.url().unwrap_or_default()).await;
    image.settle(images, result).await
}

async fn insert(db: &DatabaseConnection, input: CreateLeader, image: String) -> Result<leader::Model, ServiceError> {
    let txn = db.begin().await?;
    ordering::lock(&txn, Collection::Leaders).await?;
    guards::ensure_absent::<leader::Entity, _>(
        &txn,
        leader::Column::Name.eq(input.name.as_str()).and(leader::Column::Title.eq(input.title.as_str())),
        DUPLICATE,
    )
    .await?;
    let position = ordering::next_position::<leader::Entity, _>(&txn, None).await?;
    let now = crate::now();
    let created = leader::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name),
        title: Set(input.title),
        department: Set(input.department),
        bio: Set(input.bio),
        image: Set(image),
        location: Set(input.location),
        experience: Set(input.experience.unwrap_or(0)),
        projects_led: Set(input.projects_led.unwrap_or(0)),
        linkedin_url: Set(input.linkedin_url),
        email: Set(input.email),
        credentials: Set(input.credentials.unwrap_or_default()),
        specialties: Set(input.specialties.unwrap_or_default()),
        sort_order: Set(position),
        is_active: Set(input.is_active.unwrap_or(true)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    info!(id = %created.id, sort_order = position, "leader created");
    Ok(created)
}

#[instrument(skip(db, images, input, upload))]
pub async fn update(
    db: &DatabaseConnection,
    images: &dyn ImageStore,
    id: Uuid,
    mut input: UpdateLeader,
    upload: Option<UploadedImage>,
) -> Result<leader::Model, ServiceError> {
    input.check()?;
    let image = PendingImage::resolve(images, upload, input.image.take()).await?;
    let result = apply(db, id, input, image.url()).await;
    image.settle(images, result).await
}

async fn apply(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateLeader,
    image: Option<String>,
) -> Result<leader::Model, ServiceError> {
    let txn = db.begin().await?;
    let current = guards::require::<leader::Entity, _>(&txn, id, "Leader").await?;
    if input.name.is_some() || input.title.is_some() {
        let name = input.name.clone().unwrap_or_else(|| current.name.clone());
        let title = input.title.clone().unwrap_or_else(|| current.title.clone());
        guards::ensure_absent::<leader::Entity, _>(
            &txn,
            leader::Column::Name
                .eq(name)
                .and(leader::Column::Title.eq(title))
                .and(leader::Column::Id.ne(id)),
            DUPLICATE,
        )
        .await?;
    }
    let mut am: leader::ActiveModel = current.into();
    if let Some(v) = input.name { am.name = Set(v); }
    if let Some(v) = input.title { am.title = Set(v); }
    if let Some(v) = input.department { am.department = Set(v); }
    if let Some(v) = input.bio { am.bio = Set(v); }
    if let Some(v) = image { am.image = Set(v); }
    if let Some(v) = input.location { am.location = Set(v); }
    if let Some(v) = input.experience { am.experience = Set(v); }
    if let Some(v) = input.projects_led { am.projects_led = Set(v); }
    if let Some(v) = input.linkedin_url { am.linkedin_url = Set(v); }
    if let Some(v) = input.email { am.email = Set(v); }
    if let Some(v) = input.credentials { am.credentials = Set(v); }
    if let Some(v) = input.specialties { am.specialties = Set(v); }
    if let Some(v) = input.is_active { am.is_active = Set(v); }
    am.updated_at = Set(crate::now());
    let updated = am.update(&txn).await?;
    txn.commit().await?;
    Ok(updated)
}

#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let res = leader::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("Leader"));
    }
    info!(%id, "leader deleted");
    Ok(())
}

pub async fn toggle_status(db: &DatabaseConnection, id: Uuid) -> Result<leader::Model, ServiceError> {
    let current = get(db, id).await?;
    let active = !current.is_active;
    let mut am: leader::ActiveModel = current.into();
    am.is_active = Set(active);
    am.updated_at = Set(crate::now());
    Ok(am.update(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::expert_service::tests::store;
    use crate::test_support::{get_db, unique};

    const BIO: &str = "Thirty years in assurance, formerly head of audit quality for West Africa.";

    fn sample(name: &str, department: &str) -> CreateLeader {
        CreateLeader {
            name: name.into(),
            title: "Managing Partner".into(),
            department: department.into(),
            bio: BIO.into(),
            image: Some("/uploads/leader.png".into()),
            location: "Abuja".into(),
            credentials: Some(vec!["FCA".into()]),
            ..Default::default()
        }
    }

    #[test]
    fn leader_bio_has_a_higher_floor_than_expert_bio() {
        let mut input = sample("Chidi Eze", "Audit");
        input.bio = "Too short for a leader bio.".into();
        let ServiceError::Validation(issues) = input.check(false).unwrap_err() else { panic!() };
        assert_eq!(issues[0].field, "bio");
    }

    #[tokio::test]
    async fn departments_are_distinct_and_filterable() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let dept = unique("Dept");
        let a = create(&db, &store(), sample(&unique("Ngozi"), &dept), None).await?;
        let b = create(&db, &store(), sample(&unique("Tunde"), &dept), None).await?;
        let all = departments(&db).await?;
        assert_eq!(all.iter().filter(|d| **d == dept).count(), 1);

        let q = LeaderQuery { department: Some(dept.clone()), ..Default::default() };
        let page = list(&db, &q).await?;
        assert_eq!(page.meta.total, 2);

        let err = create(&db, &store(), sample(&a.name, "Tax"), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        delete(&db, a.id).await?;
        delete(&db, b.id).await?;
        Ok(())
    }
}
