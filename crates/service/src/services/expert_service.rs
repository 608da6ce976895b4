use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use models::expert;

use crate::{
    checks::Checks,
    errors::ServiceError,
    guards,
    input::{nullable_text, optional_text, string_list},
    ordering::{self, Collection},
    pagination::{fetch_page, search_condition, ListQuery, Page},
    storage::{ImageStore, PendingImage, UploadedImage},
};

pub const DEFAULT_LIMIT: u64 = 50;
const DUPLICATE: &str = "An expert with this name and title already exists";

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpert {
    #[serde(default)]
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 2, max = 150, message = "Title must be between 2 and 150 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 10, max = 1000, message = "Bio must be between 10 and 1000 characters"))]
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
    #[serde(default, deserialize_with = "optional_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub education: Option<Vec<String>>,
    #[serde(default, deserialize_with = "string_list")]
    pub specialties: Option<Vec<String>>,
    #[serde(default, deserialize_with = "string_list")]
    pub professional_membership: Option<Vec<String>>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub is_active: Option<bool>,
}

impl CreateExpert {
    pub fn check(&self, has_upload: bool) -> Result<(), ServiceError> {
        let mut checks = Checks::from_derive(self.validate());
        if self.image.is_none() && !has_upload {
            checks.push("image", "Image is required");
        }
        checks.url("linkedinUrl", self.linkedin_url.as_deref());
        checks.email("email", self.email.as_deref());
        checks.phone("phone", self.phone.as_deref());
        checks.list("education", self.education.as_deref(), 200);
        checks.list("specialties", self.specialties.as_deref(), 100);
        checks.list("professionalMembership", self.professional_membership.as_deref(), 200);
        checks.finish()
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpert {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 2, max = 150, message = "Title must be between 2 and 150 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 10, max = 1000, message = "Bio must be between 10 and 1000 characters"))]
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
    #[serde(default, deserialize_with = "nullable_text")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "string_list")]
    pub education: Option<Vec<String>>,
    #[serde(default, deserialize_with = "string_list")]
    pub specialties: Option<Vec<String>>,
    #[serde(default, deserialize_with = "string_list")]
    pub professional_membership: Option<Vec<String>>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub is_active: Option<bool>,
}

impl UpdateExpert {
    pub fn check(&self) -> Result<(), ServiceError> {
        let mut checks = Checks::from_derive(self.validate());
        checks.url("linkedinUrl", self.linkedin_url.clone().flatten().as_deref());
        checks.email("email", self.email.clone().flatten().as_deref());
        checks.phone("phone", self.phone.clone().flatten().as_deref());
        checks.list("education", self.education.as_deref(), 200);
        checks.list("specialties", self.specialties.as_deref(), 100);
        checks.list("professionalMembership", self.professional_membership.as_deref(), 200);
        checks.finish()
    }
}

fn sort_column(name: Option<&str>) -> expert::Column {
    match name {
        Some("name") => expert::Column::Name,
        Some("title") => expert::Column::Title,
        Some("createdAt") => expert::Column::CreatedAt,
        _ => expert::Column::SortOrder,
    }
}

#[instrument(skip(db))]
pub async fn list(db: &DatabaseConnection, query: &ListQuery) -> Result<Page<expert::Model>, ServiceError> {
    let params = query.validate(DEFAULT_LIMIT)?;
    let mut select = expert::Entity::find();
    if let Some(active) = params.is_active { select = select.filter(expert::Column::IsActive.eq(active)); }
    if let Some(term) = &params.search {
        select = select.filter(search_condition(&[expert::Column::Name, expert::Column::Title, expert::Column::Bio], term));
    }
    let select = select
        .order_by(sort_column(params.sort_by.as_deref()), params.order())
        .order_by_asc(expert::Column::Name)
        .order_by_asc(expert::Column::CreatedAt)
        .order_by_asc(expert::Column::Id);
    fetch_page(db, select, &params).await
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<expert::Model, ServiceError> {
    guards::require::<expert::Entity, _>(db, id, "Expert").await
}

#[instrument(skip(db, images, input, upload), fields(name = %input.name))]
pub async fn create(
    db: &DatabaseConnection,
    images: &dyn ImageStore,
    mut input: CreateExpert,
    upload: Option<UploadedImage>,
) -> Result<expert::Model, ServiceError> {
    input.check(upload.is_some())?;
    let image = PendingImage::resolve(images, upload, input.image.take()).await?;
    let result = insert(db, input, image.url().unwrap_or_default()).await;
    image.settle(images, result).await
}

async fn insert(db: &DatabaseConnection, input: CreateExpert, image: String) -> Result<expert::Model, ServiceError> {
    let txn = db.begin().await?;
    ordering::lock(&txn, Collection::Experts).await?;
    guards::ensure_absent::<expert::Entity, _>(
        &txn,
        expert::Column::Name.eq(input.name.as_str()).and(expert::Column::Title.eq(input.title.as_str())),
        DUPLICATE,
    )
    .await?;
    let position = ordering::next_position::<expert::Entity, _>(&txn, None).await?;
    let now = crate::now();
    let created = expert::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name),
        title: Set(input.title),
        bio: Set(input.bio),
        image: Set(image),
        location: Set(input.location),
        experience: Set(input.experience.unwrap_or(0)),
        projects_led: Set(input.projects_led.unwrap_or(0)),
        linkedin_url: Set(input.linkedin_url),
        email: Set(input.email),
        phone: Set(input.phone),
        education: Set(input.education.unwrap_or_default()),
        specialties: Set(input.specialties.unwrap_or_default()),
        professional_membership: Set(input.professional_membership.unwrap_or_default()),
        sort_order: Set(position),
        is_active: Set(input.is_active.unwrap_or(true)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    info!(id = %created.id, sort_order = position, "expert created");
    Ok(created)
}

#[instrument(skip(db, images, input, upload))]
pub async fn update(
    db: &DatabaseConnection,
    images: &dyn ImageStore,
    id: Uuid,
    mut input: UpdateExpert,
    upload: Option<UploadedImage>,
) -> Result<expert::Model, ServiceError> {
    input.check()?;
    let image = PendingImage::resolve(images, upload, input.image.take()).await?;
    let result = apply(db, id, input, image.url()).await;
    image.settle(images, result).await
}

async fn apply(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateExpert,
    image: Option<String>,
) -> Result<expert::Model, ServiceError> {
    let txn = db.begin().await?;
    let current = guards::require::<expert::Entity, _>(&txn, id, "Expert").await?;
    if input.name.is_some() || input.title.is_some() {
        let name = input.name.clone().unwrap_or_else(|| current.name.clone());
        let title = input.title.clone().unwrap_or_else(|| current.title.clone());
        guards::ensure_absent::<expert::Entity, _>(
            &txn,
            expert::Column::Name
                .eq(name)
                .and(expert::Column::Title.eq(title))
                .and(expert::Column::Id.ne(id)),
            DUPLICATE,
        )
        .await?;
    }
    let mut am: expert::ActiveModel = current.into();
    if let Some(v) = input.name { am.name = Set(v); }
    if let Some(v) = input.title { am.title = Set(v); }
    if let Some(v) = input.bio { am.bio = Set(v); }
    if let Some(v) = image { am.image = Set(v); }
    if let Some(v) = input.location { am.location = Set(v); }
    if let Some(v) = input.experience { am.experience = Set(v); }
    if let Some(v) = input.projects_led { am.projects_led = Set(v); }
    if let Some(v) = input.linkedin_url { am.linkedin_url = Set(v); }
    if let Some(v) = input.email { am.email = Set(v); }
    if let Some(v) = input.phone { am.phone = Set(v); }
    if let Some(v) = input.education { am.education = Set(v); }
    if let Some(v) = input.specialties { am.specialties = Set(v); }
    if let Some(v) = input.professional_membership { am.professional_membership = Set(v); }
    if let Some(v) = input.is_active { am.is_active = Set(v); }
    am.updated_at = Set(crate::now());
    let updated = am.update(&txn).await?;
    txn.commit().await?;
    Ok(updated)
}

/// Also drops the expert's service and industry assignments.
#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let res = expert::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("Expert"));
    }
    info!(%id, "expert deleted");
    Ok(())
}

pub async fn toggle_status(db: &DatabaseConnection, id: Uuid) -> Result<expert::Model, ServiceError> {
    let current = get(db, id).await?;
    let active = !current.is_active;
    let mut am: expert::ActiveModel = current.into();
    am.is_active = Set(active);
    am.updated_at = Set(crate::now());
    Ok(am.update(db).await?)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ordering::ReorderPlan;
    use crate::pagination::ListQuery;
    use crate::storage::LocalImageStore;
    use crate::test_support::{get_db, unique};
    use serde_json::json;

    pub(crate) fn store() -> LocalImageStore {
        LocalImageStore::new(std::env::temp_dir().join("cms-test-uploads"), "/uploads", 1024 * 1024)
    }

    pub(crate) fn sample(name: &str) -> CreateExpert {
        CreateExpert {
            name: name.into(),
            title: "Partner, Audit".into(),
            bio: "Leads statutory audits for listed banks.".into(),
            image: Some("https://cdn.example.com/experts/a.jpg".into()),
            location: "Lagos".into(),
            experience: Some(12),
            ..Default::default()
        }
    }

    pub(crate) async fn create_expert(db: &DatabaseConnection) -> Result<expert::Model, ServiceError> {
        create(db, &store(), sample(&unique("Ada")), None).await
    }

    #[test]
    fn multipart_style_values_are_accepted() {
        let input: CreateExpert = serde_json::from_value(json!({
            "name": "Ada Obi",
            "title": "Partner",
            "bio": "Leads statutory audits.",
            "location": "Lagos",
            "experience": "12",
            "projectsLed": 40,
            "isActive": "false",
            "specialties": "[\"IFRS\",\"Banking\"]",
            "education": "MBA",
        }))
        .unwrap();
        assert_eq!(input.experience, Some(12));
        assert_eq!(input.projects_led, Some(40));
        assert_eq!(input.is_active, Some(false));
        assert_eq!(input.specialties, Some(vec!["IFRS".into(), "Banking".into()]));
        assert_eq!(input.education, Some(vec!["MBA".into()]));
        // image is still missing
        let ServiceError::Validation(issues) = input.check(false).unwrap_err() else { panic!() };
        assert_eq!(issues[0].field, "image");
        assert!(input.check(true).is_ok());
    }

    #[test]
    fn field_bounds_are_enforced() {
        let mut input = sample("A");
        input.experience = Some(51);
        input.linkedin_url = Some("not a url".into());
        input.email = Some("nobody".into());
        let ServiceError::Validation(issues) = input.check(false).unwrap_err() else { panic!() };
        let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "experience", "linkedinUrl", "name"]);
    }

    #[tokio::test]
    async fn duplicate_name_title_conflicts() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let a = create_expert(&db).await?;
        let err = create(&db, &store(), sample(&a.name), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let b = create_expert(&db).await?;
        let rename = UpdateExpert { name: Some(a.name.clone()), ..Default::default() };
        let err = update(&db, &store(), b.id, rename, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        delete(&db, a.id).await?;
        delete(&db, b.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn reorder_then_list_by_position() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let tag = unique("Order");
        let mut ids = Vec::new();
        for suffix in ["a", "b", "c"] {
            ids.push(create(&db, &store(), sample(&format!("{tag}-{suffix}")), None).await?.id);
        }
        let wanted = vec![ids[2], ids[0], ids[1]];
        ordering::reorder::<expert::Entity>(&db, &ReorderPlan::new("expertIds", wanted.clone())?).await?;

        let q = ListQuery { search: Some(tag.clone()), sort_by: Some("sortOrder".into()), ..Default::default() };
        let listed: Vec<Uuid> = list(&db, &q).await?.items.into_iter().map(|e| e.id).collect();
        assert_eq!(listed, wanted);

        // unknown sortBy falls back to the position order
        let q = ListQuery { search: Some(tag.clone()), sort_by: Some("bogus".into()), ..Default::default() };
        let listed: Vec<Uuid> = list(&db, &q).await?.items.into_iter().map(|e| e.id).collect();
        assert_eq!(listed, wanted);

        for id in ids {
            delete(&db, id).await?;
        }
        Ok(())
    }

    #[tokio::test]
    async fn patch_clears_nullable_fields_and_keeps_arrays() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let mut input = sample(&unique("Nkem"));
        input.email = Some("nkem@example.com".into());
        input.specialties = Some(vec!["IFRS".into()]);
        let created = create(&db, &store(), input, None).await?;
        let patch: UpdateExpert = serde_json::from_value(json!({"email": "", "experience": "7"}))?;
        let updated = update(&db, &store(), created.id, patch, None).await?;
        assert_eq!(updated.email, None);
        assert_eq!(updated.experience, 7);
        assert_eq!(updated.specialties, vec!["IFRS".to_string()]);
        delete(&db, created.id).await?;
        Ok(())
    }
}
