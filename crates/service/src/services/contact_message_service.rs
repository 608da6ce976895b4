use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use models::{contact_message, validation::is_service_interest};

use crate::{
    checks::Checks,
    errors::ServiceError,
    guards,
    input::optional_text,
    pagination::{self, fetch_page, parse_bool, search_condition, ListQuery, Page},
};

pub const DEFAULT_LIMIT: u64 = 20;

fn service_interest(value: &str) -> Result<(), ValidationError> {
    if is_service_interest(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("service_interest");
        err.message = Some("Please select a valid service interest".into());
        Err(err)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactMessage {
    #[serde(default)]
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(
        email(message = "Please provide a valid email address"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,
    #[serde(default, deserialize_with = "optional_text")]
    pub phone: Option<String>,
    #[serde(default)]
    #[validate(length(min = 2, max = 200, message = "Company must be between 2 and 200 characters"))]
    pub company: String,
    #[serde(default)]
    #[validate(length(min = 5, max = 200, message = "Subject must be between 5 and 200 characters"))]
    pub subject: String,
    #[serde(default)]
    #[validate(custom(function = "service_interest"))]
    pub service_interest: String,
    #[serde(default)]
    #[validate(length(min = 10, max = 2000, message = "Message must be between 10 and 2000 characters"))]
    pub message: String,
}

impl CreateContactMessage {
    pub fn check(&self) -> Result<(), ServiceError> {
        let mut checks = Checks::from_derive(self.validate());
        checks.phone("phone", self.phone.as_deref());
        checks.finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactMessage {
    pub responded: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessageQuery {
    #[serde(flatten)]
    pub list: ListQuery,
    pub responded: Option<String>,
}

fn sort_column(name: Option<&str>) -> contact_message::Column {
    match name {
        Some("name") => contact_message::Column::Name,
        Some("email") => contact_message::Column::Email,
        Some("subject") => contact_message::Column::Subject,
        _ => contact_message::Column::CreatedAt,
    }
}

/// Newest first unless the caller asks for another order.
#[instrument(skip(db))]
pub async fn list(
    db: &DatabaseConnection,
    query: &ContactMessageQuery,
) -> Result<Page<contact_message::Model>, ServiceError> {
    let mut issues = Vec::new();
    let params = query.list.collect(DEFAULT_LIMIT, &mut issues);
    let responded = parse_bool("responded", query.responded.as_deref(), &mut issues);
    let params = pagination::finish(params, issues)?;
    let order = if query.list.sort_order.is_none() { Order::Desc } else { params.order() };

    let mut select = contact_message::Entity::find();
    if let Some(r) = responded { select = select.filter(contact_message::Column::Responded.eq(r)); }
    if let Some(term) = &params.search {
        select = select.filter(search_condition(
            &[
                contact_message::Column::Name,
                contact_message::Column::Email,
                contact_message::Column::Subject,
                contact_message::Column::Message,
            ],
            term,
        ));
    }
    let select = select
        .order_by(sort_column(params.sort_by.as_deref()), order)
        .order_by_desc(contact_message::Column::CreatedAt)
        .order_by_asc(contact_message::Column::Id);
    fetch_page(db, select, &params).await
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<contact_message::Model, ServiceError> {
    guards::require::<contact_message::Entity, _>(db, id, "Contact message").await
}

#[instrument(skip(db, input), fields(interest = %input.service_interest))]
pub async fn create(db: &DatabaseConnection, input: CreateContactMessage) -> Result<contact_message::Model, ServiceError> {
    input.check()?;
    let now = crate::now();
    let created = contact_message::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name),
        email: Set(input.email),
        phone: Set(input.phone),
        company: Set(input.company),
        subject: Set(input.subject),
        service_interest: Set(input.service_interest),
        message: Set(input.message),
        responded: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(id = %created.id, "contact message received");
    Ok(created)
}

pub async fn update(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateContactMessage,
) -> Result<contact_message::Model, ServiceError> {
    let current = get(db, id).await?;
    let mut am: contact_message::ActiveModel = current.into();
    if let Some(v) = input.responded { am.responded = Set(v); }
    am.updated_at = Set(crate::now());
    Ok(am.update(db).await?)
}

#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let res = contact_message::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("Contact message"));
    }
    info!(%id, "contact message deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    fn sample() -> CreateContactMessage {
        CreateContactMessage {
            name: "Bola Ade".into(),
            email: "bola@example.com".into(),
            phone: Some("+2348012345678".into()),
            company: "Ade Holdings".into(),
            subject: "Audit engagement".into(),
            service_interest: "Audit Services".into(),
            message: "We need a statutory audit for FY2025.".into(),
        }
    }

    #[test]
    fn accepts_a_complete_message() {
        assert!(sample().check().is_ok());
    }

    #[test]
    fn rejects_unknown_interest_bad_phone_and_email() {
        let input = CreateContactMessage {
            email: "not-an-email".into(),
            phone: Some("0123".into()),
            service_interest: "Payroll".into(),
            ..sample()
        };
        let ServiceError::Validation(issues) = input.check().unwrap_err() else { panic!() };
        let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "phone", "serviceInterest"]);
        assert_eq!(issues[2].message, "Please select a valid service interest");
    }

    #[tokio::test]
    async fn responded_flag_round_trip() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else { return Ok(()) };
        let created = create(&db, sample()).await?;
        assert!(!created.responded);
        let updated = update(&db, created.id, UpdateContactMessage { responded: Some(true) }).await?;
        assert!(updated.responded);
        let page = list(&db, &ContactMessageQuery { responded: Some("true".into()), ..Default::default() }).await?;
        assert!(page.items.iter().all(|m| m.responded));
        delete(&db, created.id).await?;
        assert!(matches!(get(&db, created.id).await.unwrap_err(), ServiceError::NotFound(_)));
        Ok(())
    }
}
