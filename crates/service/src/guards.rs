//! Existence and uniqueness checks used inside write transactions.

use sea_orm::{
    sea_query::IntoCondition, ConnectionTrait, EntityTrait, PaginatorTrait, PrimaryKeyTrait, QueryFilter,
};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Load a row by id or fail with `<label> not found`.
pub async fn require<E, C>(conn: &C, id: Uuid, label: &str) -> Result<E::Model, ServiceError>
where
    E: EntityTrait,
    C: ConnectionTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
{
    E::find_by_id(id).one(conn).await?.ok_or_else(|| ServiceError::not_found(label))
}

/// Conflict when any row matches `filter`.
pub async fn ensure_absent<E, C>(conn: &C, filter: impl IntoCondition, message: &str) -> Result<(), ServiceError>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    let existing = E::find().filter(filter).count(conn).await?;
    if existing > 0 {
        return Err(ServiceError::Conflict(message.to_string()));
    }
    Ok(())
}

/// Referenced row must exist; a dangling reference is a client error on `field`.
pub async fn ensure_reference<E, C>(conn: &C, id: Uuid, field: &str, label: &str) -> Result<(), ServiceError>
where
    E: EntityTrait,
    C: ConnectionTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
{
    if E::find_by_id(id).one(conn).await?.is_none() {
        return Err(ServiceError::invalid(field, format!("{label} not found")));
    }
    Ok(())
}
