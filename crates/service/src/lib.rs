//! Business operations for the CMS resources.
//! - Request DTOs are validated here, before anything touches the database.
//! - Multi-step writes run in one transaction; ordering writes also take the
//!   collection's advisory lock (see [`ordering`]).
//! - Handlers map [`errors::ServiceError`] onto HTTP responses.

pub mod errors;
pub mod checks;
pub mod guards;
pub mod input;
pub mod ordering;
pub mod pagination;
pub mod relation_service;
pub mod storage;
pub mod services;
#[cfg(test)]
pub mod test_support;

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;

pub use errors::{FieldIssue, ServiceError};

pub(crate) fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}
