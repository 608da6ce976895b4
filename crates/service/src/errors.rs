use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

/// One failed field constraint, reported back to the client as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed")]
    Validation(Vec<FieldIssue>),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldIssue::new(field, message)])
    }
}

impl From<DbErr> for ServiceError {
    fn from(e: DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => Self::Conflict(conflict_message(&detail).into()),
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                Self::Conflict("record is still referenced by other records".into())
            }
            _ => Self::Db(e.to_string()),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        let mut issues = Vec::new();
        flatten(&errors, "", &mut issues);
        issues.sort_by(|a, b| a.field.cmp(&b.field));
        Self::Validation(issues)
    }
}

/// Human message for a unique-index violation, keyed on the index name.
fn conflict_message(detail: &str) -> &'static str {
    if detail.contains("slug") {
        "a record with this slug already exists"
    } else if detail.contains("name_title") {
        "a record with this name and title already exists"
    } else if detail.contains("acronym") {
        "an affiliation with this acronym already exists"
    } else if detail.contains("name") {
        "a record with this name already exists"
    } else {
        "record already exists"
    }
}

fn flatten(errors: &ValidationErrors, prefix: &str, out: &mut Vec<FieldIssue>) {
    for (field, kind) in errors.errors() {
        let name = camel_case(&field.to_string());
        let path = if prefix.is_empty() { name } else { format!("{prefix}.{name}") };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                for e in errs {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid ({})", path, e.code));
                    out.push(FieldIssue::new(path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(inner) => flatten(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    flatten(inner, &format!("{path}[{idx}]"), out);
                }
            }
        }
    }
}

/// `projects_led` -> `projectsLed`, matching the JSON field names.
fn camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper = false;
    for ch in snake.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
        full_name: String,
        #[validate(range(min = 0, max = 50))]
        years_active: i32,
    }

    #[test]
    fn validation_errors_become_camel_case_field_issues() {
        let err: ServiceError = Sample { full_name: "x".into(), years_active: 99 }
            .validate()
            .unwrap_err()
            .into();
        let ServiceError::Validation(issues) = err else { panic!("expected validation error") };
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0], FieldIssue::new("fullName", "Name must be at least 2 characters"));
        assert_eq!(issues[1].field, "yearsActive");
        assert!(issues[1].message.contains("range"));
    }

    #[test]
    fn camel_case_conversion() {
        assert_eq!(camel_case("linkedin_url"), "linkedinUrl");
        assert_eq!(camel_case("name"), "name");
    }

    #[test]
    fn conflict_messages_follow_index_names() {
        assert_eq!(conflict_message("uniq_industries_slug"), "a record with this slug already exists");
        assert_eq!(
            conflict_message("duplicate key value violates unique constraint \"uniq_experts_name_title\""),
            "a record with this name and title already exists"
        );
    }

    #[test]
    fn plain_db_errors_stay_db_errors() {
        let err: ServiceError = DbErr::Custom("boom".into()).into();
        assert!(matches!(err, ServiceError::Db(_)));
    }
}
