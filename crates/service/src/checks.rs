//! Field checks that the `validator` derive cannot express on its own:
//! nullable patch fields, slugs and the contact phone pattern.

use validator::{ValidateEmail, ValidateUrl, ValidationErrors};

use models::errors::ModelError;
use models::validation::{validate_slug, PHONE_RE};

use crate::errors::{FieldIssue, ServiceError};

#[derive(Debug, Default)]
pub struct Checks {
    issues: Vec<FieldIssue>,
}

impl Checks {
    /// Start from the outcome of a derived `Validate::validate()`.
    pub fn from_derive(result: Result<(), ValidationErrors>) -> Self {
        match result {
            Ok(()) => Self::default(),
            Err(errors) => match ServiceError::from(errors) {
                ServiceError::Validation(issues) => Self { issues },
                _ => Self::default(),
            },
        }
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.issues.push(FieldIssue::new(field, message));
    }

    pub fn length(&mut self, field: &str, label: &str, value: Option<&str>, min: usize, max: usize) {
        if let Some(v) = value {
            let n = v.chars().count();
            if n < min || n > max {
                self.push(field, format!("{label} must be between {min} and {max} characters"));
            }
        }
    }

    pub fn url(&mut self, field: &str, value: Option<&str>) {
        if let Some(v) = value {
            if !v.validate_url() {
                self.push(field, "Must be a valid URL");
            }
        }
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) {
        if let Some(v) = value {
            if !v.validate_email() {
                self.push(field, "Must be a valid email address");
            } else if v.len() > 255 {
                self.push(field, "Email must be at most 255 characters");
            }
        }
    }

    pub fn phone(&mut self, field: &str, value: Option<&str>) {
        if let Some(v) = value {
            if !PHONE_RE.is_match(v) {
                self.push(field, "Phone must contain up to 16 digits with an optional leading +");
            }
        }
    }

    pub fn slug(&mut self, field: &str, value: Option<&str>) {
        if let Some(Err(ModelError::Validation(msg))) = value.map(validate_slug) {
            self.push(field, msg);
        }
    }

    /// Each list entry must be non-empty and at most `max` characters.
    pub fn list(&mut self, field: &str, values: Option<&[String]>, max: usize) {
        for (idx, v) in values.unwrap_or_default().iter().enumerate() {
            if v.chars().count() > max {
                self.push(&format!("{field}[{idx}]"), format!("Entries must be at most {max} characters"));
            }
        }
    }

    pub fn finish(mut self) -> Result<(), ServiceError> {
        if self.issues.is_empty() {
            return Ok(());
        }
        self.issues.sort_by(|a, b| a.field.cmp(&b.field));
        Err(ServiceError::Validation(self.issues))
    }
}
