//! Shared field rules used by request validation.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ModelError;

/// Lowercase letters, digits and hyphens.
pub static SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9-]+$").expect("slug regex"));

/// Optional leading `+`, then up to 16 digits not starting with 0.
pub static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[1-9]\d{0,15}$").expect("phone regex"));

pub const SERVICE_INTERESTS: [&str; 8] = [
    "Audit Services",
    "Tax Advisory",
    "Business Consulting",
    "Financial Planning",
    "Risk Management",
    "ESG Consulting",
    "Digital Transformation",
    "Other",
];

pub fn validate_slug(slug: &str) -> Result<(), ModelError> {
    if !(2..=100).contains(&slug.chars().count()) {
        return Err(ModelError::Validation("Slug must be between 2 and 100 characters".into()));
    }
    if !SLUG_RE.is_match(slug) {
        return Err(ModelError::Validation(
            "Slug may only contain lowercase letters, numbers and hyphens".into(),
        ));
    }
    Ok(())
}

pub fn is_service_interest(value: &str) -> bool {
    SERVICE_INTERESTS.contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_rules() {
        assert!(validate_slug("audit-services").is_ok());
        assert!(validate_slug("a").is_err());
        assert!(validate_slug("Audit").is_err());
        assert!(validate_slug("tax advisory").is_err());
    }

    #[test]
    fn phone_pattern() {
        assert!(PHONE_RE.is_match("+2348012345678"));
        assert!(PHONE_RE.is_match("8012345678"));
        assert!(!PHONE_RE.is_match("0801"));
        assert!(!PHONE_RE.is_match("+12345678901234567"));
    }

    #[test]
    fn service_interest_is_a_closed_list() {
        assert!(is_service_interest("Tax Advisory"));
        assert!(!is_service_interest("tax advisory"));
    }
}
