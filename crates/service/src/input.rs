//! Serde helpers for request bodies that arrive either as JSON or as
//! multipart text fields.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrText {
    List(Vec<String>),
    Text(String),
}

fn clean(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse a text value that may hold a JSON array (`["a","b"]`) or a single item.
pub fn parse_text_list(text: &str) -> Vec<String> {
    let t = text.trim();
    if t.is_empty() {
        return Vec::new();
    }
    if t.starts_with('[') {
        if let Ok(items) = serde_json::from_str::<Vec<String>>(t) {
            return clean(items);
        }
    }
    vec![t.to_string()]
}

/// Tag lists: a JSON array, a JSON-array string, or a single string.
/// `null` is treated as "not provided".
pub fn string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<ListOrText>::deserialize(deserializer)?.map(|raw| match raw {
        ListOrText::List(items) => clean(items),
        ListOrText::Text(text) => parse_text_list(&text),
    }))
}

/// Patch semantics for nullable text: absent stays `None` (via
/// `#[serde(default)]`), `null` or a blank string clears the field.
pub fn nullable_text<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(Some(value.and_then(|s| {
        let t = s.trim();
        if t.is_empty() { None } else { Some(t.to_string()) }
    })))
}

/// Patch semantics for nullable non-text values: `null` clears the field.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Optional text on create: blank strings count as absent.
pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(nullable_text(deserializer)?.flatten())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[derive(Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    struct Body {
        #[serde(default, deserialize_with = "string_list")]
        tags: Option<Vec<String>>,
        #[serde(default, deserialize_with = "nullable_text")]
        linkedin_url: Option<Option<String>>,
        #[serde(default, deserialize_with = "nullable")]
        category_id: Option<Option<Uuid>>,
        #[serde(default, deserialize_with = "optional_text")]
        email: Option<String>,
    }

    fn body(v: serde_json::Value) -> Body {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn tag_lists_accept_arrays_json_strings_and_single_values() {
        assert_eq!(body(json!({"tags": ["a", " b ", ""]})).tags, Some(vec!["a".into(), "b".into()]));
        assert_eq!(body(json!({"tags": "[\"x\",\"y\"]"})).tags, Some(vec!["x".into(), "y".into()]));
        assert_eq!(body(json!({"tags": "solo"})).tags, Some(vec!["solo".into()]));
        assert_eq!(body(json!({"tags": ""})).tags, Some(vec![]));
        assert_eq!(body(json!({})).tags, None);
    }

    #[test]
    fn nullable_fields_distinguish_absent_from_cleared() {
        assert_eq!(body(json!({})).linkedin_url, None);
        assert_eq!(body(json!({"linkedinUrl": null})).linkedin_url, Some(None));
        assert_eq!(body(json!({"linkedinUrl": "  "})).linkedin_url, Some(None));
        assert_eq!(
            body(json!({"linkedinUrl": "https://linkedin.com/in/x"})).linkedin_url,
            Some(Some("https://linkedin.com/in/x".into()))
        );
        let id = Uuid::new_v4();
        assert_eq!(body(json!({"categoryId": id})).category_id, Some(Some(id)));
        assert_eq!(body(json!({"categoryId": null})).category_id, Some(None));
    }

    #[test]
    fn blank_optional_text_is_absent() {
        assert_eq!(body(json!({"email": ""})).email, None);
        assert_eq!(body(json!({"email": "a@b.co"})).email.as_deref(), Some("a@b.co"));
    }
}
