//! Request extractors that report rejections through [`ApiError`].

use axum::{
    extract::{FromRequest, FromRequestParts, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use service::storage::UploadedImage;

use crate::errors::ApiError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);

/// Body of an image-bearing write: JSON, or multipart text fields plus at
/// most one file part.
pub struct FormOrJson<T> {
    pub data: T,
    pub upload: Option<UploadedImage>,
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

/// Repeated parts (`specialties=a`, `specialties=b`) collect into an array.
fn insert_text(fields: &mut Map<String, Value>, name: &str, value: String) {
    let name = name.strip_suffix("[]").unwrap_or(name);
    match fields.get_mut(name) {
        Some(Value::Array(items)) => items.push(Value::String(value)),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, Value::String(value)]);
        }
        None => {
            fields.insert(name.to_string(), Value::String(value));
        }
    }
}

#[axum::async_trait]
impl<T, S> FromRequest<S> for FormOrJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let Json(data) = Json::<T>::from_request(req, state).await?;
            return Ok(Self { data, upload: None });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        let mut fields = Map::new();
        let mut upload = None;
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            if let Some(file_name) = file_name {
                let content_type = field.content_type().unwrap_or("application/octet-stream").to_string();
                let bytes = field.bytes().await?;
                // browsers send an empty part when no file was picked
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                if upload.is_some() {
                    return Err(ApiError::bad_request("Only one image may be uploaded per request"));
                }
                upload = Some(UploadedImage {
                    field: name,
                    file_name: Some(file_name),
                    content_type,
                    bytes: bytes.to_vec(),
                });
            } else {
                let text = field.text().await?;
                insert_text(&mut fields, &name, text);
            }
        }
        let data = serde_json::from_value(Value::Object(fields))
            .map_err(|e| ApiError::bad_request(format!("Invalid form data: {e}")))?;
        Ok(Self { data, upload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        name: String,
        #[serde(default)]
        tags: Vec<String>,
    }

    fn multipart_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "multipart/form-data; boundary=XYZ")
            .body(Body::from(body.replace('\n', "\r\n")))
            .unwrap()
    }

    #[test]
    fn repeated_fields_become_arrays() {
        let mut map = Map::new();
        insert_text(&mut map, "tags[]", "a".into());
        insert_text(&mut map, "tags", "b".into());
        insert_text(&mut map, "tags", "c".into());
        insert_text(&mut map, "name", "x".into());
        assert_eq!(Value::Object(map), json!({"tags": ["a", "b", "c"], "name": "x"}));
    }

    #[tokio::test]
    async fn json_bodies_pass_through() {
        let req = Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name":"Acme","tags":["x"]}"#))
            .unwrap();
        let got = FormOrJson::<Sample>::from_request(req, &()).await.unwrap();
        assert_eq!(got.data.name, "Acme");
        assert_eq!(got.data.tags, vec!["x"]);
        assert!(got.upload.is_none());
    }

    #[tokio::test]
    async fn multipart_text_and_file_parts_are_split() {
        let body = "--XYZ
Content-Disposition: form-data; name=\"name\"

Acme
--XYZ
Content-Disposition: form-data; name=\"tags\"

one
--XYZ
Content-Disposition: form-data; name=\"tags\"

two
--XYZ
Content-Disposition: form-data; name=\"image\"; filename=\"logo.png\"
Content-Type: image/png

PNGDATA
--XYZ--
";
        let got = FormOrJson::<Sample>::from_request(multipart_request(body), &()).await.unwrap();
        assert_eq!(got.data.name, "Acme");
        assert_eq!(got.data.tags, vec!["one", "two"]);
        let upload = got.upload.unwrap();
        assert_eq!(upload.field, "image");
        assert_eq!(upload.content_type, "image/png");
        assert_eq!(upload.bytes, b"PNGDATA");
    }

    #[tokio::test]
    async fn malformed_json_is_a_client_error() {
        let req = Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let err = FormOrJson::<Sample>::from_request(req, &()).await.err().unwrap();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }
}
