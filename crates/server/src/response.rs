use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use service::pagination::{Page, PageMeta};

/// Success envelope: `{ success: true, message?, data?, pagination? }`.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageMeta>,
}

pub struct Reply<T: Serialize> {
    status: StatusCode,
    body: Envelope<T>,
}

impl<T: Serialize> Reply<T> {
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub fn ok<T: Serialize>(data: T) -> Reply<T> {
    Reply {
        status: StatusCode::OK,
        body: Envelope { success: true, message: None, data: Some(data), pagination: None },
    }
}

pub fn created<T: Serialize>(message: &str, data: T) -> Reply<T> {
    Reply {
        status: StatusCode::CREATED,
        body: Envelope { success: true, message: Some(message.to_string()), data: Some(data), pagination: None },
    }
}

pub fn updated<T: Serialize>(message: &str, data: T) -> Reply<T> {
    Reply {
        status: StatusCode::OK,
        body: Envelope { success: true, message: Some(message.to_string()), data: Some(data), pagination: None },
    }
}

pub fn page<T: Serialize>(page: Page<T>) -> Reply<Vec<T>> {
    Reply {
        status: StatusCode::OK,
        body: Envelope { success: true, message: None, data: Some(page.items), pagination: Some(page.meta) },
    }
}

/// Message-only reply for deletes and reorders.
pub fn message(message: &str) -> Reply<()> {
    Reply {
        status: StatusCode::OK,
        body: Envelope { success: true, message: Some(message.to_string()), data: None, pagination: None },
    }
}
