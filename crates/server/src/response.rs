//! The JSON envelope every endpoint answers with.
//!
//! Success: `{"statusCode", "message", "data", "success": true}`.
//! Failure: `{"statusCode", "message", "errors", "success": false}`.

use std::borrow::Cow;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Successful response carrying optional data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    #[serde(skip)]
    status: StatusCode,
    status_code: u16,
    message: Cow<'static, str>,
    data: Option<T>,
    success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with data.
    pub fn ok(message: impl Into<Cow<'static, str>>, data: T) -> Self {
        Self::with_status(StatusCode::OK, message, Some(data))
    }

    /// 201 with data.
    pub fn created(message: impl Into<Cow<'static, str>>, data: T) -> Self {
        Self::with_status(StatusCode::CREATED, message, Some(data))
    }

    fn with_status(status: StatusCode, message: impl Into<Cow<'static, str>>, data: Option<T>) -> Self {
        Self {
            status,
            status_code: status.as_u16(),
            message: message.into(),
            data,
            success: status.is_success(),
        }
    }
}

impl ApiResponse<()> {
    /// 200 with `data: null`.
    pub fn message(message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_status(StatusCode::OK, message, None)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Error body; built by [`crate::error::AppError`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    pub status_code: u16,
    pub message: Cow<'static, str>,
    pub errors: Vec<String>,
    pub success: bool,
}

impl ApiErrorBody {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<Cow<'static, str>>, errors: Vec<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            message: message.into(),
            errors,
            success: false,
        }
    }
}
