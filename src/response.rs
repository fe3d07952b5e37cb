//! Standard response envelope: `{ status, message, data?, statusCode }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub status_code: u16,
}

impl<T> ApiResponse<T> {
    pub fn success(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            status: true,
            message: message.into(),
            data: Some(data),
            status_code: status.as_u16(),
        }
    }

    /// 200 with data.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::success(StatusCode::OK, message, data)
    }

    /// 201 with data.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::success(StatusCode::CREATED, message, data)
    }
}

impl ApiResponse<()> {
    /// Success without a data payload.
    pub fn empty(status: StatusCode, message: impl Into<String>) -> Self {
        ApiResponse {
            status: true,
            message: message.into(),
            data: None,
            status_code: status.as_u16(),
        }
    }

    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        ApiResponse {
            status: false,
            message: message.into(),
            data: None,
            status_code: status.as_u16(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
