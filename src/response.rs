use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::ErrorDetail;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Fail,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub details: Option<Vec<ErrorDetail>>,
}

/// Envelope every JSON endpoint answers with.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: Status,
    pub code: u16,
    pub data: Option<T>,
    pub errors: Option<ErrorBody>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(code: StatusCode, data: T) -> Self {
        Self {
            status: Status::Success,
            code: code.as_u16(),
            data: Some(data),
            errors: None,
        }
    }

    pub fn ok(data: T) -> Self {
        Self::success(StatusCode::OK, data)
    }

    pub fn fail(code: StatusCode, errors: ErrorBody) -> Self {
        Self {
            status: Status::Fail,
            code: code.as_u16(),
            data: None,
            errors: Some(errors),
        }
    }
}

impl ApiResponse<()> {
    pub fn empty(code: StatusCode) -> Self {
        Self {
            status: Status::Success,
            code: code.as_u16(),
            data: None,
            errors: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
