//! Error response bodies in the "problem details" format (RFC 7807).

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

const ERRORS_URI_BASE: &str = "https://tenpo.com/errors/";

/// A machine-readable description of why a request failed.
#[derive(Debug, Serialize)]
pub struct ProblemDetail {
    #[serde(rename = "type")]
    type_: String,
    title: &'static str,
    status: u16,
    detail: String,
}

impl ProblemDetail {
    fn new(status: StatusCode, title: &'static str, kind: &str, detail: String) -> Self {
        Self {
            type_: format!("{ERRORS_URI_BASE}{kind}"),
            title,
            status: status.as_u16(),
            detail,
        }
    }

    /// A request broke one of the ledger's business rules.
    pub fn business_logic(detail: String) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "Business Logic Error",
            "business-logic",
            detail,
        )
    }

    /// A request body had missing or invalid fields.
    pub fn validation(detail: String) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "Validation Error",
            "validation",
            detail,
        )
    }

    /// A write clashed with a unique constraint.
    pub fn integrity(detail: String) -> Self {
        Self::new(StatusCode::CONFLICT, "Integrity Error", "integrity", detail)
    }

    /// Something went wrong that the client cannot fix.
    pub fn server_error() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server Error",
            "server-error",
            "An unexpected error occurred".to_owned(),
        )
    }
}

impl IntoResponse for ProblemDetail {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(self)).into_response()
    }
}
