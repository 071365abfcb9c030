use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Content type for Problem Details as per RFC 9457.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// Non-standard status used when the caller's context was cancelled or timed out.
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// RFC 9457 Problem Details for HTTP APIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub instance: String,
    /// Machine-readable error code.
    pub code: String,
}

impl Problem {
    pub fn from_parts(
        status: u16,
        code: &str,
        title: &str,
        detail: impl Into<String>,
        instance: impl Into<String>,
    ) -> Self {
        Self {
            type_url: "about:blank".to_string(),
            title: title.to_string(),
            status,
            detail: detail.into(),
            instance: instance.into(),
            code: code.to_string(),
        }
    }
}

/// Axum response wrapper that renders `Problem` with correct status & content type.
#[derive(Debug, Clone)]
pub struct ProblemResponse(pub Problem);

impl From<Problem> for ProblemResponse {
    fn from(p: Problem) -> Self {
        Self(p)
    }
}

impl IntoResponse for ProblemResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut resp = axum::Json(self.0).into_response();
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        resp
    }
}

/// Map a domain error onto its problem response for `instance`.
pub fn domain_problem(error: &DomainError, instance: &str) -> ProblemResponse {
    let (status, code, title) = match error {
        DomainError::NotFound { .. } => (404, "NOT_FOUND", "Not Found"),
        DomainError::InvalidIdentity { .. } => (400, "INVALID_IDENTITY", "Bad Request"),
        DomainError::InvalidDateRange { .. } => (400, "INVALID_DATE_RANGE", "Bad Request"),
        DomainError::AlreadyExists { .. } => (409, "ALREADY_EXISTS", "Conflict"),
        DomainError::Cancelled => (CLIENT_CLOSED_REQUEST, "CANCELLED", "Request Cancelled"),
        DomainError::StoreUnavailable { .. } => {
            (503, "STORE_UNAVAILABLE", "Service Unavailable")
        }
        DomainError::CorruptDocument { .. } | DomainError::Encode { .. } => {
            (500, "INTERNAL", "Internal Server Error")
        }
    };
    // Server-side details stay in the logs.
    let detail = if status >= 500 && status != 503 {
        "An internal error occurred".to_string()
    } else {
        error.to_string()
    };
    Problem::from_parts(status, code, title, detail, instance).into()
}

pub fn json_rejection(rejection: &JsonRejection, instance: &str) -> ProblemResponse {
    Problem::from_parts(400, "INVALID_BODY", "Bad Request", rejection.body_text(), instance).into()
}

pub fn query_rejection(rejection: &QueryRejection, instance: &str) -> ProblemResponse {
    Problem::from_parts(400, "INVALID_QUERY", "Bad Request", rejection.body_text(), instance)
        .into()
}
