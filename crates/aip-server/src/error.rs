//! Maps the shared [`aip_types::AipError`] taxonomy onto HTTP responses
//! (§7): `status_family()` decides the status code, the boundary owns
//! the JSON `{detail}` body and the structured log line.

use aip_types::{AipError, StatusFamily};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub struct ApiError(pub AipError);

impl From<AipError> for ApiError {
    fn from(err: AipError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.status_family() {
            StatusFamily::BadRequest => StatusCode::BAD_REQUEST,
            StatusFamily::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            StatusFamily::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::warn!(error = %self.0, "request rejected");
        }
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}

/// Parses a JSON body into `T`, mapping a deserialize failure onto
/// `SchemaInvalid` so malformed bodies surface as 422 rather than
/// axum's default 400 JSON-rejection, matching §7's "validation or
/// guard failures → 422".
pub fn parse_body<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError(AipError::SchemaInvalid(e.to_string())))
}
