//! HTTP mapping for the scheduling error taxonomy.
//!
//! Validation and conflict errors carry their message to the client;
//! database and internal failures are logged server-side and surfaced as a
//! generic 500 so nothing internal leaks.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::Error;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Validation(_)
            | Error::InvalidTimeFormat(_)
            | Error::InvalidDate(_)
            | Error::MissingAssignee => {
                let message = self.to_string();
                tracing::warn!("validation error: {}", message);
                envelope(StatusCode::BAD_REQUEST, json!({ "success": false, "message": message }))
            }
            Error::UnknownStaff(ids) => {
                let message = self.to_string();
                tracing::warn!("validation error: {}", message);
                envelope(
                    StatusCode::BAD_REQUEST,
                    json!({ "success": false, "message": message, "missingIds": ids }),
                )
            }
            Error::NotFound(_) => envelope(
                StatusCode::NOT_FOUND,
                json!({ "success": false, "message": self.to_string() }),
            ),
            Error::Conflict {
                staff_id,
                staff_name,
                message,
                appointment,
            } => envelope(
                StatusCode::CONFLICT,
                json!({
                    "success": false,
                    "message": message,
                    "staffId": staff_id,
                    "staffName": staff_name,
                    "appointment": appointment,
                }),
            ),
            Error::Database(_) | Error::Internal(_) => {
                tracing::error!("internal error: {}", self);
                envelope(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "success": false, "message": "Internal server error" }),
                )
            }
        }
    }
}

fn envelope(status: StatusCode, body: serde_json::Value) -> Response {
    (status, Json(body)).into_response()
}
