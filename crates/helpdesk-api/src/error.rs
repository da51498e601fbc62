//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use helpdesk_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] CoreError),

  #[error("bad request: {0}")]
  BadRequest(String),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Core(e) => match e {
        CoreError::Validation { .. } | CoreError::UnknownRole(_) => StatusCode::BAD_REQUEST,
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::Conflict(_) => StatusCode::CONFLICT,
        CoreError::CircularReference(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CoreError::CorruptHierarchy(_) | CoreError::Store(_) => {
          StatusCode::INTERNAL_SERVER_ERROR
        }
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use helpdesk_core::error::Field;
  use uuid::Uuid;

  use super::*;

  #[test]
  fn status_mapping() {
    let id = Uuid::nil();
    let cases = [
      (
        CoreError::Validation { field: Field::Name, reason: "too short".into() },
        StatusCode::BAD_REQUEST,
      ),
      (CoreError::UnknownRole("owner".into()), StatusCode::BAD_REQUEST),
      (CoreError::NotFound(id), StatusCode::NOT_FOUND),
      (CoreError::Conflict("taken".into()), StatusCode::CONFLICT),
      (CoreError::CircularReference(id), StatusCode::UNPROCESSABLE_ENTITY),
      (CoreError::CorruptHierarchy(id), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (err, status) in cases {
      assert_eq!(ApiError::from(err).status(), status);
    }
    assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
  }
}
