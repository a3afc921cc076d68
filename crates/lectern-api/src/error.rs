//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use lectern_core::{Error as CoreError, StoreFailure};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The request was well-formed but broke a validation rule.
  #[error("unprocessable: {0}")]
  Unprocessable(String),

  /// A delete was refused because other records still depend on the target.
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {source}")]
  Store {
    #[source]
    source:    Box<dyn std::error::Error + Send + Sync>,
    retryable: bool,
  },
}

impl ApiError {
  /// Classify a backend error: missing references become 404, refused
  /// deletes 409, other validation failures 422, anything else a 500.
  pub fn from_store<E>(err: E) -> Self
  where
    E: std::error::Error + StoreFailure + Send + Sync + 'static,
  {
    match err.domain() {
      Some(d) if d.is_not_found() => Self::NotFound(d.to_string()),
      Some(d) if matches!(d, CoreError::InUse { .. }) => Self::Conflict(d.to_string()),
      Some(d) => Self::Unprocessable(d.to_string()),
      None => Self::Store { retryable: err.is_retryable(), source: Box::new(err) },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
      ApiError::Unprocessable(m) => {
        (StatusCode::UNPROCESSABLE_ENTITY, json!({ "error": m }))
      }
      ApiError::Conflict(m) => (StatusCode::CONFLICT, json!({ "error": m })),
      ApiError::Store { source, retryable } => (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": source.to_string(), "retryable": retryable }),
      ),
    };
    (status, Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use axum::body::to_bytes;
  use lectern_core::ids::{ClassId, SubjectId};
  use lectern_store_sqlite::Error as StoreError;

  use super::*;

  async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
    let resp = err.into_response();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  #[tokio::test]
  async fn missing_reference_is_404() {
    let err = ApiError::from_store(StoreError::Core(CoreError::ClassNotFound(ClassId(3))));
    let (status, body) = render(err).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "class not found: 3");
  }

  #[tokio::test]
  async fn rule_violation_is_422() {
    let err = ApiError::from_store(StoreError::Core(CoreError::Duplicate {
      field: "code",
      value: "MATH".into(),
    }));
    let (status, _) = render(err).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  }

  #[tokio::test]
  async fn refused_delete_is_409() {
    let err = ApiError::from_store(StoreError::Core(CoreError::in_use(
      format_args!("subject {}", SubjectId(4)),
      "classes",
    )));
    let (status, body) = render(err).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "subject 4 is still referenced by classes");
  }

  #[tokio::test]
  async fn undecodable_row_is_500_and_not_retryable() {
    let err = ApiError::from_store(StoreError::Decode("bad row".into()));
    let (status, body) = render(err).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["retryable"], false);
  }
}
