//! Handlers for `/subjects` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/subjects` | Optional `?active_only=true` |
//! | `POST` | `/subjects` | Code is stored uppercase |
//! | `GET`  | `/subjects/{id}` | 404 if not found |
//! | `PUT`  | `/subjects/{id}` | Same body as `POST` |
//! | `DELETE` | `/subjects/{id}` | 409 while any class teaches it |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use lectern_core::{
  academic::{NewSubject, Subject},
  ids::SubjectId,
  store::SchoolStore,
};

use crate::{ListParams, error::ApiError};

/// `GET /subjects[?active_only=true]`
pub async fn list<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Subject>>, ApiError> {
  let subjects = store
    .list_subjects(params.active_only)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(subjects))
}

/// `POST /subjects`
pub async fn create<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewSubject>,
) -> Result<impl IntoResponse, ApiError> {
  let subject = store.add_subject(body).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(subject)))
}

/// `GET /subjects/{id}`
pub async fn get_one<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<SubjectId>,
) -> Result<Json<Subject>, ApiError> {
  let subject = store
    .get_subject(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("subject {id} not found")))?;
  Ok(Json(subject))
}

/// `PUT /subjects/{id}`
pub async fn update<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<SubjectId>,
  Json(body): Json<NewSubject>,
) -> Result<Json<Subject>, ApiError> {
  let subject = store
    .update_subject(id, body)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(subject))
}

/// `DELETE /subjects/{id}`
pub async fn delete<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<SubjectId>,
) -> Result<StatusCode, ApiError> {
  store.delete_subject(id).await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
