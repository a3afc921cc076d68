//! Handlers for `/classes` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/classes` | Optional `?active_only=true` |
//! | `POST` | `/classes` | `subjects` get one unassigned link each |
//! | `GET`  | `/classes/{id}` | Class plus its links; 404 if not found |
//! | `PUT`  | `/classes/{id}` | Same body as `POST`; empty `subjects` leaves links alone |
//! | `DELETE` | `/classes/{id}` | Removes the class and its links |
//! | `PUT`  | `/classes/{id}/subjects` | Body: `{"subject_ids":[..]}`, at least one |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use lectern_core::{
  academic::{NewClass, SchoolClass},
  assignment::ClassSubjectLink,
  ids::{ClassId, SubjectId},
  store::SchoolStore,
};
use serde::{Deserialize, Serialize};

use crate::{ListParams, error::ApiError};

/// A class with the subjects taught in it and who teaches each.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClassDetail {
  #[serde(flatten)]
  pub class: SchoolClass,
  pub links: Vec<ClassSubjectLink>,
}

/// `GET /classes[?active_only=true]`
pub async fn list<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<SchoolClass>>, ApiError> {
  let classes = store
    .list_classes(params.active_only)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(classes))
}

/// `POST /classes`
pub async fn create<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewClass>,
) -> Result<impl IntoResponse, ApiError> {
  let class = store.add_class(body).await.map_err(ApiError::from_store)?;
  let links = store
    .class_links(class.class_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(ClassDetail { class, links })))
}

/// `GET /classes/{id}`
pub async fn get_one<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<ClassId>,
) -> Result<Json<ClassDetail>, ApiError> {
  let class = store
    .get_class(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("class {id} not found")))?;
  let links = store.class_links(id).await.map_err(ApiError::from_store)?;
  Ok(Json(ClassDetail { class, links }))
}

/// `PUT /classes/{id}`
pub async fn update<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<ClassId>,
  Json(body): Json<NewClass>,
) -> Result<Json<ClassDetail>, ApiError> {
  let class = store.update_class(id, body).await.map_err(ApiError::from_store)?;
  let links = store.class_links(id).await.map_err(ApiError::from_store)?;
  Ok(Json(ClassDetail { class, links }))
}

/// `DELETE /classes/{id}`
pub async fn delete<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<ClassId>,
) -> Result<StatusCode, ApiError> {
  store.delete_class(id).await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct SubjectsBody {
  pub subject_ids: Vec<SubjectId>,
}

/// `PUT /classes/{id}/subjects`
///
/// Links that survive keep their teacher; dropped subjects lose their link.
pub async fn set_subjects<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<ClassId>,
  Json(body): Json<SubjectsBody>,
) -> Result<Json<Vec<ClassSubjectLink>>, ApiError> {
  let links = store
    .set_class_subjects(id, body.subject_ids)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(links))
}
