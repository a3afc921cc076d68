//! Handlers for `/teachers` endpoints and a teacher's subject grants.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/teachers` | Newest first |
//! | `POST` | `/teachers` | Body: `{"name":..,"email":..,"phone":..}` |
//! | `GET`  | `/teachers/{id}` | 404 if not found or not a teacher |
//! | `PUT`  | `/teachers/{id}` | Body: `{"name":..,"email":..,"phone":..,"status":true}` |
//! | `DELETE` | `/teachers/{id}` | Unassigns their links; 409 while a class teacher |
//! | `GET`  | `/teachers/{id}/subjects` | Optional `?academic_year_id=` |
//! | `PUT`  | `/teachers/{id}/subjects` | Body: `{"academic_year_id":1,"subject_ids":[..]}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use lectern_core::{
  assignment::TeacherSubjectGrant,
  ids::{AcademicYearId, SubjectId, UserId},
  store::SchoolStore,
  user::{NewTeacher, TeacherUpdate, User},
};
use serde::Deserialize;

use crate::error::ApiError;

// ─── Teachers ─────────────────────────────────────────────────────────────────

/// `GET /teachers`
pub async fn list<S: SchoolStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<User>>, ApiError> {
  let teachers = store.list_teachers().await.map_err(ApiError::from_store)?;
  Ok(Json(teachers))
}

/// `POST /teachers`
pub async fn create<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewTeacher>,
) -> Result<impl IntoResponse, ApiError> {
  let teacher = store.add_teacher(body).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(teacher)))
}

/// `GET /teachers/{id}`
pub async fn get_one<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<UserId>,
) -> Result<Json<User>, ApiError> {
  let user = store
    .get_user(id)
    .await
    .map_err(ApiError::from_store)?
    .filter(User::is_teacher)
    .ok_or_else(|| ApiError::NotFound(format!("teacher {id} not found")))?;
  Ok(Json(user))
}

/// `PUT /teachers/{id}`
pub async fn update<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<UserId>,
  Json(body): Json<TeacherUpdate>,
) -> Result<Json<User>, ApiError> {
  let teacher = store
    .update_teacher(id, body)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(teacher))
}

/// `DELETE /teachers/{id}`
pub async fn delete<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<UserId>,
) -> Result<StatusCode, ApiError> {
  store.delete_teacher(id).await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Grants ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GrantParams {
  pub academic_year_id: Option<AcademicYearId>,
}

/// `GET /teachers/{id}/subjects[?academic_year_id=<id>]`
pub async fn list_grants<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<UserId>,
  Query(params): Query<GrantParams>,
) -> Result<Json<Vec<TeacherSubjectGrant>>, ApiError> {
  let grants = store
    .list_grants(id, params.academic_year_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(grants))
}

#[derive(Debug, Deserialize)]
pub struct ReplaceGrantsBody {
  pub academic_year_id: AcademicYearId,
  pub subject_ids:      Vec<SubjectId>,
}

/// `PUT /teachers/{id}/subjects`
///
/// Replaces the grants for one academic year; other years keep theirs.
pub async fn replace_grants<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<UserId>,
  Json(body): Json<ReplaceGrantsBody>,
) -> Result<Json<Vec<TeacherSubjectGrant>>, ApiError> {
  let grants = store
    .replace_grants(id, body.academic_year_id, body.subject_ids)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(grants))
}
