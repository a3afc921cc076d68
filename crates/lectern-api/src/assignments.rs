//! Handlers for a teacher's class/subject assignments.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/teachers/{id}/assignments` | Current links |
//! | `PUT`  | `/teachers/{id}/assignments` | Body: `{"assignments":[{"class_id":1,"subject_id":2}]}` |
//! | `GET`  | `/teachers/{id}/assignment-board` | Optional `?academic_year_id=`, defaults to the active year |
//! | `GET`  | `/teachers/{id}/assignable-subjects` | `?class_id=` required, `academic_year_id` as above |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use lectern_core::{
  academic::Subject,
  assignment::{AssignmentPair, ClassChoices, ClassSubjectLink, ReconcileOutcome},
  ids::{AcademicYearId, ClassId, UserId},
  store::SchoolStore,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// The given year, or the active one when none is given.
async fn resolve_year<S: SchoolStore>(
  store: &S,
  year: Option<AcademicYearId>,
) -> Result<AcademicYearId, ApiError> {
  if let Some(year) = year {
    return Ok(year);
  }
  store
    .list_academic_years(true)
    .await
    .map_err(ApiError::from_store)?
    .first()
    .map(|y| y.academic_year_id)
    .ok_or_else(|| {
      ApiError::BadRequest("no active academic year; pass academic_year_id".into())
    })
}

// ─── Current assignments ──────────────────────────────────────────────────────

/// `GET /teachers/{id}/assignments`
pub async fn list<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<UserId>,
) -> Result<Json<Vec<ClassSubjectLink>>, ApiError> {
  let links = store
    .teacher_assignments(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(links))
}

// ─── Reconcile ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReconcileBody {
  /// The complete target set. An empty list revokes every assignment.
  pub assignments: Vec<AssignmentPair>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReconcileResponse {
  pub outcome:     ReconcileOutcome,
  pub assignments: Vec<ClassSubjectLink>,
}

/// `PUT /teachers/{id}/assignments`
///
/// Makes the teacher's assignments exactly the listed pairs and answers with
/// the resulting set.
pub async fn reconcile<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<UserId>,
  Json(body): Json<ReconcileBody>,
) -> Result<Json<ReconcileResponse>, ApiError> {
  let outcome = store
    .reconcile_assignments(id, &body.assignments)
    .await
    .map_err(ApiError::from_store)?;
  let assignments = store
    .teacher_assignments(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(ReconcileResponse { outcome, assignments }))
}

// ─── Grant filter ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct BoardParams {
  pub academic_year_id: Option<AcademicYearId>,
}

/// `GET /teachers/{id}/assignment-board[?academic_year_id=<id>]`
pub async fn board<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<UserId>,
  Query(params): Query<BoardParams>,
) -> Result<Json<Vec<ClassChoices>>, ApiError> {
  let year = resolve_year(store.as_ref(), params.academic_year_id).await?;
  let board = store
    .assignment_board(id, year)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(board))
}

#[derive(Debug, Deserialize)]
pub struct AssignableParams {
  pub class_id:         ClassId,
  pub academic_year_id: Option<AcademicYearId>,
}

/// `GET /teachers/{id}/assignable-subjects?class_id=<id>[&academic_year_id=<id>]`
pub async fn assignable<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<UserId>,
  Query(params): Query<AssignableParams>,
) -> Result<Json<Vec<Subject>>, ApiError> {
  let year = resolve_year(store.as_ref(), params.academic_year_id).await?;
  let subjects = store
    .assignable_subjects(id, year, params.class_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(subjects))
}
