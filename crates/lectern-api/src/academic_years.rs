//! Handlers for `/academic-years` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/academic-years` | Optional `?active_only=true` |
//! | `POST` | `/academic-years` | An active new year deactivates the others |
//! | `GET`  | `/academic-years/{id}` | 404 if not found |
//! | `PUT`  | `/academic-years/{id}` | Making it active deactivates the others |
//! | `DELETE` | `/academic-years/{id}` | 409 while classes belong to it |
//! | `POST` | `/academic-years/{id}/activate` | |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use lectern_core::{
  academic::{AcademicYear, NewAcademicYear},
  ids::AcademicYearId,
  store::SchoolStore,
};

use crate::{ListParams, error::ApiError};

/// `GET /academic-years[?active_only=true]`
pub async fn list<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<AcademicYear>>, ApiError> {
  let years = store
    .list_academic_years(params.active_only)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(years))
}

/// `POST /academic-years`
pub async fn create<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewAcademicYear>,
) -> Result<impl IntoResponse, ApiError> {
  let year = store
    .add_academic_year(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(year)))
}

/// `GET /academic-years/{id}`
pub async fn get_one<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<AcademicYearId>,
) -> Result<Json<AcademicYear>, ApiError> {
  let year = store
    .get_academic_year(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("academic year {id} not found")))?;
  Ok(Json(year))
}

/// `PUT /academic-years/{id}`
pub async fn update<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<AcademicYearId>,
  Json(body): Json<NewAcademicYear>,
) -> Result<Json<AcademicYear>, ApiError> {
  let year = store
    .update_academic_year(id, body)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(year))
}

/// `DELETE /academic-years/{id}`
pub async fn delete<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<AcademicYearId>,
) -> Result<StatusCode, ApiError> {
  store
    .delete_academic_year(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /academic-years/{id}/activate`
pub async fn activate<S: SchoolStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<AcademicYearId>,
) -> Result<Json<AcademicYear>, ApiError> {
  let year = store
    .activate_academic_year(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(year))
}
