//! JSON REST API for Lectern.
//!
//! Exposes an axum [`Router`] backed by any
//! [`lectern_core::store::SchoolStore`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", lectern_api::api_router(store.clone()))
//! ```

pub mod academic_years;
pub mod assignments;
pub mod classes;
pub mod error;
pub mod subjects;
pub mod teachers;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use lectern_core::store::SchoolStore;
use serde::Deserialize;

pub use error::ApiError;

/// `?active_only=true` on list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub active_only: bool,
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: SchoolStore + 'static,
{
  Router::new()
    // Teachers
    .route("/teachers", get(teachers::list::<S>).post(teachers::create::<S>))
    .route(
      "/teachers/{id}",
      get(teachers::get_one::<S>)
        .put(teachers::update::<S>)
        .delete(teachers::delete::<S>),
    )
    .route(
      "/teachers/{id}/subjects",
      get(teachers::list_grants::<S>).put(teachers::replace_grants::<S>),
    )
    // Assignments
    .route(
      "/teachers/{id}/assignments",
      get(assignments::list::<S>).put(assignments::reconcile::<S>),
    )
    .route("/teachers/{id}/assignment-board", get(assignments::board::<S>))
    .route(
      "/teachers/{id}/assignable-subjects",
      get(assignments::assignable::<S>),
    )
    // Academic years
    .route(
      "/academic-years",
      get(academic_years::list::<S>).post(academic_years::create::<S>),
    )
    .route(
      "/academic-years/{id}",
      get(academic_years::get_one::<S>)
        .put(academic_years::update::<S>)
        .delete(academic_years::delete::<S>),
    )
    .route(
      "/academic-years/{id}/activate",
      post(academic_years::activate::<S>),
    )
    // Subjects
    .route("/subjects", get(subjects::list::<S>).post(subjects::create::<S>))
    .route(
      "/subjects/{id}",
      get(subjects::get_one::<S>)
        .put(subjects::update::<S>)
        .delete(subjects::delete::<S>),
    )
    // Classes
    .route("/classes", get(classes::list::<S>).post(classes::create::<S>))
    .route(
      "/classes/{id}",
      get(classes::get_one::<S>)
        .put(classes::update::<S>)
        .delete(classes::delete::<S>),
    )
    .route("/classes/{id}/subjects", put(classes::set_subjects::<S>))
    .with_state(store)
}
