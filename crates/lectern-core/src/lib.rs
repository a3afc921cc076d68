//! Core types and trait definitions for the Lectern school administration
//! store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! The reconciliation algorithm lives here, written against the
//! [`reconcile::AssignmentTable`] primitives, so every backend runs the same
//! two-phase procedure.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod academic;
pub mod assignment;
pub mod error;
pub mod grants;
pub mod ids;
pub mod reconcile;
mod rules;
pub mod store;
pub mod user;

pub use error::{Error, Result, StoreFailure};
