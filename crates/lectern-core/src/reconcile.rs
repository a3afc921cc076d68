//! Teacher assignment reconciliation.
//!
//! Given a teacher and a target set of (class, subject) pairs, rewrite the
//! shared link table so that exactly those links are attributed to the
//! teacher. Links owned by other teachers are only touched when a target pair
//! collides with them, in which case the last writer wins.
//!
//! The procedure runs in two phases and the order matters: first every link
//! attributed to the teacher is cleared, then each target pair is applied.
//! Clearing first means a re-run after a partial failure converges to the
//! same state, and a backend that wraps both phases in one transaction makes
//! the whole reassignment atomic.

use std::collections::BTreeSet;

use crate::{
  assignment::{AssignmentPair, ReconcileOutcome},
  ids::UserId,
};

/// The four persistence primitives reconciliation needs from a link table.
///
/// Backends implement this over whatever unit of atomicity they offer (for
/// SQLite, an open transaction).
pub trait AssignmentTable {
  type Error;

  /// Set `teacher_id` to null on every link attributed to `teacher`.
  /// Returns the number of links cleared.
  fn clear_teacher(&mut self, teacher: UserId) -> Result<usize, Self::Error>;

  /// Whether a link row exists for `pair`, regardless of its teacher.
  fn link_exists(&mut self, pair: AssignmentPair) -> Result<bool, Self::Error>;

  /// Attribute the existing link for `pair` to `teacher`.
  fn assign_link(
    &mut self,
    pair: AssignmentPair,
    teacher: UserId,
  ) -> Result<(), Self::Error>;

  /// Create a link for `pair` attributed to `teacher`.
  fn insert_link(
    &mut self,
    pair: AssignmentPair,
    teacher: UserId,
  ) -> Result<(), Self::Error>;
}

/// Replace `teacher`'s assignments in `table` with exactly `pairs`.
///
/// An empty `pairs` revokes every assignment the teacher holds. Validation of
/// the teacher and pairs is the caller's job and must happen before this is
/// called.
pub fn reconcile<T: AssignmentTable>(
  table: &mut T,
  teacher: UserId,
  pairs: &BTreeSet<AssignmentPair>,
) -> Result<ReconcileOutcome, T::Error> {
  let mut outcome = ReconcileOutcome {
    cleared: table.clear_teacher(teacher)?,
    ..ReconcileOutcome::default()
  };

  for &pair in pairs {
    if table.link_exists(pair)? {
      table.assign_link(pair, teacher)?;
      outcome.updated += 1;
    } else {
      table.insert_link(pair, teacher)?;
      outcome.inserted += 1;
    }
  }

  Ok(outcome)
}
