//! [`AssignmentTable`] over the `class_subject` table.

use lectern_core::{
  assignment::AssignmentPair,
  ids::UserId,
  reconcile::AssignmentTable,
};
use rusqlite::{Connection, OptionalExtension as _, params};

/// The link table as seen through one connection, normally an open
/// transaction. `now` stamps `updated_at` on every row touched.
pub struct LinkTable<'c> {
  conn: &'c Connection,
  now:  String,
}

impl<'c> LinkTable<'c> {
  pub fn new(conn: &'c Connection, now: String) -> Self { Self { conn, now } }
}

impl AssignmentTable for LinkTable<'_> {
  type Error = rusqlite::Error;

  fn clear_teacher(&mut self, teacher: UserId) -> rusqlite::Result<usize> {
    self.conn.execute(
      "UPDATE class_subject SET teacher_id = NULL, updated_at = ?2
       WHERE teacher_id = ?1",
      params![teacher.get(), self.now],
    )
  }

  fn link_exists(&mut self, pair: AssignmentPair) -> rusqlite::Result<bool> {
    Ok(
      self
        .conn
        .prepare_cached(
          "SELECT 1 FROM class_subject WHERE class_id = ?1 AND subject_id = ?2",
        )?
        .query_row(params![pair.class_id.get(), pair.subject_id.get()], |_| Ok(()))
        .optional()?
        .is_some(),
    )
  }

  fn assign_link(&mut self, pair: AssignmentPair, teacher: UserId) -> rusqlite::Result<()> {
    self
      .conn
      .prepare_cached(
        "UPDATE class_subject SET teacher_id = ?3, updated_at = ?4
         WHERE class_id = ?1 AND subject_id = ?2",
      )?
      .execute(params![
        pair.class_id.get(),
        pair.subject_id.get(),
        teacher.get(),
        self.now,
      ])?;
    Ok(())
  }

  fn insert_link(&mut self, pair: AssignmentPair, teacher: UserId) -> rusqlite::Result<()> {
    self
      .conn
      .prepare_cached(
        "INSERT INTO class_subject (class_id, subject_id, teacher_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)",
      )?
      .execute(params![
        pair.class_id.get(),
        pair.subject_id.get(),
        teacher.get(),
        self.now,
      ])?;
    Ok(())
  }
}
