//! Synchronous helpers that run on the database thread, inside
//! `tokio_rusqlite::Connection::call` closures.
//!
//! Reference checks return `rusqlite::Result<Checked<T>>`: the outer layer is
//! a database failure, the inner layer a validation failure that should abort
//! the surrounding transaction without being treated as a database error.

use std::collections::BTreeSet;

use lectern_core::{
  Error as CoreError,
  assignment::{ClassSubjectLink, TeacherSubjectGrant},
  ids::{AcademicYearId, ClassId, SubjectId, UserId},
};
use rusqlite::{Connection, OptionalExtension as _, params};

use crate::encode::{RawAcademicYear, RawClass, RawSubject, RawUser};

pub type Checked<T> = std::result::Result<T, CoreError>;

/// Unwrap a `rusqlite::Result<Checked<T>>` inside a `call` closure, returning
/// `Ok(Err(..))` from the closure on a validation failure. Returning early
/// drops any open transaction, which rolls it back.
macro_rules! check {
  ($e:expr) => {
    match $e? {
      Ok(v) => v,
      Err(e) => return Ok(Err(e)),
    }
  };
}
pub(crate) use check;

// ─── Existence checks ────────────────────────────────────────────────────────

fn exists(conn: &Connection, sql: &str, id: i64) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(sql, params![id], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

/// The user must exist and be a teacher.
pub fn check_teacher(conn: &Connection, id: UserId) -> rusqlite::Result<Checked<()>> {
  let user_type: Option<String> = conn
    .query_row(
      "SELECT user_type FROM users WHERE user_id = ?1",
      params![id.get()],
      |r| r.get(0),
    )
    .optional()?;
  Ok(match user_type.as_deref() {
    None => Err(CoreError::UserNotFound(id)),
    Some("teacher") => Ok(()),
    Some(_) => Err(CoreError::NotATeacher(id)),
  })
}

pub fn check_academic_year(
  conn: &Connection,
  id: AcademicYearId,
) -> rusqlite::Result<Checked<()>> {
  let found = exists(
    conn,
    "SELECT 1 FROM academic_years WHERE academic_year_id = ?1",
    id.get(),
  )?;
  Ok(if found { Ok(()) } else { Err(CoreError::AcademicYearNotFound(id)) })
}

pub fn check_class(conn: &Connection, id: ClassId) -> rusqlite::Result<Checked<()>> {
  let found = exists(conn, "SELECT 1 FROM classes WHERE class_id = ?1", id.get())?;
  Ok(if found { Ok(()) } else { Err(CoreError::ClassNotFound(id)) })
}

/// Every subject must exist; the first missing one is reported.
pub fn check_subjects<'a>(
  conn: &Connection,
  ids: impl IntoIterator<Item = &'a SubjectId>,
) -> rusqlite::Result<Checked<()>> {
  let mut stmt = conn.prepare_cached("SELECT 1 FROM subjects WHERE subject_id = ?1")?;
  for &id in ids {
    if stmt.query_row(params![id.get()], |_| Ok(())).optional()?.is_none() {
      return Ok(Err(CoreError::SubjectNotFound(id)));
    }
  }
  Ok(Ok(()))
}

/// Reject `value` if `column` of `table` already holds it. With
/// `except = Some((id_column, id))` the row being updated is ignored.
pub fn check_unique(
  conn: &Connection,
  table: &str,
  column: &'static str,
  value: &str,
  except: Option<(&str, i64)>,
) -> rusqlite::Result<Checked<()>> {
  let taken = match except {
    None => conn.query_row(
      &format!("SELECT 1 FROM {table} WHERE {column} = ?1"),
      params![value],
      |_| Ok(()),
    ),
    Some((id_column, id)) => conn.query_row(
      &format!("SELECT 1 FROM {table} WHERE {column} = ?1 AND {id_column} != ?2"),
      params![value, id],
      |_| Ok(()),
    ),
  }
  .optional()?
  .is_some();
  Ok(if taken {
    Err(CoreError::Duplicate { field: column, value: value.to_owned() })
  } else {
    Ok(())
  })
}

/// Refuse a delete while `sql` (one `?1` parameter) counts any dependent row.
pub fn check_unreferenced(
  conn: &Connection,
  sql: &str,
  id: i64,
  entity: impl std::fmt::Display,
  dependents: &'static str,
) -> rusqlite::Result<Checked<()>> {
  let count: i64 = conn.query_row(sql, params![id], |r| r.get(0))?;
  Ok(if count == 0 { Ok(()) } else { Err(CoreError::in_use(entity, dependents)) })
}

// ─── Row loaders ─────────────────────────────────────────────────────────────

pub fn user(conn: &Connection, id: UserId) -> rusqlite::Result<Option<RawUser>> {
  conn
    .query_row(
      &format!("SELECT {} FROM users WHERE user_id = ?1", RawUser::COLUMNS),
      params![id.get()],
      RawUser::from_row,
    )
    .optional()
}

pub fn academic_year(
  conn: &Connection,
  id: AcademicYearId,
) -> rusqlite::Result<Option<RawAcademicYear>> {
  conn
    .query_row(
      &format!(
        "SELECT {} FROM academic_years WHERE academic_year_id = ?1",
        RawAcademicYear::COLUMNS
      ),
      params![id.get()],
      RawAcademicYear::from_row,
    )
    .optional()
}

pub fn subject(conn: &Connection, id: SubjectId) -> rusqlite::Result<Option<RawSubject>> {
  conn
    .query_row(
      &format!("SELECT {} FROM subjects WHERE subject_id = ?1", RawSubject::COLUMNS),
      params![id.get()],
      RawSubject::from_row,
    )
    .optional()
}

pub fn class(conn: &Connection, id: ClassId) -> rusqlite::Result<Option<RawClass>> {
  conn
    .query_row(
      &format!("SELECT {} FROM classes WHERE class_id = ?1", RawClass::COLUMNS),
      params![id.get()],
      RawClass::from_row,
    )
    .optional()
}

pub fn subjects(conn: &Connection, active_only: bool) -> rusqlite::Result<Vec<RawSubject>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM subjects WHERE (?1 = 0 OR is_active = 1) ORDER BY code",
    RawSubject::COLUMNS
  ))?;
  stmt
    .query_map(params![active_only], RawSubject::from_row)?
    .collect()
}

pub fn classes(conn: &Connection, active_only: bool) -> rusqlite::Result<Vec<RawClass>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM classes WHERE (?1 = 0 OR is_active = 1)
     ORDER BY grade_level, section, class_id",
    RawClass::COLUMNS
  ))?;
  stmt
    .query_map(params![active_only], RawClass::from_row)?
    .collect()
}

/// Subjects linked to one class, ordered by code.
pub fn class_subjects(conn: &Connection, class: ClassId) -> rusqlite::Result<Vec<RawSubject>> {
  let columns = RawSubject::COLUMNS
    .split(", ")
    .map(|c| format!("s.{c}"))
    .collect::<Vec<_>>()
    .join(", ");
  let mut stmt = conn.prepare(&format!(
    "SELECT {columns}
     FROM subjects s
     JOIN class_subject cs ON cs.subject_id = s.subject_id
     WHERE cs.class_id = ?1
     ORDER BY s.code"
  ))?;
  stmt
    .query_map(params![class.get()], RawSubject::from_row)?
    .collect()
}

fn link_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ClassSubjectLink> {
  Ok(ClassSubjectLink {
    class_id:   ClassId(row.get(0)?),
    subject_id: SubjectId(row.get(1)?),
    teacher_id: row.get::<_, Option<i64>>(2)?.map(UserId),
  })
}

pub fn class_links(conn: &Connection, class: ClassId) -> rusqlite::Result<Vec<ClassSubjectLink>> {
  let mut stmt = conn.prepare(
    "SELECT class_id, subject_id, teacher_id FROM class_subject
     WHERE class_id = ?1 ORDER BY subject_id",
  )?;
  stmt.query_map(params![class.get()], link_from_row)?.collect()
}

pub fn teacher_links(
  conn: &Connection,
  teacher: UserId,
) -> rusqlite::Result<Vec<ClassSubjectLink>> {
  let mut stmt = conn.prepare(
    "SELECT class_id, subject_id, teacher_id FROM class_subject
     WHERE teacher_id = ?1 ORDER BY class_id, subject_id",
  )?;
  stmt.query_map(params![teacher.get()], link_from_row)?.collect()
}

/// Subject ids currently linked to a class.
pub fn linked_subject_ids(
  conn: &Connection,
  class: ClassId,
) -> rusqlite::Result<BTreeSet<SubjectId>> {
  let mut stmt = conn.prepare("SELECT subject_id FROM class_subject WHERE class_id = ?1")?;
  stmt
    .query_map(params![class.get()], |r| Ok(SubjectId(r.get(0)?)))?
    .collect()
}

pub fn grants(
  conn: &Connection,
  teacher: UserId,
  year: Option<AcademicYearId>,
) -> rusqlite::Result<Vec<TeacherSubjectGrant>> {
  let mut stmt = conn.prepare(
    "SELECT teacher_id, subject_id, academic_year_id FROM teacher_subject
     WHERE teacher_id = ?1 AND (?2 IS NULL OR academic_year_id = ?2)
     ORDER BY academic_year_id, subject_id",
  )?;
  stmt
    .query_map(params![teacher.get(), year.map(AcademicYearId::get)], |r| {
      Ok(TeacherSubjectGrant {
        teacher_id:       UserId(r.get(0)?),
        subject_id:       SubjectId(r.get(1)?),
        academic_year_id: AcademicYearId(r.get(2)?),
      })
    })?
    .collect()
}

/// User names starting with `prefix`.
pub fn user_names(conn: &Connection, prefix: &str) -> rusqlite::Result<Vec<String>> {
  let mut stmt =
    conn.prepare("SELECT user_name FROM users WHERE substr(user_name, 1, length(?1)) = ?1")?;
  stmt.query_map(params![prefix], |r| r.get(0))?.collect()
}

/// Make the subjects linked to `class` exactly `wanted`: links for dropped
/// subjects are deleted, new subjects get an unassigned link, surviving links
/// keep their teacher. Returns the dropped subjects.
pub fn sync_class_subjects(
  conn: &Connection,
  class: ClassId,
  wanted: &BTreeSet<SubjectId>,
  now: &str,
) -> rusqlite::Result<Vec<SubjectId>> {
  let current = linked_subject_ids(conn, class)?;
  let removed: Vec<SubjectId> = current.difference(wanted).copied().collect();
  {
    let mut stmt = conn.prepare_cached(
      "DELETE FROM class_subject WHERE class_id = ?1 AND subject_id = ?2",
    )?;
    for subject in &removed {
      stmt.execute(params![class.get(), subject.get()])?;
    }
  }
  insert_unassigned_links(conn, class, wanted.difference(&current).copied(), now)?;
  Ok(removed)
}

/// Insert an unassigned link for each subject of a class. Existing links are
/// left as they are.
pub fn insert_unassigned_links(
  conn: &Connection,
  class: ClassId,
  subjects: impl IntoIterator<Item = SubjectId>,
  now: &str,
) -> rusqlite::Result<()> {
  let mut stmt = conn.prepare_cached(
    "INSERT OR IGNORE INTO class_subject (class_id, subject_id, teacher_id, created_at, updated_at)
     VALUES (?1, ?2, NULL, ?3, ?3)",
  )?;
  for subject in subjects {
    stmt.execute(params![class.get(), subject.get(), now])?;
  }
  Ok(())
}
