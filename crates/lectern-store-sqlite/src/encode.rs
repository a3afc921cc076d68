//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and calendar dates as
//! `YYYY-MM-DD`. Booleans are `0`/`1` integers. Identifiers are the raw
//! `INTEGER PRIMARY KEY`.

use chrono::{DateTime, NaiveDate, Utc};
use lectern_core::{
  academic::{AcademicYear, SchoolClass, Subject},
  ids::{AcademicYearId, ClassId, SubjectId, UserId},
  user::{User, UserType},
};

use crate::{Error, Result};

// ─── DateTime<Utc> / NaiveDate ───────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

// ─── UserType ────────────────────────────────────────────────────────────────

pub fn encode_user_type(t: UserType) -> &'static str {
  match t {
    UserType::Admin => "admin",
    UserType::Teacher => "teacher",
    UserType::Student => "student",
    UserType::Parent => "parent",
    UserType::Guardian => "guardian",
  }
}

pub fn decode_user_type(s: &str) -> Result<UserType> {
  match s {
    "admin" => Ok(UserType::Admin),
    "teacher" => Ok(UserType::Teacher),
    "student" => Ok(UserType::Student),
    "parent" => Ok(UserType::Parent),
    "guardian" => Ok(UserType::Guardian),
    other => Err(Error::Decode(format!("unknown user type: {other:?}"))),
  }
}

fn narrow<T: TryFrom<i64>>(column: &str, v: i64) -> Result<T> {
  T::try_from(v).map_err(|_| Error::Decode(format!("{column} out of range: {v}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub user_id:    i64,
  pub name:       String,
  pub email:      String,
  pub phone:      String,
  pub user_name:  String,
  pub user_type:  String,
  pub status:     bool,
  pub created_at: String,
}

impl RawUser {
  pub const COLUMNS: &'static str =
    "user_id, name, email, phone, user_name, user_type, status, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:    row.get(0)?,
      name:       row.get(1)?,
      email:      row.get(2)?,
      phone:      row.get(3)?,
      user_name:  row.get(4)?,
      user_type:  row.get(5)?,
      status:     row.get(6)?,
      created_at: row.get(7)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    UserId(self.user_id),
      name:       self.name,
      email:      self.email,
      phone:      self.phone,
      user_name:  self.user_name,
      user_type:  decode_user_type(&self.user_type)?,
      status:     self.status,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from an `academic_years` row.
pub struct RawAcademicYear {
  pub academic_year_id: i64,
  pub name:             String,
  pub code:             String,
  pub start_date:       String,
  pub end_date:         String,
  pub description:      Option<String>,
  pub is_active:        bool,
  pub created_at:       String,
}

impl RawAcademicYear {
  pub const COLUMNS: &'static str = "academic_year_id, name, code, start_date, \
                                     end_date, description, is_active, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      academic_year_id: row.get(0)?,
      name:             row.get(1)?,
      code:             row.get(2)?,
      start_date:       row.get(3)?,
      end_date:         row.get(4)?,
      description:      row.get(5)?,
      is_active:        row.get(6)?,
      created_at:       row.get(7)?,
    })
  }

  pub fn into_academic_year(self) -> Result<AcademicYear> {
    Ok(AcademicYear {
      academic_year_id: AcademicYearId(self.academic_year_id),
      name:             self.name,
      code:             self.code,
      start_date:       decode_date(&self.start_date)?,
      end_date:         decode_date(&self.end_date)?,
      description:      self.description,
      is_active:        self.is_active,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `subjects` row.
pub struct RawSubject {
  pub subject_id:   i64,
  pub name:         String,
  pub code:         String,
  pub description:  Option<String>,
  pub credit_hours: i64,
  pub is_active:    bool,
  pub created_at:   String,
}

impl RawSubject {
  pub const COLUMNS: &'static str =
    "subject_id, name, code, description, credit_hours, is_active, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      subject_id:   row.get(0)?,
      name:         row.get(1)?,
      code:         row.get(2)?,
      description:  row.get(3)?,
      credit_hours: row.get(4)?,
      is_active:    row.get(5)?,
      created_at:   row.get(6)?,
    })
  }

  pub fn into_subject(self) -> Result<Subject> {
    Ok(Subject {
      subject_id:   SubjectId(self.subject_id),
      name:         self.name,
      code:         self.code,
      description:  self.description,
      credit_hours: narrow("credit_hours", self.credit_hours)?,
      is_active:    self.is_active,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `classes` row.
pub struct RawClass {
  pub class_id:         i64,
  pub name:             String,
  pub code:             String,
  pub grade_level:      i64,
  pub section:          Option<String>,
  pub capacity:         i64,
  pub academic_year_id: i64,
  pub class_teacher_id: Option<i64>,
  pub is_active:        bool,
  pub created_at:       String,
}

impl RawClass {
  pub const COLUMNS: &'static str = "class_id, name, code, grade_level, section, \
                                     capacity, academic_year_id, class_teacher_id, \
                                     is_active, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      class_id:         row.get(0)?,
      name:             row.get(1)?,
      code:             row.get(2)?,
      grade_level:      row.get(3)?,
      section:          row.get(4)?,
      capacity:         row.get(5)?,
      academic_year_id: row.get(6)?,
      class_teacher_id: row.get(7)?,
      is_active:        row.get(8)?,
      created_at:       row.get(9)?,
    })
  }

  pub fn into_class(self) -> Result<SchoolClass> {
    Ok(SchoolClass {
      class_id:         ClassId(self.class_id),
      name:             self.name,
      code:             self.code,
      grade_level:      narrow("grade_level", self.grade_level)?,
      section:          self.section,
      capacity:         narrow("capacity", self.capacity)?,
      academic_year_id: AcademicYearId(self.academic_year_id),
      class_teacher_id: self.class_teacher_id.map(UserId),
      is_active:        self.is_active,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dates_use_iso_calendar_format() {
    let d = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
    assert_eq!(encode_date(d), "2025-06-30");
    assert_eq!(decode_date("2025-06-30").unwrap(), d);
    assert!(decode_date("30/06/2025").is_err());
  }

  #[test]
  fn unknown_user_type_is_a_decode_error() {
    assert!(matches!(decode_user_type("janitor"), Err(Error::Decode(_))));
  }

  #[test]
  fn out_of_range_integers_are_rejected() {
    assert!(narrow::<u8>("grade_level", 300).is_err());
    assert_eq!(narrow::<u16>("capacity", 30).unwrap(), 30);
  }
}
