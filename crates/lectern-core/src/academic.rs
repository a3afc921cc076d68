//! Academic entities: years, subjects and classes.
//!
//! Each `New*` input type carries a `validated` method returning the
//! normalised value the store persists. Referential checks (does the academic
//! year exist, is the class teacher a teacher) need storage and happen in the
//! backend.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  ids::{AcademicYearId, ClassId, SubjectId, UserId},
  rules,
};

fn default_true() -> bool { true }

// ─── Academic years ──────────────────────────────────────────────────────────

/// A school year. At most one is active at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcademicYear {
  pub academic_year_id: AcademicYearId,
  pub name:             String,
  pub code:             String,
  pub start_date:       NaiveDate,
  pub end_date:         NaiveDate,
  pub description:      Option<String>,
  pub is_active:        bool,
  pub created_at:       DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAcademicYear {
  pub name:        String,
  pub code:        String,
  pub start_date:  NaiveDate,
  pub end_date:    NaiveDate,
  pub description: Option<String>,
  #[serde(default)]
  pub is_active:   bool,
}

impl NewAcademicYear {
  pub fn validated(&self) -> Result<Self> {
    if self.end_date <= self.start_date {
      return Err(Error::invalid("end_date", "must be after start_date"));
    }
    Ok(Self {
      name:        rules::required_text("name", &self.name, 255)?,
      // Year codes keep their case, e.g. "AY2024-25".
      code:        rules::required_text("code", &self.code, 50)?,
      start_date:  self.start_date,
      end_date:    self.end_date,
      description: rules::optional_text(
        "description",
        self.description.as_deref(),
        usize::MAX,
      )?,
      is_active:   self.is_active,
    })
  }
}

// ─── Subjects ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  pub subject_id:   SubjectId,
  pub name:         String,
  /// Always uppercase.
  pub code:         String,
  pub description:  Option<String>,
  pub credit_hours: u8,
  pub is_active:    bool,
  pub created_at:   DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubject {
  pub name:         String,
  pub code:         String,
  pub description:  Option<String>,
  pub credit_hours: u8,
  #[serde(default = "default_true")]
  pub is_active:    bool,
}

impl NewSubject {
  pub fn validated(&self) -> Result<Self> {
    rules::in_range("credit_hours", self.credit_hours.into(), 1..=10)?;
    Ok(Self {
      name:         rules::required_text("name", &self.name, 255)?,
      code:         rules::code("code", &self.code, 20)?,
      description:  rules::optional_text(
        "description",
        self.description.as_deref(),
        usize::MAX,
      )?,
      credit_hours: self.credit_hours,
      is_active:    self.is_active,
    })
  }
}

// ─── Classes ─────────────────────────────────────────────────────────────────

/// A class (form, homeroom) within an academic year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolClass {
  pub class_id:         ClassId,
  pub name:             String,
  /// Always uppercase.
  pub code:             String,
  pub grade_level:      u8,
  pub section:          Option<String>,
  pub capacity:         u16,
  pub academic_year_id: AcademicYearId,
  /// The homeroom teacher, unrelated to per-subject assignments.
  pub class_teacher_id: Option<UserId>,
  pub is_active:        bool,
  pub created_at:       DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClass {
  pub name:             String,
  pub code:             String,
  pub grade_level:      u8,
  pub section:          Option<String>,
  pub capacity:         u16,
  pub academic_year_id: AcademicYearId,
  pub class_teacher_id: Option<UserId>,
  /// Subjects taught in the class; one unassigned link is created per entry.
  #[serde(default)]
  pub subjects:         Vec<SubjectId>,
  #[serde(default = "default_true")]
  pub is_active:        bool,
}

impl NewClass {
  pub fn validated(&self) -> Result<Self> {
    rules::in_range("grade_level", self.grade_level.into(), 1..=12)?;
    rules::in_range("capacity", self.capacity.into(), 1..=100)?;
    let mut subjects = self.subjects.clone();
    subjects.sort_unstable();
    subjects.dedup();
    Ok(Self {
      name: rules::required_text("name", &self.name, 255)?,
      code: rules::code("code", &self.code, 20)?,
      grade_level: self.grade_level,
      section: rules::optional_text("section", self.section.as_deref(), 10)?,
      capacity: self.capacity,
      academic_year_id: self.academic_year_id,
      class_teacher_id: self.class_teacher_id,
      subjects,
      is_active: self.is_active,
    })
  }
}
