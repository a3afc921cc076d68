//! Junction rows linking teachers, classes and subjects.

use serde::{Deserialize, Serialize};

use crate::{
  academic::{SchoolClass, Subject},
  ids::{AcademicYearId, ClassId, SubjectId, UserId},
};

/// The key of a [`ClassSubjectLink`]: one subject taught in one class.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
pub struct AssignmentPair {
  pub class_id:   ClassId,
  pub subject_id: SubjectId,
}

impl AssignmentPair {
  pub fn new(class_id: ClassId, subject_id: SubjectId) -> Self {
    Self { class_id, subject_id }
  }
}

/// "This subject is taught in this class, currently by this teacher (or by
/// no one)." The row outlives any particular teacher; unassigning only
/// clears `teacher_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSubjectLink {
  pub class_id:   ClassId,
  pub subject_id: SubjectId,
  pub teacher_id: Option<UserId>,
}

impl ClassSubjectLink {
  pub fn pair(&self) -> AssignmentPair {
    AssignmentPair::new(self.class_id, self.subject_id)
  }
}

/// "This teacher may teach this subject in this academic year."
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
pub struct TeacherSubjectGrant {
  pub teacher_id:       UserId,
  pub subject_id:       SubjectId,
  pub academic_year_id: AcademicYearId,
}

/// Row counts touched by one reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOutcome {
  /// Rows whose teacher was cleared in the first phase.
  pub cleared:  usize,
  /// Existing rows (re)attributed to the teacher.
  pub updated:  usize,
  /// Rows created because the pair had no link yet.
  pub inserted: usize,
}

// ─── Assignment board ────────────────────────────────────────────────────────

/// One subject a teacher may legally be assigned in a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectChoice {
  pub subject:    Subject,
  /// Whoever currently teaches this subject in this class.
  pub teacher_id: Option<UserId>,
  /// `true` when `teacher_id` is the teacher the board was built for.
  pub assigned:   bool,
}

/// A class together with the subject choices open to one teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassChoices {
  pub class:    SchoolClass,
  pub subjects: Vec<SubjectChoice>,
}
