//! The `SchoolStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `lectern-store-sqlite`).
//! Higher layers (`lectern-api`, `lectern-server`) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  academic::{
    AcademicYear, NewAcademicYear, NewClass, NewSubject, SchoolClass, Subject,
  },
  assignment::{
    AssignmentPair, ClassChoices, ClassSubjectLink, ReconcileOutcome,
    TeacherSubjectGrant,
  },
  error::StoreFailure,
  ids::{AcademicYearId, ClassId, SubjectId, UserId},
  user::{NewTeacher, TeacherUpdate, User},
};

/// Abstraction over a Lectern store backend.
///
/// Every write validates its input and its references before touching
/// storage; a validation failure changes nothing. Multi-row writes are
/// atomic.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SchoolStore: Send + Sync {
  type Error: std::error::Error + StoreFailure + Send + Sync + 'static;

  // ── Teachers ──────────────────────────────────────────────────────────

  /// Create an active teacher account with a generated `TCHnnn` user name.
  fn add_teacher(
    &self,
    input: NewTeacher,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user of any type. Returns `None` if not found.
  fn get_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// All teachers, newest first.
  fn list_teachers(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// Replace a teacher's contact details and status. Email and phone must
  /// stay unique among all other users.
  fn update_teacher(
    &self,
    id: UserId,
    input: TeacherUpdate,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Delete a teacher. Their class/subject links are unassigned and their
  /// grants removed. Refused while a class names them as class teacher.
  fn delete_teacher(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Academic years ────────────────────────────────────────────────────

  /// Create an academic year. If it is active, every other year is
  /// deactivated in the same transaction.
  fn add_academic_year(
    &self,
    input: NewAcademicYear,
  ) -> impl Future<Output = Result<AcademicYear, Self::Error>> + Send + '_;

  /// Make `id` the only active academic year.
  fn activate_academic_year(
    &self,
    id: AcademicYearId,
  ) -> impl Future<Output = Result<AcademicYear, Self::Error>> + Send + '_;

  /// Replace every field of an academic year. Making it active deactivates
  /// every other year; other years are left alone otherwise.
  fn update_academic_year(
    &self,
    id: AcademicYearId,
    input: NewAcademicYear,
  ) -> impl Future<Output = Result<AcademicYear, Self::Error>> + Send + '_;

  /// Delete an academic year and the grants made for it. Refused while any
  /// class belongs to the year.
  fn delete_academic_year(
    &self,
    id: AcademicYearId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_academic_year(
    &self,
    id: AcademicYearId,
  ) -> impl Future<Output = Result<Option<AcademicYear>, Self::Error>> + Send + '_;

  /// Academic years ordered by start date, latest first.
  fn list_academic_years(
    &self,
    active_only: bool,
  ) -> impl Future<Output = Result<Vec<AcademicYear>, Self::Error>> + Send + '_;

  // ── Subjects ──────────────────────────────────────────────────────────

  fn add_subject(
    &self,
    input: NewSubject,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  fn update_subject(
    &self,
    id: SubjectId,
    input: NewSubject,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  /// Delete a subject and every grant for it. Refused while any class
  /// teaches it.
  fn delete_subject(
    &self,
    id: SubjectId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_subject(
    &self,
    id: SubjectId,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  /// Subjects ordered by code.
  fn list_subjects(
    &self,
    active_only: bool,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  // ── Classes ───────────────────────────────────────────────────────────

  /// Create a class and one unassigned link per listed subject.
  fn add_class(
    &self,
    input: NewClass,
  ) -> impl Future<Output = Result<SchoolClass, Self::Error>> + Send + '_;

  /// Replace every field of a class. A non-empty `subjects` list is synced
  /// as by [`SchoolStore::set_class_subjects`]; an empty one leaves the
  /// class's links as they are.
  fn update_class(
    &self,
    id: ClassId,
    input: NewClass,
  ) -> impl Future<Output = Result<SchoolClass, Self::Error>> + Send + '_;

  /// Delete a class together with its links.
  fn delete_class(
    &self,
    id: ClassId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_class(
    &self,
    id: ClassId,
  ) -> impl Future<Output = Result<Option<SchoolClass>, Self::Error>> + Send + '_;

  /// Classes ordered by grade level, then section.
  fn list_classes(
    &self,
    active_only: bool,
  ) -> impl Future<Output = Result<Vec<SchoolClass>, Self::Error>> + Send + '_;

  /// Replace the set of subjects taught in a class.
  ///
  /// Links for subjects no longer listed are removed, new subjects get an
  /// unassigned link, and links that survive keep their teacher. An empty
  /// list is rejected.
  fn set_class_subjects(
    &self,
    class: ClassId,
    subjects: Vec<SubjectId>,
  ) -> impl Future<Output = Result<Vec<ClassSubjectLink>, Self::Error>> + Send + '_;

  /// Every link of one class, ordered by subject.
  fn class_links(
    &self,
    class: ClassId,
  ) -> impl Future<Output = Result<Vec<ClassSubjectLink>, Self::Error>> + Send + '_;

  // ── Grants ────────────────────────────────────────────────────────────

  /// Replace `teacher`'s grants for `year` with exactly `subjects`.
  /// Grants for other years are untouched.
  fn replace_grants(
    &self,
    teacher: UserId,
    year: AcademicYearId,
    subjects: Vec<SubjectId>,
  ) -> impl Future<Output = Result<Vec<TeacherSubjectGrant>, Self::Error>> + Send + '_;

  /// `teacher`'s grants, optionally restricted to one year.
  fn list_grants(
    &self,
    teacher: UserId,
    year: Option<AcademicYearId>,
  ) -> impl Future<Output = Result<Vec<TeacherSubjectGrant>, Self::Error>> + Send + '_;

  // ── Assignments ───────────────────────────────────────────────────────

  /// Make the set of links attributed to `teacher` exactly `pairs`.
  ///
  /// Links dropped from the set are unassigned, never deleted. Pairs already
  /// owned by another teacher are taken over (last writer wins). Pairs with
  /// no link yet get one. Duplicate pairs collapse; an empty slice revokes
  /// everything. Running the same call twice yields the same state.
  fn reconcile_assignments<'a>(
    &'a self,
    teacher: UserId,
    pairs: &'a [AssignmentPair],
  ) -> impl Future<Output = Result<ReconcileOutcome, Self::Error>> + Send + 'a;

  /// Links currently attributed to `teacher`, ordered by class then subject.
  fn teacher_assignments(
    &self,
    teacher: UserId,
  ) -> impl Future<Output = Result<Vec<ClassSubjectLink>, Self::Error>> + Send + '_;

  // ── Grant filter ──────────────────────────────────────────────────────

  /// Subjects of `class` that `teacher` holds a grant for in `year`.
  fn assignable_subjects(
    &self,
    teacher: UserId,
    year: AcademicYearId,
    class: ClassId,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  /// Every active class with the subjects `teacher` may be assigned in
  /// `year` and who currently holds each.
  fn assignment_board(
    &self,
    teacher: UserId,
    year: AcademicYearId,
  ) -> impl Future<Output = Result<Vec<ClassChoices>, Self::Error>> + Send + '_;
}
