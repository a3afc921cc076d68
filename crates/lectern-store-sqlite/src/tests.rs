//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use lectern_core::{
  Error as CoreError, StoreFailure,
  academic::{NewAcademicYear, NewClass, NewSubject, SchoolClass, Subject},
  assignment::{AssignmentPair, ClassSubjectLink, ReconcileOutcome},
  ids::{AcademicYearId, ClassId, SubjectId, UserId},
  store::SchoolStore,
  user::{NewTeacher, TeacherUpdate, User},
};
use pretty_assertions::assert_eq;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_year(code: &str, is_active: bool) -> NewAcademicYear {
  NewAcademicYear {
    name: code.to_lowercase(),
    code: code.into(),
    start_date: date(2024, 9, 1),
    end_date: date(2025, 6, 30),
    description: None,
    is_active,
  }
}

async fn teacher(s: &SqliteStore, n: u32) -> User {
  s.add_teacher(NewTeacher {
    name:  format!("Teacher {n}"),
    email: format!("teacher{n}@school.test"),
    phone: format!("555-{n:04}"),
  })
  .await
  .unwrap()
}

async fn subject(s: &SqliteStore, code: &str) -> Subject {
  s.add_subject(NewSubject {
    name:         code.to_lowercase(),
    code:         code.into(),
    description:  None,
    credit_hours: 3,
    is_active:    true,
  })
  .await
  .unwrap()
}

async fn class(
  s: &SqliteStore,
  code: &str,
  year: AcademicYearId,
  subjects: &[&Subject],
) -> SchoolClass {
  s.add_class(NewClass {
    name:             format!("Class {code}"),
    code:             code.into(),
    grade_level:      1,
    section:          Some("A".into()),
    capacity:         30,
    academic_year_id: year,
    class_teacher_id: None,
    subjects:         subjects.iter().map(|s| s.subject_id).collect(),
    is_active:        true,
  })
  .await
  .unwrap()
}

fn pair(c: &SchoolClass, s: &Subject) -> AssignmentPair {
  AssignmentPair::new(c.class_id, s.subject_id)
}

async fn owned(s: &SqliteStore, t: &User) -> Vec<AssignmentPair> {
  s.teacher_assignments(t.user_id)
    .await
    .unwrap()
    .iter()
    .map(ClassSubjectLink::pair)
    .collect()
}

fn sorted(mut pairs: Vec<AssignmentPair>) -> Vec<AssignmentPair> {
  pairs.sort();
  pairs
}

/// Three classes, three subjects, every class teaching every subject.
struct School {
  year:     AcademicYearId,
  classes:  Vec<SchoolClass>,
  subjects: Vec<Subject>,
}

async fn school(s: &SqliteStore) -> School {
  let year = s.add_academic_year(new_year("AY2024-25", true)).await.unwrap();
  let mut subjects = Vec::new();
  for code in ["MATH", "ENG", "SCI"] {
    subjects.push(subject(s, code).await);
  }
  let refs: Vec<&Subject> = subjects.iter().collect();
  let mut classes = Vec::new();
  for code in ["G1A", "G1B", "G2A"] {
    classes.push(class(s, code, year.academic_year_id, &refs).await);
  }
  School { year: year.academic_year_id, classes, subjects }
}

// ─── Teachers ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn teachers_get_sequential_usernames() {
  let s = store().await;
  let a = teacher(&s, 1).await;
  let b = teacher(&s, 2).await;
  assert_eq!(a.user_name, "TCH001");
  assert_eq!(b.user_name, "TCH002");
  assert!(a.is_teacher() && a.status);

  let listed = s.list_teachers().await.unwrap();
  assert_eq!(listed.len(), 2);
  assert_eq!(s.get_user(a.user_id).await.unwrap(), Some(a));
}

#[tokio::test]
async fn duplicate_teacher_email_is_rejected() {
  let s = store().await;
  teacher(&s, 1).await;
  let err = s
    .add_teacher(NewTeacher {
      name:  "Other".into(),
      email: "teacher1@school.test".into(),
      phone: "555-9999".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::Duplicate { field: "email", .. })
  ));
  assert!(!err.is_retryable());
}

#[tokio::test]
async fn usernames_are_not_reissued_after_a_delete() {
  let s = store().await;
  let a = teacher(&s, 1).await;
  let b = teacher(&s, 2).await;
  s.delete_teacher(a.user_id).await.unwrap();

  let c = teacher(&s, 3).await;
  assert_eq!(b.user_name, "TCH002");
  assert_eq!(c.user_name, "TCH003");
  assert_eq!(s.get_user(a.user_id).await.unwrap(), None);
}

#[tokio::test]
async fn teacher_update_keeps_its_own_email_but_not_anothers() {
  let s = store().await;
  let a = teacher(&s, 1).await;
  let b = teacher(&s, 2).await;

  let updated = s
    .update_teacher(a.user_id, TeacherUpdate {
      name:   "Renamed".into(),
      email:  a.email.clone(),
      phone:  "555-9999".into(),
      status: false,
    })
    .await
    .unwrap();
  assert_eq!(updated.name, "Renamed");
  assert_eq!(updated.user_name, a.user_name);
  assert!(!updated.status);

  let err = s
    .update_teacher(a.user_id, TeacherUpdate {
      name:   "Renamed".into(),
      email:  b.email.clone(),
      phone:  "555-9999".into(),
      status: true,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::Duplicate { field: "email", .. })));
}

#[tokio::test]
async fn deleting_a_teacher_unassigns_their_links() {
  let s = store().await;
  let School { year, classes, subjects } = school(&s).await;
  let t = teacher(&s, 1).await;
  let (c, math) = (&classes[0], &subjects[0]);
  s.replace_grants(t.user_id, year, vec![math.subject_id]).await.unwrap();
  s.reconcile_assignments(t.user_id, &[pair(c, math)]).await.unwrap();

  s.delete_teacher(t.user_id).await.unwrap();

  let links = s.class_links(c.class_id).await.unwrap();
  assert_eq!(links.len(), 3);
  assert!(links.iter().all(|l| l.teacher_id.is_none()));
}

#[tokio::test]
async fn class_teacher_cannot_be_deleted() {
  let s = store().await;
  let School { year, .. } = school(&s).await;
  let t = teacher(&s, 1).await;
  s.add_class(NewClass {
    name:             "Homeroom".into(),
    code:             "HR1".into(),
    grade_level:      3,
    section:          None,
    capacity:         20,
    academic_year_id: year,
    class_teacher_id: Some(t.user_id),
    subjects:         vec![],
    is_active:        true,
  })
  .await
  .unwrap();

  let err = s.delete_teacher(t.user_id).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::InUse { .. })), "{err}");
  assert!(s.get_user(t.user_id).await.unwrap().is_some());
}

// ─── Academic years, subjects, classes ───────────────────────────────────────

#[tokio::test]
async fn only_one_academic_year_is_active() {
  let s = store().await;
  let first = s.add_academic_year(new_year("AY2024-25", true)).await.unwrap();
  let second = s.add_academic_year(new_year("AY2025-26", true)).await.unwrap();

  let active = s.list_academic_years(true).await.unwrap();
  assert_eq!(active.len(), 1);
  assert_eq!(active[0].academic_year_id, second.academic_year_id);

  let reactivated = s
    .activate_academic_year(first.academic_year_id)
    .await
    .unwrap();
  assert!(reactivated.is_active);
  let active = s.list_academic_years(true).await.unwrap();
  assert_eq!(active.len(), 1);
  assert_eq!(active[0].academic_year_id, first.academic_year_id);
  assert_eq!(s.list_academic_years(false).await.unwrap().len(), 2);
}

#[tokio::test]
async fn subject_codes_are_unique_case_insensitively() {
  let s = store().await;
  let math = subject(&s, "math").await;
  assert_eq!(math.code, "MATH");
  let err = s
    .add_subject(NewSubject {
      name:         "Maths again".into(),
      code:         "Math".into(),
      description:  None,
      credit_hours: 2,
      is_active:    true,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::Duplicate { field: "code", .. })));
}

#[tokio::test]
async fn new_class_gets_unassigned_links_for_its_subjects() {
  let s = store().await;
  let School { classes, subjects, .. } = school(&s).await;

  let links = s.class_links(classes[0].class_id).await.unwrap();
  assert_eq!(links.len(), subjects.len());
  assert!(links.iter().all(|l| l.teacher_id.is_none()));
  assert_eq!(
    s.get_class(classes[0].class_id).await.unwrap().unwrap().code,
    "G1A"
  );
}

#[tokio::test]
async fn class_with_unknown_year_is_rejected() {
  let s = store().await;
  let err = s
    .add_class(NewClass {
      name:             "Ghost".into(),
      code:             "GHOST".into(),
      grade_level:      3,
      section:          None,
      capacity:         20,
      academic_year_id: AcademicYearId(99),
      class_teacher_id: None,
      subjects:         vec![],
      is_active:        true,
    })
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::AcademicYearNotFound(AcademicYearId(99)))
  ));
  assert!(s.list_classes(false).await.unwrap().is_empty());
}

#[tokio::test]
async fn class_teacher_must_be_a_teacher() {
  let s = store().await;
  let year = s.add_academic_year(new_year("AY2024-25", true)).await.unwrap();
  let err = s
    .add_class(NewClass {
      name:             "Grade 1-A".into(),
      code:             "G1A".into(),
      grade_level:      1,
      section:          None,
      capacity:         20,
      academic_year_id: year.academic_year_id,
      class_teacher_id: Some(UserId(42)),
      subjects:         vec![],
      is_active:        true,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::UserNotFound(UserId(42)))));
}

#[tokio::test]
async fn replacing_class_subjects_keeps_surviving_teachers() {
  let s = store().await;
  let School { classes, subjects, .. } = school(&s).await;
  let t = teacher(&s, 1).await;
  let extra = subject(&s, "ART").await;
  let c = &classes[0];

  s.reconcile_assignments(t.user_id, &[pair(c, &subjects[0]), pair(c, &subjects[1])])
    .await
    .unwrap();

  let links = s
    .set_class_subjects(c.class_id, vec![subjects[0].subject_id, extra.subject_id])
    .await
    .unwrap();

  let by_subject: Vec<(SubjectId, Option<UserId>)> =
    links.iter().map(|l| (l.subject_id, l.teacher_id)).collect();
  assert_eq!(by_subject, vec![
    (subjects[0].subject_id, Some(t.user_id)),
    (extra.subject_id, None),
  ]);
  assert_eq!(owned(&s, &t).await, vec![pair(c, &subjects[0])]);
}

#[tokio::test]
async fn replacing_class_subjects_with_nothing_is_rejected() {
  let s = store().await;
  let School { classes, subjects, .. } = school(&s).await;
  let t = teacher(&s, 1).await;
  let c = &classes[0];
  s.reconcile_assignments(t.user_id, &[pair(c, &subjects[0])]).await.unwrap();

  let err = s.set_class_subjects(c.class_id, vec![]).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::Invalid { field: "subjects", .. })));
  assert_eq!(s.class_links(c.class_id).await.unwrap().len(), 3);
  assert_eq!(owned(&s, &t).await, vec![pair(c, &subjects[0])]);
}

fn class_update(c: &SchoolClass, code: &str, subjects: Vec<SubjectId>) -> NewClass {
  NewClass {
    name:             c.name.clone(),
    code:             code.into(),
    grade_level:      c.grade_level,
    section:          c.section.clone(),
    capacity:         c.capacity,
    academic_year_id: c.academic_year_id,
    class_teacher_id: c.class_teacher_id,
    subjects,
    is_active:        c.is_active,
  }
}

#[tokio::test]
async fn class_update_syncs_subjects_only_when_some_are_given() {
  let s = store().await;
  let School { classes, subjects, .. } = school(&s).await;
  let t = teacher(&s, 1).await;
  let c = &classes[0];
  s.reconcile_assignments(t.user_id, &[pair(c, &subjects[1])]).await.unwrap();

  let renamed = s
    .update_class(c.class_id, class_update(c, "g1x", vec![]))
    .await
    .unwrap();
  assert_eq!(renamed.code, "G1X");
  assert_eq!(s.class_links(c.class_id).await.unwrap().len(), 3);

  s.update_class(c.class_id, class_update(c, "G1X", vec![subjects[1].subject_id]))
    .await
    .unwrap();
  let links = s.class_links(c.class_id).await.unwrap();
  assert_eq!(links.len(), 1);
  assert_eq!(links[0].teacher_id, Some(t.user_id));

  let err = s
    .update_class(c.class_id, class_update(c, "G1B", vec![]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::Duplicate { field: "code", .. })));
}

#[tokio::test]
async fn updating_a_year_to_active_deactivates_the_others() {
  let s = store().await;
  let first = s.add_academic_year(new_year("AY2024-25", true)).await.unwrap();
  let second = s.add_academic_year(new_year("AY2025-26", false)).await.unwrap();

  let mut edit = new_year("AY2025-26", false);
  edit.description = Some("next year".into());
  s.update_academic_year(second.academic_year_id, edit).await.unwrap();
  let active = s.list_academic_years(true).await.unwrap();
  assert_eq!(active[0].academic_year_id, first.academic_year_id);

  s.update_academic_year(second.academic_year_id, new_year("AY2025-26", true))
    .await
    .unwrap();
  let active = s.list_academic_years(true).await.unwrap();
  assert_eq!(active.len(), 1);
  assert_eq!(active[0].academic_year_id, second.academic_year_id);
}

#[tokio::test]
async fn referenced_years_and_subjects_cannot_be_deleted() {
  let s = store().await;
  let School { year, classes, subjects } = school(&s).await;
  let spare = subject(&s, "ART").await;
  let t = teacher(&s, 1).await;
  s.replace_grants(t.user_id, year, vec![spare.subject_id]).await.unwrap();

  let err = s.delete_academic_year(year).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::InUse { .. })), "{err}");
  let err = s.delete_subject(subjects[0].subject_id).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::InUse { .. })), "{err}");

  s.delete_subject(spare.subject_id).await.unwrap();
  assert!(s.list_grants(t.user_id, Some(year)).await.unwrap().is_empty());

  for c in &classes {
    s.delete_class(c.class_id).await.unwrap();
  }
  assert_eq!(s.get_class(classes[0].class_id).await.unwrap(), None);
  let links: i64 = s
    .conn
    .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM class_subject", [], |r| r.get(0))?))
    .await
    .unwrap();
  assert_eq!(links, 0);
  s.delete_academic_year(year).await.unwrap();
  assert_eq!(s.get_academic_year(year).await.unwrap(), None);
}

#[tokio::test]
async fn subject_update_checks_code_against_other_subjects() {
  let s = store().await;
  let math = subject(&s, "MATH").await;
  subject(&s, "ENG").await;
  let edit = |code: &str| NewSubject {
    name:         "Mathematics".into(),
    code:         code.into(),
    description:  Some("numbers".into()),
    credit_hours: 4,
    is_active:    true,
  };

  let updated = s.update_subject(math.subject_id, edit("math")).await.unwrap();
  assert_eq!(updated.credit_hours, 4);
  assert_eq!(updated.code, "MATH");

  let err = s.update_subject(math.subject_id, edit("ENG")).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::Duplicate { field: "code", .. })));
  let err = s.update_subject(SubjectId(999), edit("X")).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::SubjectNotFound(SubjectId(999)))));
}

// ─── Reconciliation ──────────────────────────────────────────────────────────

#[tokio::test]
async fn reconcile_moves_teacher_and_clears_dropped_pairs() {
  let s = store().await;
  let School { classes, subjects, .. } = school(&s).await;
  let t = teacher(&s, 5).await;
  // No class teaches ART yet, so (c3, ART) needs a new link.
  let art = subject(&s, "ART").await;

  let (c1, c2, c3) = (&classes[0], &classes[1], &classes[2]);
  let (math, eng) = (&subjects[0], &subjects[1]);

  s.reconcile_assignments(t.user_id, &[pair(c1, math), pair(c2, math)])
    .await
    .unwrap();

  let outcome = s
    .reconcile_assignments(t.user_id, &[pair(c2, math), pair(c3, &art), pair(c3, eng)])
    .await
    .unwrap();

  assert_eq!(outcome, ReconcileOutcome { cleared: 2, updated: 2, inserted: 1 });
  assert_eq!(
    owned(&s, &t).await,
    sorted(vec![pair(c2, math), pair(c3, &art), pair(c3, eng)])
  );
  let c1_math = s
    .class_links(c1.class_id)
    .await
    .unwrap()
    .into_iter()
    .find(|l| l.subject_id == math.subject_id)
    .unwrap();
  assert_eq!(c1_math.teacher_id, None, "dropped pair is cleared, not deleted");
}

#[tokio::test]
async fn reconcile_is_idempotent() {
  let s = store().await;
  let School { classes, subjects, .. } = school(&s).await;
  let t = teacher(&s, 1).await;
  let target = [
    pair(&classes[0], &subjects[0]),
    pair(&classes[1], &subjects[2]),
    pair(&classes[1], &subjects[2]),
  ];

  s.reconcile_assignments(t.user_id, &target).await.unwrap();
  let first: Vec<Vec<ClassSubjectLink>> = {
    let mut all = Vec::new();
    for c in &classes {
      all.push(s.class_links(c.class_id).await.unwrap());
    }
    all
  };

  let outcome = s.reconcile_assignments(t.user_id, &target).await.unwrap();
  assert_eq!(outcome, ReconcileOutcome { cleared: 2, updated: 2, inserted: 0 });
  for (c, before) in classes.iter().zip(first) {
    assert_eq!(s.class_links(c.class_id).await.unwrap(), before);
  }
}

#[tokio::test]
async fn colliding_pair_transfers_ownership_only_for_that_pair() {
  let s = store().await;
  let School { classes, subjects, .. } = school(&s).await;
  let t = teacher(&s, 5).await;
  let t2 = teacher(&s, 7).await;

  let contested = pair(&classes[0], &subjects[2]);
  let kept = pair(&classes[1], &subjects[2]);
  s.reconcile_assignments(t2.user_id, &[contested, kept])
    .await
    .unwrap();

  s.reconcile_assignments(t.user_id, &[contested]).await.unwrap();

  assert_eq!(owned(&s, &t).await, vec![contested]);
  assert_eq!(owned(&s, &t2).await, vec![kept]);
}

#[tokio::test]
async fn empty_target_revokes_all_assignments() {
  let s = store().await;
  let School { classes, subjects, .. } = school(&s).await;
  let t = teacher(&s, 1).await;
  let other = teacher(&s, 2).await;
  s.reconcile_assignments(other.user_id, &[pair(&classes[2], &subjects[0])])
    .await
    .unwrap();
  s.reconcile_assignments(t.user_id, &[
    pair(&classes[0], &subjects[0]),
    pair(&classes[1], &subjects[1]),
  ])
  .await
  .unwrap();

  let outcome = s.reconcile_assignments(t.user_id, &[]).await.unwrap();

  assert_eq!(outcome.cleared, 2);
  assert!(owned(&s, &t).await.is_empty());
  assert_eq!(owned(&s, &other).await, vec![pair(&classes[2], &subjects[0])]);
  let total: usize = {
    let mut n = 0;
    for c in &classes {
      n += s.class_links(c.class_id).await.unwrap().len();
    }
    n
  };
  assert_eq!(total, classes.len() * subjects.len(), "no rows deleted");
}

#[tokio::test]
async fn invalid_pair_rejects_the_whole_call_and_changes_nothing() {
  let s = store().await;
  let School { classes, subjects, .. } = school(&s).await;
  let t = teacher(&s, 1).await;
  let before = vec![pair(&classes[0], &subjects[0])];
  s.reconcile_assignments(t.user_id, &before).await.unwrap();

  let err = s
    .reconcile_assignments(t.user_id, &[
      pair(&classes[1], &subjects[1]),
      AssignmentPair::new(ClassId(999), subjects[0].subject_id),
    ])
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::ClassNotFound(ClassId(999)))));

  let err = s
    .reconcile_assignments(t.user_id, &[AssignmentPair::new(
      classes[1].class_id,
      SubjectId(999),
    )])
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::SubjectNotFound(SubjectId(999)))));

  assert_eq!(owned(&s, &t).await, before);
}

#[tokio::test]
async fn failure_while_assigning_keeps_the_previous_set() {
  let s = store().await;
  let School { classes, subjects, .. } = school(&s).await;
  let t = teacher(&s, 1).await;
  let before = vec![pair(&classes[0], &subjects[0])];
  s.reconcile_assignments(t.user_id, &before).await.unwrap();

  // Let the clearing pass through and abort once the new pair is assigned.
  let (class_id, subject_id) = (classes[1].class_id.get(), subjects[1].subject_id.get());
  s.conn
    .call(move |conn| {
      conn.execute_batch(&format!(
        "CREATE TRIGGER fail_assign BEFORE UPDATE ON class_subject
         WHEN NEW.teacher_id IS NOT NULL
          AND NEW.class_id = {class_id} AND NEW.subject_id = {subject_id}
         BEGIN SELECT RAISE(ABORT, 'assignment refused'); END;"
      ))?;
      Ok(())
    })
    .await
    .unwrap();

  let err = s
    .reconcile_assignments(t.user_id, &[pair(&classes[1], &subjects[1])])
    .await
    .unwrap_err();
  assert!(err.is_retryable(), "{err}");
  assert!(err.domain().is_none());
  assert_eq!(owned(&s, &t).await, before);
}

#[tokio::test]
async fn reconcile_requires_a_teacher() {
  let s = store().await;
  let School { classes, subjects, .. } = school(&s).await;

  let err = s
    .reconcile_assignments(UserId(404), &[pair(&classes[0], &subjects[0])])
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::UserNotFound(UserId(404)))));
  assert!(err.domain().is_some_and(CoreError::is_not_found));
}

#[tokio::test]
async fn ungranted_pairs_are_still_assigned() {
  let s = store().await;
  let School { year, classes, subjects } = school(&s).await;
  let t = teacher(&s, 1).await;
  s.replace_grants(t.user_id, year, vec![subjects[0].subject_id])
    .await
    .unwrap();

  s.reconcile_assignments(t.user_id, &[pair(&classes[0], &subjects[1])])
    .await
    .unwrap();

  assert_eq!(owned(&s, &t).await, vec![pair(&classes[0], &subjects[1])]);
}

// ─── Grants and the grant filter ─────────────────────────────────────────────

#[tokio::test]
async fn replace_grants_only_touches_the_given_year() {
  let s = store().await;
  let School { year, subjects, .. } = school(&s).await;
  let next = s
    .add_academic_year(new_year("AY2025-26", false))
    .await
    .unwrap()
    .academic_year_id;
  let t = teacher(&s, 1).await;

  s.replace_grants(t.user_id, year, vec![subjects[0].subject_id, subjects[1].subject_id])
    .await
    .unwrap();
  s.replace_grants(t.user_id, next, vec![subjects[2].subject_id])
    .await
    .unwrap();
  let replaced = s
    .replace_grants(t.user_id, year, vec![subjects[1].subject_id])
    .await
    .unwrap();

  assert_eq!(replaced.len(), 1);
  assert_eq!(replaced[0].subject_id, subjects[1].subject_id);
  assert_eq!(s.list_grants(t.user_id, None).await.unwrap().len(), 2);
  assert_eq!(s.list_grants(t.user_id, Some(next)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn grants_for_a_non_teacher_are_rejected() {
  let s = store().await;
  let School { year, .. } = school(&s).await;
  let err = s
    .replace_grants(UserId(77), year, vec![])
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::UserNotFound(UserId(77)))));
}

#[tokio::test]
async fn assignable_subjects_intersect_grants_with_class_subjects() {
  let s = store().await;
  let School { year, subjects, .. } = school(&s).await;
  let art = subject(&s, "ART").await;
  let music = subject(&s, "MUS").await;
  let narrow = class(&s, "G3A", year, &[&subjects[0], &art]).await;
  let t = teacher(&s, 1).await;
  s.replace_grants(t.user_id, year, vec![
    subjects[0].subject_id,
    subjects[1].subject_id,
    music.subject_id,
  ])
  .await
  .unwrap();

  let legal = s
    .assignable_subjects(t.user_id, year, narrow.class_id)
    .await
    .unwrap();

  let ids: Vec<SubjectId> = legal.iter().map(|s| s.subject_id).collect();
  assert_eq!(ids, vec![subjects[0].subject_id]);
}

#[tokio::test]
async fn assignment_board_lists_legal_choices_and_owners() {
  let s = store().await;
  let School { year, classes, subjects } = school(&s).await;
  let t = teacher(&s, 1).await;
  let other = teacher(&s, 2).await;
  s.replace_grants(t.user_id, year, vec![subjects[0].subject_id, subjects[2].subject_id])
    .await
    .unwrap();
  s.reconcile_assignments(t.user_id, &[pair(&classes[0], &subjects[0])])
    .await
    .unwrap();
  s.reconcile_assignments(other.user_id, &[pair(&classes[0], &subjects[2])])
    .await
    .unwrap();

  let board = s.assignment_board(t.user_id, year).await.unwrap();

  assert_eq!(board.len(), classes.len());
  let first = &board[0];
  assert_eq!(first.class.class_id, classes[0].class_id);
  // Subjects follow code order: MATH before SCI.
  let choices: Vec<_> = first
    .subjects
    .iter()
    .map(|c| (c.subject.code.clone(), c.teacher_id, c.assigned))
    .collect();
  assert_eq!(choices, vec![
    ("MATH".to_string(), Some(t.user_id), true),
    ("SCI".to_string(), Some(other.user_id), false),
  ]);
  assert!(board[1].subjects.iter().all(|c| !c.assigned));
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn assignments_survive_reopening_the_file() {
  let dir = tempfile::TempDir::new().unwrap();
  let path = dir.path().join("lectern.db");

  let (t, expected) = {
    let s = SqliteStore::open(&path).await.unwrap();
    let School { classes, subjects, .. } = school(&s).await;
    let t = teacher(&s, 1).await;
    let target = vec![pair(&classes[0], &subjects[0]), pair(&classes[2], &subjects[1])];
    s.reconcile_assignments(t.user_id, &target).await.unwrap();
    (t, sorted(target))
  };

  let reopened = SqliteStore::open(&path).await.unwrap();
  assert_eq!(owned(&reopened, &t).await, expected);
}
