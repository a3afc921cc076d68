//! Grant filter: which (class, subject) choices are legal for a teacher.
//!
//! A teacher may be offered a subject in a class when the class teaches the
//! subject and the teacher holds a grant for it in the academic year in
//! question. These functions are pure; backends load the rows and call them.

use std::collections::{BTreeSet, HashMap};

use crate::{
  academic::{SchoolClass, Subject},
  assignment::{
    AssignmentPair, ClassChoices, ClassSubjectLink, SubjectChoice,
    TeacherSubjectGrant,
  },
  ids::{AcademicYearId, SubjectId, UserId},
};

/// Subject ids `teacher` is granted in `year`.
pub fn granted_subjects(
  grants: &[TeacherSubjectGrant],
  teacher: UserId,
  year: AcademicYearId,
) -> BTreeSet<SubjectId> {
  grants
    .iter()
    .filter(|g| g.teacher_id == teacher && g.academic_year_id == year)
    .map(|g| g.subject_id)
    .collect()
}

/// The class subjects the teacher is allowed to teach in `year`, in the order
/// given.
pub fn legal_subjects<'a>(
  grants: &[TeacherSubjectGrant],
  teacher: UserId,
  year: AcademicYearId,
  class_subjects: &'a [Subject],
) -> Vec<&'a Subject> {
  let granted = granted_subjects(grants, teacher, year);
  class_subjects
    .iter()
    .filter(|s| granted.contains(&s.subject_id))
    .collect()
}

/// Pairs in `pairs` whose subject the teacher holds no grant for in any year.
///
/// Assignments outside a grant are allowed (substitute teachers); this only
/// reports them.
pub fn ungranted_pairs(
  grants: &[TeacherSubjectGrant],
  teacher: UserId,
  pairs: &BTreeSet<AssignmentPair>,
) -> Vec<AssignmentPair> {
  let granted: BTreeSet<SubjectId> = grants
    .iter()
    .filter(|g| g.teacher_id == teacher)
    .map(|g| g.subject_id)
    .collect();
  pairs
    .iter()
    .filter(|p| !granted.contains(&p.subject_id))
    .copied()
    .collect()
}

/// Build the assignment board for `teacher` in `year`.
///
/// `classes` supplies each class with its links; `subjects` must contain
/// every subject those links reference (links to unknown subjects are
/// skipped). Classes keep their input order; subjects within a class follow
/// the order of `subjects`.
pub fn assignment_board(
  grants: &[TeacherSubjectGrant],
  teacher: UserId,
  year: AcademicYearId,
  classes: Vec<(SchoolClass, Vec<ClassSubjectLink>)>,
  subjects: &[Subject],
) -> Vec<ClassChoices> {
  let granted = granted_subjects(grants, teacher, year);
  let order: HashMap<SubjectId, usize> = subjects
    .iter()
    .enumerate()
    .map(|(i, s)| (s.subject_id, i))
    .collect();

  classes
    .into_iter()
    .map(|(class, links)| {
      let mut choices: Vec<(usize, SubjectChoice)> = links
        .into_iter()
        .filter(|l| granted.contains(&l.subject_id))
        .filter_map(|l| {
          let idx = *order.get(&l.subject_id)?;
          Some((idx, SubjectChoice {
            subject:    subjects[idx].clone(),
            teacher_id: l.teacher_id,
            assigned:   l.teacher_id == Some(teacher),
          }))
        })
        .collect();
      choices.sort_by_key(|(idx, _)| *idx);
      ClassChoices {
        class,
        subjects: choices.into_iter().map(|(_, c)| c).collect(),
      }
    })
    .collect()
}
