//! [`SqliteStore`], the SQLite implementation of [`SchoolStore`].

use std::{collections::BTreeSet, path::Path};

use chrono::Utc;
use rusqlite::params;

use lectern_core::{
  academic::{
    AcademicYear, NewAcademicYear, NewClass, NewSubject, SchoolClass, Subject,
  },
  assignment::{
    AssignmentPair, ClassChoices, ClassSubjectLink, ReconcileOutcome,
    TeacherSubjectGrant,
  },
  grants,
  ids::{AcademicYearId, ClassId, SubjectId, UserId},
  reconcile::{AssignmentTable as _, reconcile},
  store::SchoolStore,
  user::{NewTeacher, TeacherUpdate, User, UserType, next_username},
};

use crate::{
  Error, Result,
  encode::{
    RawAcademicYear, RawClass, RawSubject, RawUser, encode_date, encode_dt,
    encode_user_type,
  },
  queries::{self, Checked, check},
  schema::SCHEMA,
  table::LinkTable,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Lectern store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, as used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` on the database thread. `f` reports validation failures in its
  /// inner `Result`; those surface as [`Error::Core`].
  async fn checked<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&mut rusqlite::Connection) -> rusqlite::Result<Checked<T>>
      + Send
      + 'static,
  {
    let checked = self
      .conn
      .call(move |conn| Ok(f(conn)?))
      .await?;
    Ok(checked?)
  }
}

fn decode_all<R, T>(raws: Vec<R>, decode: impl Fn(R) -> Result<T>) -> Result<Vec<T>> {
  raws.into_iter().map(decode).collect()
}

// ─── SchoolStore impl ────────────────────────────────────────────────────────

impl SchoolStore for SqliteStore {
  type Error = Error;

  // ── Teachers ──────────────────────────────────────────────────────────────

  async fn add_teacher(&self, input: NewTeacher) -> Result<User> {
    let input = input.validated()?;
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let kind_str = encode_user_type(UserType::Teacher);

    let (user_id, user_name) = self
      .checked(move |conn| {
        let tx = conn.transaction()?;
        check!(queries::check_unique(&tx, "users", "email", &input.email, None));
        check!(queries::check_unique(&tx, "users", "phone", &input.phone, None));

        let taken = queries::user_names(&tx, UserType::Teacher.username_prefix())?;
        let user_name =
          next_username(UserType::Teacher, taken.iter().map(String::as_str));

        tx.execute(
          "INSERT INTO users (name, email, phone, user_name, user_type, status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
          params![input.name, input.email, input.phone, user_name, kind_str, at_str],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok((UserId(id), user_name)))
      })
      .await?;

    tracing::info!(%user_id, %user_name, "teacher created");
    let raw = self
      .conn
      .call(move |conn| Ok(queries::user(conn, user_id)?))
      .await?
      .ok_or(lectern_core::Error::UserNotFound(user_id))?;
    raw.into_user()
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    let raw = self
      .conn
      .call(move |conn| Ok(queries::user(conn, id)?))
      .await?;
    raw.map(RawUser::into_user).transpose()
  }

  async fn list_teachers(&self) -> Result<Vec<User>> {
    let kind_str = encode_user_type(UserType::Teacher);
    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM users WHERE user_type = ?1
           ORDER BY created_at DESC, user_id DESC",
          RawUser::COLUMNS
        ))?;
        let rows = stmt
          .query_map(params![kind_str], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    decode_all(raws, RawUser::into_user)
  }

  async fn update_teacher(&self, id: UserId, input: TeacherUpdate) -> Result<User> {
    let input = input.validated()?;
    let raw = self
      .checked(move |conn| {
        let tx = conn.transaction()?;
        check!(queries::check_teacher(&tx, id));
        let me = Some(("user_id", id.get()));
        check!(queries::check_unique(&tx, "users", "email", &input.email, me));
        check!(queries::check_unique(&tx, "users", "phone", &input.phone, me));
        tx.execute(
          "UPDATE users SET name = ?2, email = ?3, phone = ?4, status = ?5
           WHERE user_id = ?1",
          params![id.get(), input.name, input.email, input.phone, input.status],
        )?;
        let raw = queries::user(&tx, id)?;
        tx.commit()?;
        Ok(raw.ok_or(lectern_core::Error::UserNotFound(id)))
      })
      .await?;
    tracing::info!(user_id = %id, "teacher updated");
    raw.into_user()
  }

  async fn delete_teacher(&self, id: UserId) -> Result<()> {
    let now = encode_dt(Utc::now());
    let (cleared, grants) = self
      .checked(move |conn| {
        let tx = conn.transaction()?;
        check!(queries::check_teacher(&tx, id));
        check!(queries::check_unreferenced(
          &tx,
          "SELECT COUNT(*) FROM classes WHERE class_teacher_id = ?1",
          id.get(),
          format_args!("teacher {id}"),
          "classes as their class teacher",
        ));
        let cleared = LinkTable::new(&tx, now).clear_teacher(id)?;
        let grants = tx.execute(
          "DELETE FROM teacher_subject WHERE teacher_id = ?1",
          params![id.get()],
        )?;
        tx.execute("DELETE FROM users WHERE user_id = ?1", params![id.get()])?;
        tx.commit()?;
        Ok(Ok((cleared, grants)))
      })
      .await?;
    tracing::info!(user_id = %id, cleared, grants, "teacher deleted");
    Ok(())
  }

  // ── Academic years ────────────────────────────────────────────────────────

  async fn add_academic_year(&self, input: NewAcademicYear) -> Result<AcademicYear> {
    let input = input.validated()?;
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let start_str = encode_date(input.start_date);
    let end_str = encode_date(input.end_date);
    let (code, name, description, is_active) = (
      input.code.clone(),
      input.name.clone(),
      input.description.clone(),
      input.is_active,
    );

    let id = self
      .checked(move |conn| {
        let tx = conn.transaction()?;
        check!(queries::check_unique(&tx, "academic_years", "code", &code, None));
        if is_active {
          tx.execute("UPDATE academic_years SET is_active = 0 WHERE is_active = 1", [])?;
        }
        tx.execute(
          "INSERT INTO academic_years
             (name, code, start_date, end_date, description, is_active, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          params![name, code, start_str, end_str, description, is_active, at_str],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(AcademicYearId(id)))
      })
      .await?;

    tracing::info!(academic_year_id = %id, code = %input.code, active = input.is_active, "academic year created");
    Ok(AcademicYear {
      academic_year_id: id,
      name: input.name,
      code: input.code,
      start_date: input.start_date,
      end_date: input.end_date,
      description: input.description,
      is_active: input.is_active,
      created_at,
    })
  }

  async fn activate_academic_year(&self, id: AcademicYearId) -> Result<AcademicYear> {
    let raw = self
      .checked(move |conn| {
        let tx = conn.transaction()?;
        check!(queries::check_academic_year(&tx, id));
        tx.execute(
          "UPDATE academic_years SET is_active = (academic_year_id = ?1)",
          params![id.get()],
        )?;
        let raw = queries::academic_year(&tx, id)?;
        tx.commit()?;
        Ok(raw.ok_or(lectern_core::Error::AcademicYearNotFound(id)))
      })
      .await?;
    tracing::info!(academic_year_id = %id, "academic year activated");
    raw.into_academic_year()
  }

  async fn update_academic_year(
    &self,
    id: AcademicYearId,
    input: NewAcademicYear,
  ) -> Result<AcademicYear> {
    let input = input.validated()?;
    let start_str = encode_date(input.start_date);
    let end_str = encode_date(input.end_date);
    let raw = self
      .checked(move |conn| {
        let tx = conn.transaction()?;
        check!(queries::check_academic_year(&tx, id));
        check!(queries::check_unique(
          &tx,
          "academic_years",
          "code",
          &input.code,
          Some(("academic_year_id", id.get())),
        ));
        if input.is_active {
          tx.execute(
            "UPDATE academic_years SET is_active = 0
             WHERE is_active = 1 AND academic_year_id != ?1",
            params![id.get()],
          )?;
        }
        tx.execute(
          "UPDATE academic_years
           SET name = ?2, code = ?3, start_date = ?4, end_date = ?5,
               description = ?6, is_active = ?7
           WHERE academic_year_id = ?1",
          params![
            id.get(),
            input.name,
            input.code,
            start_str,
            end_str,
            input.description,
            input.is_active,
          ],
        )?;
        let raw = queries::academic_year(&tx, id)?;
        tx.commit()?;
        Ok(raw.ok_or(lectern_core::Error::AcademicYearNotFound(id)))
      })
      .await?;
    tracing::info!(academic_year_id = %id, "academic year updated");
    raw.into_academic_year()
  }

  async fn delete_academic_year(&self, id: AcademicYearId) -> Result<()> {
    let grants = self
      .checked(move |conn| {
        let tx = conn.transaction()?;
        check!(queries::check_academic_year(&tx, id));
        check!(queries::check_unreferenced(
          &tx,
          "SELECT COUNT(*) FROM classes WHERE academic_year_id = ?1",
          id.get(),
          format_args!("academic year {id}"),
          "classes",
        ));
        let grants = tx.execute(
          "DELETE FROM teacher_subject WHERE academic_year_id = ?1",
          params![id.get()],
        )?;
        tx.execute(
          "DELETE FROM academic_years WHERE academic_year_id = ?1",
          params![id.get()],
        )?;
        tx.commit()?;
        Ok(Ok(grants))
      })
      .await?;
    tracing::info!(academic_year_id = %id, grants, "academic year deleted");
    Ok(())
  }

  async fn get_academic_year(&self, id: AcademicYearId) -> Result<Option<AcademicYear>> {
    let raw = self
      .conn
      .call(move |conn| Ok(queries::academic_year(conn, id)?))
      .await?;
    raw.map(RawAcademicYear::into_academic_year).transpose()
  }

  async fn list_academic_years(&self, active_only: bool) -> Result<Vec<AcademicYear>> {
    let raws: Vec<RawAcademicYear> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM academic_years WHERE (?1 = 0 OR is_active = 1)
           ORDER BY start_date DESC, academic_year_id DESC",
          RawAcademicYear::COLUMNS
        ))?;
        let rows = stmt
          .query_map(params![active_only], RawAcademicYear::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    decode_all(raws, RawAcademicYear::into_academic_year)
  }

  // ── Subjects ──────────────────────────────────────────────────────────────

  async fn add_subject(&self, input: NewSubject) -> Result<Subject> {
    let input = input.validated()?;
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let row = input.clone();

    let id = self
      .checked(move |conn| {
        let tx = conn.transaction()?;
        check!(queries::check_unique(&tx, "subjects", "code", &row.code, None));
        tx.execute(
          "INSERT INTO subjects (name, code, description, credit_hours, is_active, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          params![
            row.name,
            row.code,
            row.description,
            row.credit_hours,
            row.is_active,
            at_str,
          ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(SubjectId(id)))
      })
      .await?;

    tracing::info!(subject_id = %id, code = %input.code, "subject created");
    Ok(Subject {
      subject_id: id,
      name: input.name,
      code: input.code,
      description: input.description,
      credit_hours: input.credit_hours,
      is_active: input.is_active,
      created_at,
    })
  }

  async fn update_subject(&self, id: SubjectId, input: NewSubject) -> Result<Subject> {
    let input = input.validated()?;
    let raw = self
      .checked(move |conn| {
        let tx = conn.transaction()?;
        check!(queries::check_subjects(&tx, &[id]));
        check!(queries::check_unique(
          &tx,
          "subjects",
          "code",
          &input.code,
          Some(("subject_id", id.get())),
        ));
        tx.execute(
          "UPDATE subjects
           SET name = ?2, code = ?3, description = ?4, credit_hours = ?5, is_active = ?6
           WHERE subject_id = ?1",
          params![
            id.get(),
            input.name,
            input.code,
            input.description,
            input.credit_hours,
            input.is_active,
          ],
        )?;
        let raw = queries::subject(&tx, id)?;
        tx.commit()?;
        Ok(raw.ok_or(lectern_core::Error::SubjectNotFound(id)))
      })
      .await?;
    tracing::info!(subject_id = %id, "subject updated");
    raw.into_subject()
  }

  async fn delete_subject(&self, id: SubjectId) -> Result<()> {
    let grants = self
      .checked(move |conn| {
        let tx = conn.transaction()?;
        check!(queries::check_subjects(&tx, &[id]));
        check!(queries::check_unreferenced(
          &tx,
          "SELECT COUNT(*) FROM class_subject WHERE subject_id = ?1",
          id.get(),
          format_args!("subject {id}"),
          "classes",
        ));
        let grants = tx.execute(
          "DELETE FROM teacher_subject WHERE subject_id = ?1",
          params![id.get()],
        )?;
        tx.execute("DELETE FROM subjects WHERE subject_id = ?1", params![id.get()])?;
        tx.commit()?;
        Ok(Ok(grants))
      })
      .await?;
    tracing::info!(subject_id = %id, grants, "subject deleted");
    Ok(())
  }

  async fn get_subject(&self, id: SubjectId) -> Result<Option<Subject>> {
    let raw = self
      .conn
      .call(move |conn| Ok(queries::subject(conn, id)?))
      .await?;
    raw.map(RawSubject::into_subject).transpose()
  }

  async fn list_subjects(&self, active_only: bool) -> Result<Vec<Subject>> {
    let raws = self
      .conn
      .call(move |conn| Ok(queries::subjects(conn, active_only)?))
      .await?;
    decode_all(raws, RawSubject::into_subject)
  }

  // ── Classes ───────────────────────────────────────────────────────────────

  async fn add_class(&self, input: NewClass) -> Result<SchoolClass> {
    let input = input.validated()?;
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let row = input.clone();

    let id = self
      .checked(move |conn| {
        let tx = conn.transaction()?;
        check!(queries::check_unique(&tx, "classes", "code", &row.code, None));
        check!(queries::check_academic_year(&tx, row.academic_year_id));
        if let Some(teacher) = row.class_teacher_id {
          check!(queries::check_teacher(&tx, teacher));
        }
        check!(queries::check_subjects(&tx, &row.subjects));

        tx.execute(
          "INSERT INTO classes
             (name, code, grade_level, section, capacity, academic_year_id,
              class_teacher_id, is_active, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          params![
            row.name,
            row.code,
            row.grade_level,
            row.section,
            row.capacity,
            row.academic_year_id.get(),
            row.class_teacher_id.map(UserId::get),
            row.is_active,
            at_str,
          ],
        )?;
        let id = ClassId(tx.last_insert_rowid());
        queries::insert_unassigned_links(&tx, id, row.subjects.iter().copied(), &at_str)?;
        tx.commit()?;
        Ok(Ok(id))
      })
      .await?;

    tracing::info!(
      class_id = %id,
      code = %input.code,
      subjects = input.subjects.len(),
      "class created",
    );
    Ok(SchoolClass {
      class_id: id,
      name: input.name,
      code: input.code,
      grade_level: input.grade_level,
      section: input.section,
      capacity: input.capacity,
      academic_year_id: input.academic_year_id,
      class_teacher_id: input.class_teacher_id,
      is_active: input.is_active,
      created_at,
    })
  }

  async fn update_class(&self, id: ClassId, input: NewClass) -> Result<SchoolClass> {
    let input = input.validated()?;
    let now = encode_dt(Utc::now());
    let (raw, removed) = self
      .checked(move |conn| {
        let tx = conn.transaction()?;
        check!(queries::check_class(&tx, id));
        check!(queries::check_unique(
          &tx,
          "classes",
          "code",
          &input.code,
          Some(("class_id", id.get())),
        ));
        check!(queries::check_academic_year(&tx, input.academic_year_id));
        if let Some(teacher) = input.class_teacher_id {
          check!(queries::check_teacher(&tx, teacher));
        }
        check!(queries::check_subjects(&tx, &input.subjects));

        tx.execute(
          "UPDATE classes
           SET name = ?2, code = ?3, grade_level = ?4, section = ?5, capacity = ?6,
               academic_year_id = ?7, class_teacher_id = ?8, is_active = ?9
           WHERE class_id = ?1",
          params![
            id.get(),
            input.name,
            input.code,
            input.grade_level,
            input.section,
            input.capacity,
            input.academic_year_id.get(),
            input.class_teacher_id.map(UserId::get),
            input.is_active,
          ],
        )?;
        let removed = if input.subjects.is_empty() {
          Vec::new()
        } else {
          let wanted: BTreeSet<SubjectId> = input.subjects.iter().copied().collect();
          queries::sync_class_subjects(&tx, id, &wanted, &now)?
        };
        let raw = queries::class(&tx, id)?;
        tx.commit()?;
        Ok(raw.ok_or(lectern_core::Error::ClassNotFound(id)).map(|raw| (raw, removed)))
      })
      .await?;
    tracing::info!(class_id = %id, removed = removed.len(), "class updated");
    raw.into_class()
  }

  async fn delete_class(&self, id: ClassId) -> Result<()> {
    let links = self
      .checked(move |conn| {
        let tx = conn.transaction()?;
        check!(queries::check_class(&tx, id));
        // Links go with the class (ON DELETE CASCADE).
        let links = queries::class_links(&tx, id)?.len();
        tx.execute("DELETE FROM classes WHERE class_id = ?1", params![id.get()])?;
        tx.commit()?;
        Ok(Ok(links))
      })
      .await?;
    tracing::info!(class_id = %id, links, "class deleted");
    Ok(())
  }

  async fn get_class(&self, id: ClassId) -> Result<Option<SchoolClass>> {
    let raw = self
      .conn
      .call(move |conn| Ok(queries::class(conn, id)?))
      .await?;
    raw.map(RawClass::into_class).transpose()
  }

  async fn list_classes(&self, active_only: bool) -> Result<Vec<SchoolClass>> {
    let raws = self
      .conn
      .call(move |conn| Ok(queries::classes(conn, active_only)?))
      .await?;
    decode_all(raws, RawClass::into_class)
  }

  async fn set_class_subjects(
    &self,
    class: ClassId,
    subjects: Vec<SubjectId>,
  ) -> Result<Vec<ClassSubjectLink>> {
    if subjects.is_empty() {
      return Err(
        lectern_core::Error::Invalid {
          field:  "subjects",
          reason: "must name at least one subject".into(),
        }
        .into(),
      );
    }
    let wanted: BTreeSet<SubjectId> = subjects.into_iter().collect();
    let now = encode_dt(Utc::now());

    let (removed, links) = self
      .checked(move |conn| {
        let tx = conn.transaction()?;
        check!(queries::check_class(&tx, class));
        check!(queries::check_subjects(&tx, &wanted));

        let removed = queries::sync_class_subjects(&tx, class, &wanted, &now)?;
        let links = queries::class_links(&tx, class)?;
        tx.commit()?;
        Ok(Ok((removed, links)))
      })
      .await?;

    tracing::info!(
      class_id = %class,
      removed = removed.len(),
      subjects = links.len(),
      "class subjects replaced",
    );
    Ok(links)
  }

  async fn class_links(&self, class: ClassId) -> Result<Vec<ClassSubjectLink>> {
    self
      .checked(move |conn| {
        check!(queries::check_class(conn, class));
        Ok(Ok(queries::class_links(conn, class)?))
      })
      .await
  }

  // ── Grants ────────────────────────────────────────────────────────────────

  async fn replace_grants(
    &self,
    teacher: UserId,
    year: AcademicYearId,
    subjects: Vec<SubjectId>,
  ) -> Result<Vec<TeacherSubjectGrant>> {
    let wanted: BTreeSet<SubjectId> = subjects.into_iter().collect();
    let now = encode_dt(Utc::now());

    let grants = self
      .checked(move |conn| {
        let tx = conn.transaction()?;
        check!(queries::check_teacher(&tx, teacher));
        check!(queries::check_academic_year(&tx, year));
        check!(queries::check_subjects(&tx, &wanted));

        tx.execute(
          "DELETE FROM teacher_subject WHERE teacher_id = ?1 AND academic_year_id = ?2",
          params![teacher.get(), year.get()],
        )?;
        {
          let mut stmt = tx.prepare_cached(
            "INSERT INTO teacher_subject (teacher_id, subject_id, academic_year_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
          )?;
          for subject in &wanted {
            stmt.execute(params![teacher.get(), subject.get(), year.get(), now])?;
          }
        }
        let grants = queries::grants(&tx, teacher, Some(year))?;
        tx.commit()?;
        Ok(Ok(grants))
      })
      .await?;

    tracing::info!(
      teacher_id = %teacher,
      academic_year_id = %year,
      subjects = grants.len(),
      "teacher subject grants replaced",
    );
    Ok(grants)
  }

  async fn list_grants(
    &self,
    teacher: UserId,
    year: Option<AcademicYearId>,
  ) -> Result<Vec<TeacherSubjectGrant>> {
    self
      .checked(move |conn| {
        check!(queries::check_teacher(conn, teacher));
        Ok(Ok(queries::grants(conn, teacher, year)?))
      })
      .await
  }

  // ── Assignments ───────────────────────────────────────────────────────────

  async fn reconcile_assignments<'a>(
    &'a self,
    teacher: UserId,
    pairs: &'a [AssignmentPair],
  ) -> Result<ReconcileOutcome> {
    let pairs: BTreeSet<AssignmentPair> = pairs.iter().copied().collect();
    let now = encode_dt(Utc::now());

    let (outcome, ungranted) = self
      .checked(move |conn| {
        // Validation and both phases share one transaction: a failure at any
        // point leaves the previous assignments in place.
        let tx = conn.transaction()?;
        check!(queries::check_teacher(&tx, teacher));
        for pair in &pairs {
          check!(queries::check_class(&tx, pair.class_id));
        }
        check!(queries::check_subjects(&tx, pairs.iter().map(|p| &p.subject_id)));

        let held = queries::grants(&tx, teacher, None)?;
        let ungranted = grants::ungranted_pairs(&held, teacher, &pairs);

        let outcome = reconcile(&mut LinkTable::new(&tx, now), teacher, &pairs)?;
        tx.commit()?;
        Ok(Ok((outcome, ungranted)))
      })
      .await?;

    if !ungranted.is_empty() {
      tracing::warn!(
        teacher_id = %teacher,
        ?ungranted,
        "assigned subjects the teacher holds no grant for",
      );
    }
    tracing::info!(
      teacher_id = %teacher,
      cleared = outcome.cleared,
      updated = outcome.updated,
      inserted = outcome.inserted,
      "assignments reconciled",
    );
    Ok(outcome)
  }

  async fn teacher_assignments(&self, teacher: UserId) -> Result<Vec<ClassSubjectLink>> {
    self
      .checked(move |conn| {
        check!(queries::check_teacher(conn, teacher));
        Ok(Ok(queries::teacher_links(conn, teacher)?))
      })
      .await
  }

  // ── Grant filter ──────────────────────────────────────────────────────────

  async fn assignable_subjects(
    &self,
    teacher: UserId,
    year: AcademicYearId,
    class: ClassId,
  ) -> Result<Vec<Subject>> {
    let (held, raws) = self
      .checked(move |conn| {
        check!(queries::check_teacher(conn, teacher));
        check!(queries::check_academic_year(conn, year));
        check!(queries::check_class(conn, class));
        let held = queries::grants(conn, teacher, Some(year))?;
        let raws = queries::class_subjects(conn, class)?;
        Ok(Ok((held, raws)))
      })
      .await?;

    let class_subjects = decode_all(raws, RawSubject::into_subject)?;
    Ok(
      grants::legal_subjects(&held, teacher, year, &class_subjects)
        .into_iter()
        .cloned()
        .collect(),
    )
  }

  async fn assignment_board(
    &self,
    teacher: UserId,
    year: AcademicYearId,
  ) -> Result<Vec<ClassChoices>> {
    let (held, raw_classes, raw_subjects) = self
      .checked(move |conn| {
        check!(queries::check_teacher(conn, teacher));
        check!(queries::check_academic_year(conn, year));
        let held = queries::grants(conn, teacher, Some(year))?;
        let mut classes = Vec::new();
        for raw in queries::classes(conn, true)? {
          let links = queries::class_links(conn, ClassId(raw.class_id))?;
          classes.push((raw, links));
        }
        let subjects = queries::subjects(conn, false)?;
        Ok(Ok((held, classes, subjects)))
      })
      .await?;

    let classes = raw_classes
      .into_iter()
      .map(|(raw, links)| Ok((raw.into_class()?, links)))
      .collect::<Result<Vec<_>>>()?;
    let subjects = decode_all(raw_subjects, RawSubject::into_subject)?;
    Ok(grants::assignment_board(&held, teacher, year, classes, &subjects))
  }
}
