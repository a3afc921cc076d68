//! SQL schema for the Lectern SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision; future migrations will be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL,
    email       TEXT    NOT NULL UNIQUE,
    phone       TEXT    NOT NULL UNIQUE,
    user_name   TEXT    NOT NULL UNIQUE,   -- generated, e.g. 'TCH001'
    user_type   TEXT    NOT NULL,          -- 'admin' | 'teacher' | 'student' | 'parent' | 'guardian'
    status      INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS academic_years (
    academic_year_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name             TEXT    NOT NULL,
    code             TEXT    NOT NULL UNIQUE,
    start_date       TEXT    NOT NULL,    -- YYYY-MM-DD
    end_date         TEXT    NOT NULL,
    description      TEXT,
    is_active        INTEGER NOT NULL DEFAULT 0,
    created_at       TEXT    NOT NULL,
    CHECK (end_date > start_date)
);

CREATE TABLE IF NOT EXISTS subjects (
    subject_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT    NOT NULL,
    code         TEXT    NOT NULL UNIQUE,
    description  TEXT,
    credit_hours INTEGER NOT NULL CHECK (credit_hours BETWEEN 1 AND 10),
    is_active    INTEGER NOT NULL DEFAULT 1,
    created_at   TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS classes (
    class_id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name             TEXT    NOT NULL,
    code             TEXT    NOT NULL UNIQUE,
    grade_level      INTEGER NOT NULL CHECK (grade_level BETWEEN 1 AND 12),
    section          TEXT,
    capacity         INTEGER NOT NULL CHECK (capacity BETWEEN 1 AND 100),
    academic_year_id INTEGER NOT NULL REFERENCES academic_years(academic_year_id),
    class_teacher_id INTEGER REFERENCES users(user_id),
    is_active        INTEGER NOT NULL DEFAULT 1,
    created_at       TEXT    NOT NULL
);

-- One row per subject taught in a class. teacher_id is only ever rewritten by
-- assignment reconciliation, which never deletes rows. There is no constraint
-- tying teacher_id to a teacher_subject grant.
CREATE TABLE IF NOT EXISTS class_subject (
    class_id   INTEGER NOT NULL REFERENCES classes(class_id) ON DELETE CASCADE,
    subject_id INTEGER NOT NULL REFERENCES subjects(subject_id),
    teacher_id INTEGER REFERENCES users(user_id),
    created_at TEXT    NOT NULL,
    updated_at TEXT    NOT NULL,
    PRIMARY KEY (class_id, subject_id)
);

-- Subjects a teacher may teach, per academic year.
CREATE TABLE IF NOT EXISTS teacher_subject (
    teacher_id       INTEGER NOT NULL REFERENCES users(user_id),
    subject_id       INTEGER NOT NULL REFERENCES subjects(subject_id),
    academic_year_id INTEGER NOT NULL REFERENCES academic_years(academic_year_id),
    created_at       TEXT    NOT NULL,
    PRIMARY KEY (teacher_id, subject_id, academic_year_id)
);

CREATE INDEX IF NOT EXISTS class_subject_teacher_idx ON class_subject(teacher_id);
CREATE INDEX IF NOT EXISTS classes_year_idx          ON classes(academic_year_id);

PRAGMA user_version = 1;
";
