//! Users. Only teachers are created through this crate, but the type enum
//! covers every role the school knows about.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, ids::UserId, rules};

/// The role a user account plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
  Admin,
  Teacher,
  Student,
  Parent,
  Guardian,
}

impl UserType {
  /// Prefix of generated user names, e.g. `TCH001`.
  pub fn username_prefix(self) -> &'static str {
    match self {
      Self::Admin => "ADM",
      Self::Teacher => "TCH",
      Self::Student => "STU",
      Self::Parent => "PAR",
      Self::Guardian => "GUA",
    }
  }
}

/// The next generated user name for `kind`: its prefix followed by one more
/// than the highest number already issued, zero-padded to three digits.
///
/// `taken` may hold any user names; only `<prefix><digits>` names count, so
/// numbers freed by deleted accounts are never handed out twice.
pub fn next_username<'a>(
  kind: UserType,
  taken: impl IntoIterator<Item = &'a str>,
) -> String {
  let prefix = kind.username_prefix();
  let highest = taken
    .into_iter()
    .filter_map(|name| name.strip_prefix(prefix))
    .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
    // A suffix too long for `u64` cannot collide with anything issued here.
    .filter_map(|digits| digits.parse::<u64>().ok())
    .max()
    .map_or(0, u128::from);
  format!("{prefix}{:03}", highest + 1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:    UserId,
  pub name:       String,
  pub email:      String,
  pub phone:      String,
  pub user_name:  String,
  pub user_type:  UserType,
  /// Whether the account is enabled.
  pub status:     bool,
  pub created_at: DateTime<Utc>,
}

impl User {
  pub fn is_teacher(&self) -> bool { self.user_type == UserType::Teacher }
}

fn default_true() -> bool { true }

/// Trimmed `(name, email, phone)`; the email must be a lowercase address.
fn contact(name: &str, email: &str, phone: &str) -> Result<(String, String, String)> {
  let name = rules::required_text("name", name, 255)?;
  let email = rules::required_text("email", email, 255)?;
  if email != email.to_lowercase() {
    return Err(Error::invalid("email", "must be lowercase"));
  }
  match email.split_once('@') {
    Some((local, domain))
      if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {}
    _ => return Err(Error::invalid("email", "must be an email address")),
  }
  let phone = rules::required_text("phone", phone, 20)?;
  Ok((name, email, phone))
}

/// Input to [`crate::store::SchoolStore::add_teacher`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTeacher {
  pub name:  String,
  pub email: String,
  pub phone: String,
}

impl NewTeacher {
  /// Check every field and return the trimmed form that gets stored.
  pub fn validated(&self) -> Result<Self> {
    let (name, email, phone) = contact(&self.name, &self.email, &self.phone)?;
    Ok(Self { name, email, phone })
  }
}

/// Input to [`crate::store::SchoolStore::update_teacher`]. The user name and
/// type never change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherUpdate {
  pub name:   String,
  pub email:  String,
  pub phone:  String,
  #[serde(default = "default_true")]
  pub status: bool,
}

impl TeacherUpdate {
  pub fn validated(&self) -> Result<Self> {
    let (name, email, phone) = contact(&self.name, &self.email, &self.phone)?;
    Ok(Self { name, email, phone, status: self.status })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn teacher(email: &str) -> NewTeacher {
    NewTeacher {
      name:  " Ada Lovelace ".into(),
      email: email.into(),
      phone: "555-0100".into(),
    }
  }

  #[test]
  fn generated_usernames_are_zero_padded() {
    assert_eq!(next_username(UserType::Teacher, []), "TCH001");
    assert_eq!(next_username(UserType::Teacher, ["TCH041"]), "TCH042");
    assert_eq!(next_username(UserType::Guardian, ["GUA999"]), "GUA1000");
  }

  #[test]
  fn usernames_continue_after_the_highest_number() {
    // TCH002 was deleted; a count-based scheme would reissue TCH003.
    let taken = ["TCH001", "TCH003", "STU007", "TCHX", "TCH", "ADM010"];
    assert_eq!(next_username(UserType::Teacher, taken), "TCH004");
  }

  #[test]
  fn teacher_update_keeps_status_and_checks_contact() {
    let update = TeacherUpdate {
      name:   " Grace ".into(),
      email:  "grace@school.test".into(),
      phone:  "555-0101".into(),
      status: false,
    };
    let v = update.validated().unwrap();
    assert_eq!((v.name.as_str(), v.status), ("Grace", false));

    let bad = TeacherUpdate { email: "Grace@school.test".into(), ..update };
    assert!(matches!(bad.validated(), Err(Error::Invalid { field: "email", .. })));
  }

  #[test]
  fn valid_teacher_is_trimmed() {
    let t = teacher("ada@school.test").validated().unwrap();
    assert_eq!(t.name, "Ada Lovelace");
  }

  #[test]
  fn uppercase_email_is_rejected() {
    let err = teacher("Ada@school.test").validated().unwrap_err();
    assert!(matches!(err, Error::Invalid { field: "email", .. }));
  }

  #[test]
  fn email_without_at_sign_is_rejected() {
    assert!(teacher("ada.school.test").validated().is_err());
    assert!(teacher("@school.test").validated().is_err());
    assert!(teacher("a@b@c").validated().is_err());
  }
}
