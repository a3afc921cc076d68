//! Field rules shared by the `New*` input types.

use crate::{Error, Result};

/// Trimmed, non-empty, at most `max` characters.
pub(crate) fn required_text(
  field: &'static str,
  value: &str,
  max: usize,
) -> Result<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(Error::invalid(field, "must not be empty"));
  }
  optional_text(field, Some(trimmed), max).map(|v| v.unwrap_or_default())
}

/// Like [`required_text`] but an absent or blank value becomes `None`.
pub(crate) fn optional_text(
  field: &'static str,
  value: Option<&str>,
  max: usize,
) -> Result<Option<String>> {
  let Some(trimmed) = value.map(str::trim).filter(|v| !v.is_empty()) else {
    return Ok(None);
  };
  if trimmed.chars().count() > max {
    return Err(Error::invalid(
      field,
      format!("must be at most {max} characters"),
    ));
  }
  Ok(Some(trimmed.to_owned()))
}

/// Codes are compared and stored uppercase.
pub(crate) fn code(field: &'static str, value: &str, max: usize) -> Result<String> {
  Ok(required_text(field, value, max)?.to_uppercase())
}

pub(crate) fn in_range(
  field: &'static str,
  value: i64,
  range: std::ops::RangeInclusive<i64>,
) -> Result<()> {
  if range.contains(&value) {
    Ok(())
  } else {
    Err(Error::invalid(
      field,
      format!("must be between {} and {}", range.start(), range.end()),
    ))
  }
}
