//! Field rules shared by the hierarchical entities.
//!
//! Every function returns the normalised value on success so callers store
//! exactly what was checked.

use uuid::Uuid;

use crate::{Error, Result, error::Field};

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 500;

/// Trimmed name between [`NAME_MIN_LEN`] and [`NAME_MAX_LEN`] characters.
pub fn name(raw: &str) -> Result<String> {
  let trimmed = raw.trim();
  let len = trimmed.chars().count();
  if len == 0 {
    return Err(Error::validation(Field::Name, "must not be empty"));
  }
  if len < NAME_MIN_LEN {
    return Err(Error::validation(
      Field::Name,
      format!("must be at least {NAME_MIN_LEN} characters"),
    ));
  }
  if len > NAME_MAX_LEN {
    return Err(Error::validation(
      Field::Name,
      format!("must be at most {NAME_MAX_LEN} characters"),
    ));
  }
  Ok(trimmed.to_owned())
}

/// Trimmed description; empty is allowed.
pub fn description(raw: &str) -> Result<String> {
  let trimmed = raw.trim();
  if trimmed.chars().count() > DESCRIPTION_MAX_LEN {
    return Err(Error::validation(
      Field::Description,
      format!("must be at most {DESCRIPTION_MAX_LEN} characters"),
    ));
  }
  Ok(trimmed.to_owned())
}

/// Lower-cased e-mail domain, or `None` when blank.
pub fn domain(raw: &str) -> Result<Option<String>> {
  let normalised = raw.trim().to_lowercase();
  if normalised.is_empty() {
    return Ok(None);
  }
  if !normalised.contains('.') {
    return Err(Error::validation(Field::Domain, "must contain a '.'"));
  }
  if let Some(bad) = normalised
    .chars()
    .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '.' || *c == '-'))
  {
    return Err(Error::validation(
      Field::Domain,
      format!("contains invalid character {bad:?}"),
    ));
  }
  Ok(Some(normalised))
}

/// The owning organization of a category must be a real identifier.
pub fn tenant(id: Uuid) -> Result<Uuid> {
  if id.is_nil() {
    return Err(Error::validation(Field::OrganizationId, "is required"));
  }
  Ok(id)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn name_is_trimmed() {
    assert_eq!(name("  Hardware \t").unwrap(), "Hardware");
  }

  #[test]
  fn name_length_bounds() {
    assert!(name("ab").is_ok());
    assert!(name("a").is_err());
    assert!(name(&"x".repeat(NAME_MAX_LEN)).is_ok());
    assert!(name(&"x".repeat(NAME_MAX_LEN + 1)).is_err());
  }

  #[test]
  fn name_length_counts_characters_not_bytes() {
    // Two characters, four bytes.
    assert!(name("éé").is_ok());
    assert!(name(&"é".repeat(NAME_MAX_LEN)).is_ok());
  }

  #[test]
  fn blank_name_is_rejected() {
    let err = name("   ").unwrap_err();
    assert_eq!(err.field(), Some(Field::Name));
  }

  #[test]
  fn description_may_be_empty_but_bounded() {
    assert_eq!(description("   ").unwrap(), "");
    assert!(description(&"d".repeat(DESCRIPTION_MAX_LEN)).is_ok());
    let err = description(&"d".repeat(DESCRIPTION_MAX_LEN + 1)).unwrap_err();
    assert_eq!(err.field(), Some(Field::Description));
  }

  #[test]
  fn domain_is_normalised() {
    assert_eq!(domain(" Example.COM ").unwrap().as_deref(), Some("example.com"));
    assert_eq!(domain("").unwrap(), None);
    assert_eq!(domain("my-corp.co.uk").unwrap().as_deref(), Some("my-corp.co.uk"));
  }

  #[test]
  fn domain_syntax_is_enforced() {
    assert!(domain("localhost").is_err());
    assert!(domain("exa mple.com").is_err());
    assert!(domain("ex_ample.com").is_err());
    assert!(domain("user@example.com").is_err());
  }

  #[test]
  fn nil_tenant_is_rejected() {
    let err = tenant(Uuid::nil()).unwrap_err();
    assert_eq!(err.field(), Some(Field::OrganizationId));
    assert!(tenant(Uuid::new_v4()).is_ok());
  }
}
