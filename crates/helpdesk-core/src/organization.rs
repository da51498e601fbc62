//! Organization: the customer tenant, optionally nested under a parent
//! organization, with an optional e-mail domain for self-service joining.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{Error, Result, hierarchy::Hierarchical, validate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Organization {
  id:         Uuid,
  name:       String,
  /// Lower-cased; `None` opts out of domain-based joining.
  domain:     Option<String>,
  parent_id:  Option<Uuid>,
  is_active:  bool,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

/// Every stored column of an organization.
#[derive(Debug, Clone)]
pub struct OrganizationRecord {
  pub id:         Uuid,
  pub name:       String,
  pub domain:     Option<String>,
  pub parent_id:  Option<Uuid>,
  pub is_active:  bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Organization {
  pub fn new(
    id: Uuid,
    name: &str,
    domain: &str,
    parent_id: Option<Uuid>,
    now: DateTime<Utc>,
  ) -> Result<Self> {
    let name = validate::name(name)?;
    let domain = validate::domain(domain)?;
    if parent_id == Some(id) {
      return Err(Error::CircularReference(id));
    }

    Ok(Self {
      id,
      name,
      domain,
      parent_id,
      is_active: true,
      created_at: now,
      updated_at: now,
    })
  }

  pub fn create(
    name: &str,
    domain: &str,
    parent_id: Option<Uuid>,
    now: DateTime<Utc>,
  ) -> Result<Self> {
    Self::new(Uuid::new_v4(), name, domain, parent_id, now)
  }

  pub fn restore(record: OrganizationRecord) -> Self {
    Self {
      id:         record.id,
      name:       record.name,
      domain:     record.domain,
      parent_id:  record.parent_id,
      is_active:  record.is_active,
      created_at: record.created_at,
      updated_at: record.updated_at,
    }
  }

  pub fn id(&self) -> Uuid { self.id }

  pub fn name(&self) -> &str { &self.name }

  pub fn domain(&self) -> Option<&str> { self.domain.as_deref() }

  pub fn parent_id(&self) -> Option<Uuid> { self.parent_id }

  pub fn is_active(&self) -> bool { self.is_active }

  pub fn created_at(&self) -> DateTime<Utc> { self.created_at }

  pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

  pub fn is_root(&self) -> bool { self.parent_id.is_none() }

  /// Whether `email` falls under this organization's domain.
  ///
  /// Purely syntactic: the address must split on `@` into exactly two parts
  /// and the second must equal the domain, ignoring case. Subdomains do not
  /// match and an organization without a domain admits nobody.
  pub fn can_user_join_by_email(&self, email: &str) -> bool {
    let Some(domain) = self.domain.as_deref() else {
      return false;
    };
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
      (Some(_), Some(host), None) => host.eq_ignore_ascii_case(domain),
      _ => false,
    }
  }

  pub fn change_name(&mut self, name: &str, now: DateTime<Utc>) -> Result<()> {
    self.name = validate::name(name)?;
    self.touch(now);
    Ok(())
  }

  /// Replace the domain; an empty string clears it.
  pub fn change_domain(&mut self, domain: &str, now: DateTime<Utc>) -> Result<()> {
    self.domain = validate::domain(domain)?;
    self.touch(now);
    Ok(())
  }

  /// Only a direct self-reference is caught here.
  pub fn change_parent(&mut self, parent_id: Option<Uuid>, now: DateTime<Utc>) -> Result<()> {
    if parent_id == Some(self.id) {
      return Err(Error::CircularReference(self.id));
    }
    self.parent_id = parent_id;
    self.touch(now);
    Ok(())
  }

  pub fn move_to_root(&mut self, now: DateTime<Utc>) {
    self.parent_id = None;
    self.touch(now);
  }

  pub fn activate(&mut self, now: DateTime<Utc>) {
    self.is_active = true;
    self.touch(now);
  }

  pub fn deactivate(&mut self, now: DateTime<Utc>) {
    self.is_active = false;
    self.touch(now);
  }

  fn touch(&mut self, now: DateTime<Utc>) { self.updated_at = self.updated_at.max(now); }
}

impl Hierarchical for Organization {
  fn id(&self) -> Uuid { self.id }

  fn parent_id(&self) -> Option<Uuid> { self.parent_id }

  fn name(&self) -> &str { &self.name }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};

  use super::*;
  use crate::error::Field;

  fn t0() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() }

  fn org(domain: &str) -> Organization {
    Organization::create("Example Ltd", domain, None, t0()).unwrap()
  }

  #[test]
  fn create_normalises_fields() {
    let o = Organization::create(" Acme ", "ACME.io", None, t0()).unwrap();
    assert_eq!(o.name(), "Acme");
    assert_eq!(o.domain(), Some("acme.io"));
    assert!(o.is_active());
    assert!(o.is_root());
  }

  #[test]
  fn validation_order_is_name_then_domain() {
    let err = Organization::create("", "bad", None, t0()).unwrap_err();
    assert_eq!(err.field(), Some(Field::Name));
    let err = Organization::create("Acme", "bad", None, t0()).unwrap_err();
    assert_eq!(err.field(), Some(Field::Domain));
  }

  #[test]
  fn joins_only_exact_domain() {
    let o = org("example.com");
    assert!(o.can_user_join_by_email("user@example.com"));
    assert!(o.can_user_join_by_email("User@EXAMPLE.com"));
    assert!(!o.can_user_join_by_email("user@mail.example.com"));
    assert!(!o.can_user_join_by_email("user@example.org"));
  }

  #[test]
  fn join_check_is_structural() {
    let o = org("example.com");
    // Exactly one '@' is all that is required.
    assert!(o.can_user_join_by_email("@example.com"));
    assert!(!o.can_user_join_by_email("example.com"));
    assert!(!o.can_user_join_by_email("a@b@example.com"));
    assert!(!o.can_user_join_by_email("user@"));
    assert!(!o.can_user_join_by_email("user@example.com "));
  }

  #[test]
  fn empty_domain_admits_nobody() {
    let o = org("");
    assert_eq!(o.domain(), None);
    for email in ["user@example.com", "@", "", "user@", "a@b@c", "user@"] {
      assert!(!o.can_user_join_by_email(email), "{email:?} was admitted");
    }
  }

  #[test]
  fn change_domain_clears_and_validates() {
    let mut o = org("example.com");
    let before = o.clone();
    assert!(o.change_domain("no_dots", t0() + Duration::seconds(1)).is_err());
    assert_eq!(o, before);

    o.change_domain("", t0() + Duration::seconds(2)).unwrap();
    assert_eq!(o.domain(), None);
    assert!(!o.can_user_join_by_email("user@example.com"));
  }

  #[test]
  fn empty_name_change_keeps_updated_at() {
    let mut o = org("example.com");
    assert!(o.change_name("", t0() + Duration::hours(1)).is_err());
    assert_eq!(o.updated_at(), t0());
    assert_eq!(o.name(), "Example Ltd");
  }

  #[test]
  fn self_parent_is_rejected() {
    let mut o = org("");
    let err = o.change_parent(Some(o.id()), t0() + Duration::hours(1)).unwrap_err();
    assert!(matches!(err, Error::CircularReference(_)));
    assert!(o.is_root());
    assert_eq!(o.updated_at(), t0());
  }

  #[test]
  fn activation_flags() {
    let mut o = org("");
    o.deactivate(t0());
    o.deactivate(t0());
    assert!(!o.is_active());
    o.activate(t0());
    assert!(o.is_active());
  }
}
