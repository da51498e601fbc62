//! Category: a tenant-scoped, self-nesting ticket classification.
//!
//! Categories belong to exactly one organization and may be nested under
//! another category of the same organization. Each mutator validates its own
//! input and leaves the category untouched on failure.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{Error, Result, hierarchy::Hierarchical, validate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
  id:              Uuid,
  organization_id: Uuid,
  name:            String,
  description:     String,
  parent_id:       Option<Uuid>,
  is_active:       bool,
  created_at:      DateTime<Utc>,
  updated_at:      DateTime<Utc>,
}

/// Every stored column of a category, used to rebuild one from storage
/// without re-running validation.
#[derive(Debug, Clone)]
pub struct CategoryRecord {
  pub id:              Uuid,
  pub organization_id: Uuid,
  pub name:            String,
  pub description:     String,
  pub parent_id:       Option<Uuid>,
  pub is_active:       bool,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

impl Category {
  /// Build a category with a caller-chosen id.
  ///
  /// Fields are checked in order (name, description, organization, parent)
  /// and the first failure is returned.
  pub fn new(
    id: Uuid,
    organization_id: Uuid,
    name: &str,
    description: &str,
    parent_id: Option<Uuid>,
    now: DateTime<Utc>,
  ) -> Result<Self> {
    let name = validate::name(name)?;
    let description = validate::description(description)?;
    let organization_id = validate::tenant(organization_id)?;
    if parent_id == Some(id) {
      return Err(Error::CircularReference(id));
    }

    Ok(Self {
      id,
      organization_id,
      name,
      description,
      parent_id,
      is_active: true,
      created_at: now,
      updated_at: now,
    })
  }

  /// Build a category with a freshly generated id.
  pub fn create(
    organization_id: Uuid,
    name: &str,
    description: &str,
    parent_id: Option<Uuid>,
    now: DateTime<Utc>,
  ) -> Result<Self> {
    Self::new(Uuid::new_v4(), organization_id, name, description, parent_id, now)
  }

  pub fn restore(record: CategoryRecord) -> Self {
    Self {
      id:              record.id,
      organization_id: record.organization_id,
      name:            record.name,
      description:     record.description,
      parent_id:       record.parent_id,
      is_active:       record.is_active,
      created_at:      record.created_at,
      updated_at:      record.updated_at,
    }
  }

  // ── Accessors ───────────────────────────────────────────────────────────

  pub fn id(&self) -> Uuid { self.id }

  pub fn organization_id(&self) -> Uuid { self.organization_id }

  pub fn name(&self) -> &str { &self.name }

  pub fn description(&self) -> &str { &self.description }

  pub fn parent_id(&self) -> Option<Uuid> { self.parent_id }

  pub fn is_active(&self) -> bool { self.is_active }

  pub fn created_at(&self) -> DateTime<Utc> { self.created_at }

  pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

  pub fn is_root(&self) -> bool { self.parent_id.is_none() }

  pub fn belongs_to_organization(&self, organization_id: Uuid) -> bool {
    self.organization_id == organization_id
  }

  // ── Mutators ────────────────────────────────────────────────────────────

  pub fn change_name(&mut self, name: &str, now: DateTime<Utc>) -> Result<()> {
    self.name = validate::name(name)?;
    self.touch(now);
    Ok(())
  }

  pub fn change_description(&mut self, description: &str, now: DateTime<Utc>) -> Result<()> {
    self.description = validate::description(description)?;
    self.touch(now);
    Ok(())
  }

  /// Re-home this category. Only a direct self-reference is caught here;
  /// longer cycles need the whole graph (see
  /// [`ParentGraph`](crate::hierarchy::ParentGraph)).
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

impl Hierarchical for Category {
  fn id(&self) -> Uuid { self.id }

  fn parent_id(&self) -> Option<Uuid> { self.parent_id }

  fn name(&self) -> &str { &self.name }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};

  use super::*;
  use crate::{
    error::Field,
    validate::{NAME_MAX_LEN, NAME_MIN_LEN},
  };

  fn t0() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() }

  fn later() -> DateTime<Utc> { t0() + Duration::minutes(5) }

  fn category() -> Category {
    Category::create(Uuid::new_v4(), "Hardware", "Physical kit", None, t0()).unwrap()
  }

  #[test]
  fn create_sets_defaults() {
    let org = Uuid::new_v4();
    let c = Category::create(org, "  Hardware  ", " desc ", None, t0()).unwrap();
    assert_eq!(c.name(), "Hardware");
    assert_eq!(c.description(), "desc");
    assert!(c.is_active());
    assert!(c.is_root());
    assert!(c.belongs_to_organization(org));
    assert!(!c.belongs_to_organization(Uuid::new_v4()));
    assert_eq!(c.created_at(), t0());
    assert_eq!(c.updated_at(), t0());
  }

  #[test]
  fn new_keeps_explicit_id() {
    let id = Uuid::new_v4();
    let c = Category::new(id, Uuid::new_v4(), "Software", "", None, t0()).unwrap();
    assert_eq!(c.id(), id);
  }

  #[test]
  fn name_boundaries() {
    let org = Uuid::new_v4();
    let at = |n: usize| Category::create(org, &"n".repeat(n), "", None, t0());
    assert!(at(NAME_MIN_LEN).is_ok());
    assert!(at(NAME_MIN_LEN - 1).is_err());
    assert!(at(NAME_MAX_LEN).is_ok());
    assert!(at(NAME_MAX_LEN + 1).is_err());
  }

  #[test]
  fn first_failing_field_wins() {
    let err = Category::create(Uuid::nil(), "x", &"d".repeat(600), None, t0()).unwrap_err();
    assert_eq!(err.field(), Some(Field::Name));

    let err = Category::create(Uuid::nil(), "Valid", &"d".repeat(600), None, t0()).unwrap_err();
    assert_eq!(err.field(), Some(Field::Description));

    let err = Category::create(Uuid::nil(), "Valid", "", None, t0()).unwrap_err();
    assert_eq!(err.field(), Some(Field::OrganizationId));
  }

  #[test]
  fn new_rejects_self_parent() {
    let id = Uuid::new_v4();
    let err = Category::new(id, Uuid::new_v4(), "Loop", "", Some(id), t0()).unwrap_err();
    assert!(matches!(err, Error::CircularReference(x) if x == id));
  }

  #[test]
  fn change_name_trims_and_touches() {
    let mut c = category();
    c.change_name("  Peripherals ", later()).unwrap();
    assert_eq!(c.name(), "Peripherals");
    assert_eq!(c.updated_at(), later());
    assert_eq!(c.created_at(), t0());
  }

  #[test]
  fn failed_change_name_leaves_category_untouched() {
    let mut c = category();
    let before = c.clone();
    let err = c.change_name("", later()).unwrap_err();
    assert_eq!(err.field(), Some(Field::Name));
    assert_eq!(c, before);
  }

  #[test]
  fn failed_change_description_leaves_category_untouched() {
    let mut c = category();
    let before = c.clone();
    assert!(c.change_description(&"d".repeat(501), later()).is_err());
    assert_eq!(c, before);
  }

  #[test]
  fn self_parent_is_rejected_without_side_effects() {
    let mut c = category();
    let before = c.clone();
    let err = c.change_parent(Some(c.id()), later()).unwrap_err();
    assert!(matches!(err, Error::CircularReference(_)));
    assert_eq!(c.parent_id(), before.parent_id());
    assert_eq!(c.updated_at(), before.updated_at());
  }

  #[test]
  fn change_parent_and_move_to_root() {
    let mut c = category();
    let parent = Uuid::new_v4();
    c.change_parent(Some(parent), later()).unwrap();
    assert_eq!(c.parent_id(), Some(parent));
    assert!(!c.is_root());

    let even_later = later() + Duration::minutes(1);
    c.move_to_root(even_later);
    assert!(c.is_root());
    assert_eq!(c.updated_at(), even_later);
  }

  #[test]
  fn deactivate_is_idempotent() {
    let mut c = category();
    c.deactivate(later());
    assert!(!c.is_active());
    c.deactivate(later());
    assert!(!c.is_active());
    c.activate(later());
    assert!(c.is_active());
  }

  #[test]
  fn updated_at_never_goes_backwards() {
    let mut c = category();
    c.activate(later());
    c.deactivate(t0() - Duration::hours(1));
    assert_eq!(c.updated_at(), later());
  }

  #[test]
  fn restore_round_trips_every_field() {
    let record = CategoryRecord {
      id:              Uuid::new_v4(),
      organization_id: Uuid::new_v4(),
      name:            "Laptops".into(),
      description:     String::new(),
      parent_id:       Some(Uuid::new_v4()),
      is_active:       false,
      created_at:      t0(),
      updated_at:      later(),
    };
    let c = Category::restore(record.clone());
    assert_eq!(c.id(), record.id);
    assert_eq!(c.parent_id(), record.parent_id);
    assert!(!c.is_active());
    assert_eq!(c.updated_at(), later());
  }
}
