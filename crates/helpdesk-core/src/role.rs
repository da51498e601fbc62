//! Roles and the capabilities they grant.
//!
//! Roles form a total order, `Customer < Agent < Admin`, and every
//! capability held by a role is held by every role above it.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::Error;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::EnumIter,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  #[default]
  Customer,
  Agent,
  Admin,
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  strum::Display,
  strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
  CreateTickets,
  AssignTickets,
  ViewAllTickets,
  ManageUsers,
  ViewInternalComments,
  CreateInternalComments,
  ManageOrganization,
}

impl Capability {
  /// The lowest role holding this capability.
  pub fn minimum_role(self) -> Role {
    match self {
      Self::CreateTickets => Role::Customer,
      Self::AssignTickets
      | Self::ViewAllTickets
      | Self::ViewInternalComments
      | Self::CreateInternalComments => Role::Agent,
      Self::ManageUsers | Self::ManageOrganization => Role::Admin,
    }
  }
}

impl Role {
  /// Trim, lower-case and match against the known roles.
  pub fn parse(raw: &str) -> Result<Self, Error> {
    let normalised = raw.trim().to_lowercase();
    normalised
      .parse::<Self>()
      .map_err(|_| Error::UnknownRole(raw.to_owned()))
  }

  pub fn all() -> impl Iterator<Item = Self> { Self::iter() }

  pub fn as_str(self) -> &'static str { self.into() }

  pub fn is_at_least(self, other: Role) -> bool { self >= other }

  pub fn can(self, capability: Capability) -> bool { self >= capability.minimum_role() }

  pub fn capabilities(self) -> Vec<Capability> {
    Capability::iter().filter(|c| self.can(*c)).collect()
  }

  pub fn can_create_tickets(self) -> bool { self.can(Capability::CreateTickets) }

  pub fn can_assign_tickets(self) -> bool { self.can(Capability::AssignTickets) }

  pub fn can_view_all_tickets(self) -> bool { self.can(Capability::ViewAllTickets) }

  pub fn can_manage_users(self) -> bool { self.can(Capability::ManageUsers) }

  pub fn can_view_internal_comments(self) -> bool { self.can(Capability::ViewInternalComments) }

  pub fn can_create_internal_comments(self) -> bool {
    self.can(Capability::CreateInternalComments)
  }

  pub fn can_manage_organization(self) -> bool { self.can(Capability::ManageOrganization) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn order_is_customer_agent_admin() {
    assert!(Role::Customer < Role::Agent);
    assert!(Role::Agent < Role::Admin);
    assert!(Role::Admin.is_at_least(Role::Agent));
    assert!(!Role::Customer.is_at_least(Role::Agent));
    assert_eq!(Role::all().collect::<Vec<_>>(), [Role::Customer, Role::Agent, Role::Admin]);
  }

  #[test]
  fn capabilities_are_monotonic() {
    for lower in Role::all() {
      for higher in Role::all().filter(|r| *r >= lower) {
        for cap in Capability::iter() {
          if lower.can(cap) {
            assert!(higher.can(cap), "{higher} lacks {cap} held by {lower}");
          }
        }
      }
    }
  }

  #[test]
  fn capability_table() {
    let c = Role::Customer;
    assert!(c.can_create_tickets());
    assert!(!c.can_assign_tickets());
    assert!(!c.can_view_all_tickets());
    assert!(!c.can_view_internal_comments());
    assert!(!c.can_create_internal_comments());
    assert!(!c.can_manage_users());
    assert!(!c.can_manage_organization());

    let a = Role::Agent;
    assert!(a.can_assign_tickets());
    assert!(a.can_view_all_tickets());
    assert!(a.can_view_internal_comments());
    assert!(a.can_create_internal_comments());
    assert!(!a.can_manage_users());
    assert!(!a.can_manage_organization());

    let admin = Role::Admin;
    assert!(admin.can_manage_users());
    assert!(admin.can_manage_organization());
    assert_eq!(admin.capabilities().len(), Capability::iter().count());
  }

  #[test]
  fn admin_only_capabilities() {
    let exclusive: Vec<_> = Capability::iter()
      .filter(|c| Role::Admin.can(*c) && !Role::Agent.can(*c))
      .collect();
    assert_eq!(exclusive, [Capability::ManageUsers, Capability::ManageOrganization]);
  }

  #[test]
  fn parse_trims_and_lowercases() {
    assert_eq!(Role::parse("  Admin ").unwrap(), Role::Admin);
    assert_eq!(Role::parse("AGENT").unwrap(), Role::Agent);
    assert_eq!(Role::parse("customer").unwrap(), Role::Customer);
  }

  #[test]
  fn parse_rejects_unknown() {
    assert!(matches!(Role::parse("root"), Err(Error::UnknownRole(s)) if s == "root"));
    assert!(matches!(Role::parse(""), Err(Error::UnknownRole(_))));
  }

  #[test]
  fn display_round_trips() {
    for role in Role::all() {
      assert_eq!(Role::parse(&role.to_string()).unwrap(), role);
      assert_eq!(role.as_str(), role.to_string());
    }
  }
}
