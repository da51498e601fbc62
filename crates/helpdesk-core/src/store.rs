//! The `DeskStore` trait: everything the core needs from persistence.
//!
//! The trait is implemented by storage backends (e.g.
//! `helpdesk-store-sqlite`). The core never opens a connection itself: the
//! service layer fetches flat entity sets through this trait and hands them
//! to the pure functions in [`crate::hierarchy`].

use std::future::Future;

use uuid::Uuid;

use crate::{
  category::Category,
  filter::{CategoryQuery, OrganizationQuery},
  organization::Organization,
};

/// Abstraction over a help-desk storage backend.
///
/// `save_*` is an upsert keyed on the entity id. Uniqueness violations must
/// be reported as errors that convert into
/// [`Error::Conflict`](crate::Error::Conflict).
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait DeskStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Organizations ─────────────────────────────────────────────────────

  /// Retrieve an organization by id. Returns `None` if not found.
  fn get_organization(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Organization>, Self::Error>> + Send + '_;

  fn save_organization<'a>(
    &'a self,
    organization: &'a Organization,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Hard-delete an organization. Returns `false` if it did not exist.
  fn delete_organization(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_organizations<'a>(
    &'a self,
    query: &'a OrganizationQuery,
  ) -> impl Future<Output = Result<Vec<Organization>, Self::Error>> + Send + 'a;

  /// Every organization, unpaginated, in creation order.
  fn all_organizations(
    &self,
  ) -> impl Future<Output = Result<Vec<Organization>, Self::Error>> + Send + '_;

  // ── Categories ────────────────────────────────────────────────────────

  fn get_category(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Category>, Self::Error>> + Send + '_;

  fn save_category<'a>(
    &'a self,
    category: &'a Category,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn delete_category(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_categories<'a>(
    &'a self,
    query: &'a CategoryQuery,
  ) -> impl Future<Output = Result<Vec<Category>, Self::Error>> + Send + 'a;

  /// Every category of one organization, unpaginated, in creation order.
  fn categories_for_organization(
    &self,
    organization_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Category>, Self::Error>> + Send + '_;

  // ── Structure ─────────────────────────────────────────────────────────

  /// Number of direct children of an organization.
  fn count_child_organizations(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Number of direct children of a category.
  fn count_child_categories(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Number of categories owned by an organization.
  fn count_organization_categories(
    &self,
    organization_id: Uuid,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}
