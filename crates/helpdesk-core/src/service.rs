//! [`HierarchyService`]: the layer between transport and storage.
//!
//! Entity methods only see one entity, so they only catch direct
//! self-parenting. This service sees the whole graph: before a reparent is
//! persisted it loads the tenant's flat parent relation and walks it with a
//! [`ParentGraph`], and it refuses category parents from another
//! organization.
//!
//! # Concurrency
//!
//! Entities are fetched fresh for every call and never shared between
//! calls; the service holds no entity state of its own. Two concurrent
//! updates of the same entity each work on their own copy and the store
//! serialises the writes, so the last write wins.
//!
//! Structural writes are different: a reparent is only valid against the
//! graph it was checked on. Moves, and creates with a parent, therefore
//! hold a per-kind lock from loading the graph until the row is saved, so
//! two moves can never each pass the check against the other's stale view.
//! The lock lives in the service, so every writer must share one instance.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
  Error, Result,
  category::Category,
  clock::{Clock, SystemClock},
  error::Field,
  filter::ListCriteria,
  hierarchy::{self, Hierarchical, ParentGraph, TreeNode},
  organization::Organization,
  store::DeskStore,
};

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`HierarchyService::create_organization`].
#[derive(Debug, Clone, Default)]
pub struct NewOrganization {
  pub name:      String,
  /// Empty for no domain.
  pub domain:    String,
  pub parent_id: Option<Uuid>,
}

/// Partial update; `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct OrganizationChanges {
  pub name:      Option<String>,
  /// `Some("")` clears the domain.
  pub domain:    Option<String>,
  pub is_active: Option<bool>,
}

/// Input to [`HierarchyService::create_category`].
#[derive(Debug, Clone, Default)]
pub struct NewCategory {
  pub name:        String,
  pub description: String,
  pub parent_id:   Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
  pub name:        Option<String>,
  pub description: Option<String>,
  pub is_active:   Option<bool>,
}

// ─── Service ─────────────────────────────────────────────────────────────────

pub struct HierarchyService<S, C = SystemClock> {
  store:               Arc<S>,
  clock:               C,
  /// Held by structural writes from graph load until save, one per kind.
  organization_layout: Mutex<()>,
  category_layout:     Mutex<()>,
}

impl<S> HierarchyService<S> {
  pub fn new(store: Arc<S>) -> Self { Self::with_clock(store, SystemClock) }
}

impl<S, C> HierarchyService<S, C> {
  pub fn with_clock(store: Arc<S>, clock: C) -> Self {
    Self {
      store,
      clock,
      organization_layout: Mutex::new(()),
      category_layout: Mutex::new(()),
    }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }
}

impl<S, C> HierarchyService<S, C>
where
  S: DeskStore,
  C: Clock,
  Error: From<S::Error>,
{
  // ── Organizations ─────────────────────────────────────────────────────

  pub async fn create_organization(&self, input: NewOrganization) -> Result<Organization> {
    let organization =
      Organization::create(&input.name, &input.domain, input.parent_id, self.clock.now())?;

    let _layout = self.organization_layout.lock().await;
    if let Some(parent_id) = input.parent_id {
      self.get_organization(parent_id).await?;
      let graph = ParentGraph::from_entities(self.store.all_organizations().await?);
      graph.ensure_within_depth(organization.id(), Some(parent_id))?;
    }

    self.store.save_organization(&organization).await?;
    tracing::info!(
      organization_id = %organization.id(),
      name = organization.name(),
      "created organization"
    );
    Ok(organization)
  }

  pub async fn get_organization(&self, id: Uuid) -> Result<Organization> {
    self
      .store
      .get_organization(id)
      .await?
      .ok_or(Error::NotFound(id))
  }

  pub async fn list_organizations(&self, criteria: ListCriteria) -> Result<Vec<Organization>> {
    let query = criteria.shape()?;
    Ok(self.store.list_organizations(&query).await?)
  }

  pub async fn update_organization(
    &self,
    id: Uuid,
    changes: OrganizationChanges,
  ) -> Result<Organization> {
    let mut organization = self.get_organization(id).await?;
    let now = self.clock.now();

    if let Some(name) = &changes.name {
      organization.change_name(name, now)?;
    }
    if let Some(domain) = &changes.domain {
      organization.change_domain(domain, now)?;
    }
    match changes.is_active {
      Some(true) => organization.activate(now),
      Some(false) => organization.deactivate(now),
      None => {}
    }

    self.store.save_organization(&organization).await?;
    Ok(organization)
  }

  /// Re-home an organization, or make it a root when `parent_id` is `None`.
  pub async fn move_organization(
    &self,
    id: Uuid,
    parent_id: Option<Uuid>,
  ) -> Result<Organization> {
    let _layout = self.organization_layout.lock().await;
    let mut organization = self.get_organization(id).await?;
    let now = self.clock.now();

    match parent_id {
      None => organization.move_to_root(now),
      Some(parent_id) => {
        organization.change_parent(Some(parent_id), now)?;
        let graph = ParentGraph::from_entities(self.store.all_organizations().await?);
        check_graph(&graph, id, parent_id)?;
      }
    }

    self.store.save_organization(&organization).await?;
    tracing::info!(organization_id = %id, parent_id = ?parent_id, "moved organization");
    Ok(organization)
  }

  /// Hard-delete an organization that has no child organizations and no
  /// categories.
  pub async fn delete_organization(&self, id: Uuid) -> Result<()> {
    self.get_organization(id).await?;

    let children = self.store.count_child_organizations(id).await?;
    if children > 0 {
      return Err(Error::Conflict(format!(
        "organization {id} still has child organizations ({children})"
      )));
    }
    let categories = self.store.count_organization_categories(id).await?;
    if categories > 0 {
      return Err(Error::Conflict(format!(
        "organization {id} still owns categories ({categories})"
      )));
    }

    if !self.store.delete_organization(id).await? {
      return Err(Error::NotFound(id));
    }
    tracing::info!(organization_id = %id, "deleted organization");
    Ok(())
  }

  pub async fn organization_tree(&self, root_id: Uuid) -> Result<TreeNode<Organization>> {
    hierarchy::assemble(self.store.all_organizations().await?, root_id)
  }

  pub async fn organization_forest(&self) -> Result<Vec<TreeNode<Organization>>> {
    hierarchy::assemble_forest(self.store.all_organizations().await?)
  }

  pub async fn organization_path(&self, id: Uuid) -> Result<String> {
    let all = self.store.all_organizations().await?;
    path_within(&all, id)
  }

  /// Whether a user with `email` may join organization `id` on the strength
  /// of their address alone. Inactive organizations admit nobody.
  pub async fn can_join_by_email(&self, id: Uuid, email: &str) -> Result<bool> {
    let organization = self.get_organization(id).await?;
    Ok(organization.is_active() && organization.can_user_join_by_email(email))
  }

  // ── Categories ────────────────────────────────────────────────────────

  pub async fn create_category(
    &self,
    organization_id: Uuid,
    input: NewCategory,
  ) -> Result<Category> {
    let category = Category::create(
      organization_id,
      &input.name,
      &input.description,
      input.parent_id,
      self.clock.now(),
    )?;
    self.get_organization(organization_id).await?;

    let _layout = self.category_layout.lock().await;
    if let Some(parent_id) = input.parent_id {
      let parent = self.get_category(parent_id).await?;
      ensure_same_organization(&category, &parent)?;
      let siblings = self
        .store
        .categories_for_organization(organization_id)
        .await?;
      let graph = ParentGraph::from_entities(&siblings);
      graph.ensure_within_depth(category.id(), Some(parent_id))?;
    }

    self.store.save_category(&category).await?;
    tracing::info!(
      category_id = %category.id(),
      organization_id = %organization_id,
      name = category.name(),
      "created category"
    );
    Ok(category)
  }

  pub async fn get_category(&self, id: Uuid) -> Result<Category> {
    self
      .store
      .get_category(id)
      .await?
      .ok_or(Error::NotFound(id))
  }

  /// List the categories of one organization. The organization in the path
  /// always wins over one given in `criteria`.
  pub async fn list_categories(
    &self,
    organization_id: Uuid,
    criteria: ListCriteria,
  ) -> Result<Vec<Category>> {
    let query = ListCriteria { organization_id: Some(organization_id), ..criteria }.shape()?;
    Ok(self.store.list_categories(&query).await?)
  }

  pub async fn update_category(&self, id: Uuid, changes: CategoryChanges) -> Result<Category> {
    let mut category = self.get_category(id).await?;
    let now = self.clock.now();

    if let Some(name) = &changes.name {
      category.change_name(name, now)?;
    }
    if let Some(description) = &changes.description {
      category.change_description(description, now)?;
    }
    match changes.is_active {
      Some(true) => category.activate(now),
      Some(false) => category.deactivate(now),
      None => {}
    }

    self.store.save_category(&category).await?;
    Ok(category)
  }

  pub async fn move_category(&self, id: Uuid, parent_id: Option<Uuid>) -> Result<Category> {
    let _layout = self.category_layout.lock().await;
    let mut category = self.get_category(id).await?;
    let now = self.clock.now();

    match parent_id {
      None => category.move_to_root(now),
      Some(parent_id) => {
        category.change_parent(Some(parent_id), now)?;
        let parent = self.get_category(parent_id).await?;
        ensure_same_organization(&category, &parent)?;

        let siblings = self
          .store
          .categories_for_organization(category.organization_id())
          .await?;
        check_graph(&ParentGraph::from_entities(&siblings), id, parent_id)?;
      }
    }

    self.store.save_category(&category).await?;
    tracing::info!(category_id = %id, parent_id = ?parent_id, "moved category");
    Ok(category)
  }

  pub async fn delete_category(&self, id: Uuid) -> Result<()> {
    self.get_category(id).await?;

    let children = self.store.count_child_categories(id).await?;
    if children > 0 {
      return Err(Error::Conflict(format!(
        "category {id} still has child categories ({children})"
      )));
    }

    if !self.store.delete_category(id).await? {
      return Err(Error::NotFound(id));
    }
    tracing::info!(category_id = %id, "deleted category");
    Ok(())
  }

  /// The subtree below category `root_id`, drawn from its organization.
  pub async fn category_tree(&self, root_id: Uuid) -> Result<TreeNode<Category>> {
    let root = self.get_category(root_id).await?;
    let flat = self
      .store
      .categories_for_organization(root.organization_id())
      .await?;
    hierarchy::assemble(flat, root_id)
  }

  pub async fn category_forest(&self, organization_id: Uuid) -> Result<Vec<TreeNode<Category>>> {
    self.get_organization(organization_id).await?;
    let flat = self
      .store
      .categories_for_organization(organization_id)
      .await?;
    hierarchy::assemble_forest(flat)
  }

  pub async fn category_path(&self, id: Uuid) -> Result<String> {
    let category = self.get_category(id).await?;
    let flat = self
      .store
      .categories_for_organization(category.organization_id())
      .await?;
    path_within(&flat, id)
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn check_graph(graph: &ParentGraph, child: Uuid, parent: Uuid) -> Result<()> {
  graph.ensure_acyclic(child, Some(parent)).inspect_err(|e| {
    if matches!(e, Error::CircularReference(_)) {
      tracing::warn!(child = %child, parent = %parent, "rejected circular reparent");
    }
  })?;
  graph.ensure_within_depth(child, Some(parent)).inspect_err(|_| {
    tracing::warn!(child = %child, parent = %parent, "rejected reparent past depth limit");
  })
}

/// A category may only hang below a category of its own organization.
fn ensure_same_organization(category: &Category, parent: &Category) -> Result<()> {
  if parent.belongs_to_organization(category.organization_id()) {
    Ok(())
  } else {
    Err(Error::Validation {
      field:  Field::ParentId,
      reason: format!(
        "parent {} belongs to a different organization",
        parent.id()
      ),
    })
  }
}

fn path_within<T: Hierarchical>(flat: &[T], id: Uuid) -> Result<String> {
  let by_id: HashMap<Uuid, &T> = flat.iter().map(|e| (e.id(), e)).collect();
  let entity = by_id.get(&id).copied().ok_or(Error::NotFound(id))?;
  hierarchy::resolve_path(entity, |ancestor| {
    by_id.get(&ancestor).copied().ok_or(Error::NotFound(ancestor))
  })
}
