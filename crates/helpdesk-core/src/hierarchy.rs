//! Self-referencing trees built from flat storage.
//!
//! Categories and organizations are stored as flat rows, each carrying an
//! optional parent id. This module turns those rows back into trees, resolves
//! display paths, and validates proposed parent changes against the whole
//! graph. Nothing here performs I/O: callers fetch the flat set first.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use uuid::Uuid;

use crate::{Error, Result, error::Field};

/// Separator between names in a resolved path.
pub const PATH_DELIMITER: &str = " / ";

/// Deepest nesting a tree may reach, counting its root as level 1.
///
/// The service refuses creates and moves that would go past it, and
/// [`assemble`] reports anything deeper as [`Error::CorruptHierarchy`].
pub const MAX_DEPTH: usize = 64;

/// The shape shared by every entity that can have a parent of its own kind.
pub trait Hierarchical {
  fn id(&self) -> Uuid;
  fn parent_id(&self) -> Option<Uuid>;
  fn name(&self) -> &str;
}

impl<T: Hierarchical + ?Sized> Hierarchical for &T {
  fn id(&self) -> Uuid { (**self).id() }

  fn parent_id(&self) -> Option<Uuid> { (**self).parent_id() }

  fn name(&self) -> &str { (**self).name() }
}

// ─── Assembled tree ──────────────────────────────────────────────────────────

/// An entity together with its materialised children. Built on demand, never
/// stored.
#[derive(Debug, Clone, Serialize)]
pub struct TreeNode<T> {
  #[serde(flatten)]
  pub entity:   T,
  /// Empty for leaves, never absent.
  pub children: Vec<TreeNode<T>>,
}

impl<T> TreeNode<T> {
  /// Pre-order traversal: each node precedes its descendants.
  pub fn flatten(&self) -> Vec<&T> {
    let mut out = Vec::new();
    let mut stack = vec![self];
    while let Some(node) = stack.pop() {
      out.push(&node.entity);
      stack.extend(node.children.iter().rev());
    }
    out
  }

  /// Number of nodes in this subtree, including the root.
  pub fn node_count(&self) -> usize {
    let mut count = 0;
    let mut stack = vec![self];
    while let Some(node) = stack.pop() {
      count += 1;
      stack.extend(&node.children);
    }
    count
  }
}

/// Index over a flat set: every entity by id, and children ids per parent in
/// input order.
struct Index<T> {
  slots:    HashMap<Uuid, Option<T>>,
  children: HashMap<Uuid, Vec<Uuid>>,
  roots:    Vec<Uuid>,
}

impl<T: Hierarchical> Index<T> {
  fn build(items: Vec<T>) -> Result<Self> {
    let mut slots = HashMap::with_capacity(items.len());
    let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    let mut roots = Vec::new();

    for item in items {
      let id = item.id();
      match item.parent_id() {
        Some(parent) => children.entry(parent).or_default().push(id),
        None => roots.push(id),
      }
      if slots.insert(id, Some(item)).is_some() {
        return Err(Error::CorruptHierarchy(id));
      }
    }

    Ok(Self { slots, children, roots })
  }

  /// `depth` is the level of `id` in the tree being built; recursion stops
  /// past [`MAX_DEPTH`].
  fn materialise(
    &mut self,
    id: Uuid,
    depth: usize,
    visited: &mut HashSet<Uuid>,
  ) -> Result<TreeNode<T>> {
    if depth > MAX_DEPTH || !visited.insert(id) {
      return Err(Error::CorruptHierarchy(id));
    }
    let entity = self
      .slots
      .get_mut(&id)
      .and_then(Option::take)
      .ok_or(Error::NotFound(id))?;

    let child_ids = self.children.remove(&id).unwrap_or_default();
    let mut children = Vec::with_capacity(child_ids.len());
    for child in child_ids {
      children.push(self.materialise(child, depth + 1, visited)?);
    }
    Ok(TreeNode { entity, children })
  }
}

/// Rebuild the tree rooted at `root_id` from a flat set already scoped to one
/// tenant.
///
/// Children keep their input order. Fails with [`Error::NotFound`] when the
/// root is absent and with [`Error::CorruptHierarchy`] when the set contains
/// duplicate ids, a cycle through the root, or a chain more than
/// [`MAX_DEPTH`] levels below it.
pub fn assemble<T: Hierarchical>(items: Vec<T>, root_id: Uuid) -> Result<TreeNode<T>> {
  let mut index = Index::build(items)?;
  if !index.slots.contains_key(&root_id) {
    return Err(Error::NotFound(root_id));
  }
  index.materialise(root_id, 1, &mut HashSet::new())
}

/// Rebuild every tree in a flat set, one per root, in input order.
///
/// Entities that cannot be reached from any root (cycles, or parents missing
/// from the set) and trees deeper than [`MAX_DEPTH`] fail with
/// [`Error::CorruptHierarchy`].
pub fn assemble_forest<T: Hierarchical>(items: Vec<T>) -> Result<Vec<TreeNode<T>>> {
  let mut index = Index::build(items)?;
  let mut visited = HashSet::new();
  let roots = std::mem::take(&mut index.roots);

  let forest = roots
    .into_iter()
    .map(|root| index.materialise(root, 1, &mut visited))
    .collect::<Result<Vec<_>>>()?;

  if let Some((stray, _)) = index.slots.iter().find(|(_, slot)| slot.is_some()) {
    return Err(Error::CorruptHierarchy(*stray));
  }
  Ok(forest)
}

// ─── Path resolution ─────────────────────────────────────────────────────────

/// Build the root-first display path of `entity`, e.g. `IT / Hardware / Laptops`.
///
/// Ancestors are resolved one hop at a time through `lookup`, so the caller
/// decides where they come from. A root returns its own name without calling
/// `lookup`. Lookup failures abort the walk and are returned unchanged; an
/// ancestor chain that loops back on itself yields [`Error::CorruptHierarchy`].
pub fn resolve_path<T, A, E, F>(entity: &T, mut lookup: F) -> Result<String, E>
where
  T: Hierarchical + ?Sized,
  A: Hierarchical,
  E: From<Error>,
  F: FnMut(Uuid) -> Result<A, E>,
{
  let mut names = vec![entity.name().to_owned()];
  let mut seen = HashSet::from([entity.id()]);
  let mut next = entity.parent_id();

  while let Some(ancestor_id) = next {
    if !seen.insert(ancestor_id) {
      return Err(Error::CorruptHierarchy(ancestor_id).into());
    }
    let ancestor = lookup(ancestor_id)?;
    names.push(ancestor.name().to_owned());
    next = ancestor.parent_id();
  }

  names.reverse();
  Ok(names.join(PATH_DELIMITER))
}

// ─── Graph validation ────────────────────────────────────────────────────────

/// The whole parent relation of one tenant, used to reject multi-hop cycles
/// that a single entity cannot see.
#[derive(Debug, Clone, Default)]
pub struct ParentGraph {
  parents: HashMap<Uuid, Option<Uuid>>,
}

impl ParentGraph {
  pub fn from_entities<I>(items: I) -> Self
  where
    I: IntoIterator,
    I::Item: Hierarchical,
  {
    let parents = items
      .into_iter()
      .map(|e| (e.id(), e.parent_id()))
      .collect();
    Self { parents }
  }

  pub fn contains(&self, id: Uuid) -> bool { self.parents.contains_key(&id) }

  /// Check that giving `child` the parent `new_parent` keeps the graph acyclic.
  pub fn ensure_acyclic(&self, child: Uuid, new_parent: Option<Uuid>) -> Result<()> {
    let Some(parent) = new_parent else {
      return Ok(());
    };
    if parent == child {
      return Err(Error::CircularReference(child));
    }
    if !self.contains(parent) {
      return Err(Error::NotFound(parent));
    }
    for ancestor in self.ancestors(parent)? {
      if ancestor == child {
        return Err(Error::CircularReference(child));
      }
    }
    Ok(())
  }

  /// Ancestor ids of `id`, nearest first. The walk is bounded by the graph
  /// size; a longer chain can only be a cycle.
  pub fn ancestors(&self, id: Uuid) -> Result<Vec<Uuid>> {
    let mut chain = Vec::new();
    let mut next = self.parents.get(&id).copied().ok_or(Error::NotFound(id))?;

    while let Some(ancestor) = next {
      if chain.len() >= self.parents.len() {
        return Err(Error::CorruptHierarchy(id));
      }
      chain.push(ancestor);
      next = self
        .parents
        .get(&ancestor)
        .copied()
        .ok_or(Error::NotFound(ancestor))?;
    }
    Ok(chain)
  }

  /// Levels in the subtree rooted at `id`, counting `id` itself. An id the
  /// graph does not know is a lone node of height 1.
  pub fn height(&self, id: Uuid) -> usize {
    let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (&child, parent) in &self.parents {
      if let Some(parent) = parent {
        children.entry(*parent).or_default().push(child);
      }
    }

    let mut seen = HashSet::from([id]);
    let mut level = vec![id];
    let mut height = 0;
    while !level.is_empty() {
      height += 1;
      level = level
        .iter()
        .filter_map(|node| children.get(node))
        .flatten()
        .copied()
        .filter(|child| seen.insert(*child))
        .collect();
    }
    height
  }

  /// Check that hanging the subtree of `child` below `new_parent` stays
  /// within [`MAX_DEPTH`] levels.
  pub fn ensure_within_depth(&self, child: Uuid, new_parent: Option<Uuid>) -> Result<()> {
    let Some(parent) = new_parent else {
      return Ok(());
    };
    let parent_depth = self.ancestors(parent)?.len() + 1;
    if parent_depth + self.height(child) > MAX_DEPTH {
      return Err(Error::validation(
        Field::ParentId,
        format!("would nest deeper than {MAX_DEPTH} levels"),
      ));
    }
    Ok(())
  }
}
