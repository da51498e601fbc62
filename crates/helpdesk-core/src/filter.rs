//! Shaping of list requests.
//!
//! [`ListCriteria`] is what arrives from the outside: signed paging numbers
//! and free-text sort options. [`ListCriteria::shape`] turns it into a
//! [`ListQuery`] with defaults applied and every value checked against an
//! allow-list. How the query is executed is up to the store.

use std::fmt;

use serde::Deserialize;
use uuid::Uuid;

use crate::{Error, Result, error::Field};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// A column a listing may be ordered by.
pub trait SortKey: Copy + Default + fmt::Debug + 'static {
  /// Every accepted key with its external name.
  const ALLOWED: &'static [(&'static str, Self)];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
  #[default]
  Asc,
  Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategorySort {
  #[default]
  Name,
  CreatedAt,
  UpdatedAt,
}

impl SortKey for CategorySort {
  const ALLOWED: &'static [(&'static str, Self)] = &[
    ("name", Self::Name),
    ("created_at", Self::CreatedAt),
    ("updated_at", Self::UpdatedAt),
  ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrganizationSort {
  #[default]
  Name,
  Domain,
  CreatedAt,
  UpdatedAt,
}

impl SortKey for OrganizationSort {
  const ALLOWED: &'static [(&'static str, Self)] = &[
    ("name", Self::Name),
    ("domain", Self::Domain),
    ("created_at", Self::CreatedAt),
    ("updated_at", Self::UpdatedAt),
  ];
}

/// Raw, unchecked listing criteria, typically deserialised from a query
/// string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListCriteria {
  /// Owning organization; only meaningful for categories.
  pub organization_id: Option<Uuid>,
  pub parent_id:       Option<Uuid>,
  pub is_active:       Option<bool>,
  /// Case-insensitive substring of the name.
  pub name:            Option<String>,
  #[serde(default)]
  pub root_only:       bool,
  pub limit:           Option<i64>,
  pub offset:          Option<i64>,
  pub sort_by:         Option<String>,
  pub sort_order:      Option<String>,
}

/// Validated criteria with every default filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery<K> {
  pub organization_id: Option<Uuid>,
  pub parent_id:       Option<Uuid>,
  pub is_active:       Option<bool>,
  pub name_contains:   Option<String>,
  pub root_only:       bool,
  pub limit:           usize,
  pub offset:          usize,
  pub sort_by:         K,
  pub sort_order:      SortOrder,
}

pub type CategoryQuery = ListQuery<CategorySort>;
pub type OrganizationQuery = ListQuery<OrganizationSort>;

impl<K: SortKey> Default for ListQuery<K> {
  fn default() -> Self {
    Self {
      organization_id: None,
      parent_id:       None,
      is_active:       None,
      name_contains:   None,
      root_only:       false,
      limit:           DEFAULT_PAGE_SIZE,
      offset:          0,
      sort_by:         K::default(),
      sort_order:      SortOrder::default(),
    }
  }
}

impl ListCriteria {
  pub fn shape<K: SortKey>(self) -> Result<ListQuery<K>> {
    let limit = match self.limit {
      None | Some(0) => DEFAULT_PAGE_SIZE,
      Some(n) if n < 0 => {
        return Err(Error::validation(Field::Limit, "must not be negative"));
      }
      Some(n) => usize::try_from(n).unwrap_or(MAX_PAGE_SIZE).min(MAX_PAGE_SIZE),
    };

    let offset = match self.offset {
      None => 0,
      Some(n) => usize::try_from(n)
        .map_err(|_| Error::validation(Field::Offset, "must not be negative"))?,
    };

    let sort_by = match self.sort_by.as_deref().map(str::trim) {
      None | Some("") => K::default(),
      Some(raw) => K::ALLOWED
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(raw))
        .map(|(_, key)| *key)
        .ok_or_else(|| {
          let allowed: Vec<_> = K::ALLOWED.iter().map(|(name, _)| *name).collect();
          Error::validation(
            Field::SortBy,
            format!("{raw:?} is not one of {}", allowed.join(", ")),
          )
        })?,
    };

    let sort_order = match self.sort_order.as_deref().map(str::trim) {
      None | Some("") => SortOrder::Asc,
      Some(raw) if raw.eq_ignore_ascii_case("asc") => SortOrder::Asc,
      Some(raw) if raw.eq_ignore_ascii_case("desc") => SortOrder::Desc,
      Some(raw) => {
        return Err(Error::validation(
          Field::SortOrder,
          format!("{raw:?} is not asc or desc"),
        ));
      }
    };

    if self.root_only && self.parent_id.is_some() {
      return Err(Error::validation(
        Field::ParentId,
        "cannot be combined with root_only",
      ));
    }

    let name_contains = self
      .name
      .map(|n| n.trim().to_owned())
      .filter(|n| !n.is_empty());

    Ok(ListQuery {
      organization_id: self.organization_id,
      parent_id: self.parent_id,
      is_active: self.is_active,
      name_contains,
      root_only: self.root_only,
      limit,
      offset,
      sort_by,
      sort_order,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn shape_categories(criteria: ListCriteria) -> Result<CategoryQuery> { criteria.shape() }

  #[test]
  fn empty_criteria_get_defaults() {
    let q = shape_categories(ListCriteria::default()).unwrap();
    assert_eq!(q, CategoryQuery::default());
    assert_eq!(q.limit, DEFAULT_PAGE_SIZE);
    assert_eq!(q.offset, 0);
    assert_eq!(q.sort_by, CategorySort::Name);
    assert_eq!(q.sort_order, SortOrder::Asc);
  }

  #[test]
  fn limit_is_defaulted_and_capped() {
    let with_limit = |limit| ListCriteria { limit: Some(limit), ..Default::default() };
    assert_eq!(shape_categories(with_limit(0)).unwrap().limit, DEFAULT_PAGE_SIZE);
    assert_eq!(shape_categories(with_limit(7)).unwrap().limit, 7);
    assert_eq!(shape_categories(with_limit(100)).unwrap().limit, MAX_PAGE_SIZE);
    assert_eq!(shape_categories(with_limit(10_000)).unwrap().limit, MAX_PAGE_SIZE);
  }

  #[test]
  fn negative_paging_is_rejected() {
    let err = shape_categories(ListCriteria { limit: Some(-1), ..Default::default() })
      .unwrap_err();
    assert_eq!(err.field(), Some(Field::Limit));

    let err = shape_categories(ListCriteria { offset: Some(-5), ..Default::default() })
      .unwrap_err();
    assert_eq!(err.field(), Some(Field::Offset));
  }

  #[test]
  fn sort_field_comes_from_allow_list() {
    let sorted = |field: &str| ListCriteria {
      sort_by: Some(field.into()),
      ..Default::default()
    };
    assert_eq!(shape_categories(sorted("created_at")).unwrap().sort_by, CategorySort::CreatedAt);
    assert_eq!(shape_categories(sorted("UPDATED_AT")).unwrap().sort_by, CategorySort::UpdatedAt);

    let err = shape_categories(sorted("domain")).unwrap_err();
    assert_eq!(err.field(), Some(Field::SortBy));

    let q: OrganizationQuery = sorted("domain").shape().unwrap();
    assert_eq!(q.sort_by, OrganizationSort::Domain);

    let err = sorted("name; DROP TABLE categories").shape::<OrganizationSort>().unwrap_err();
    assert_eq!(err.field(), Some(Field::SortBy));
  }

  #[test]
  fn sort_order_is_checked() {
    let ordered = |o: &str| ListCriteria { sort_order: Some(o.into()), ..Default::default() };
    assert_eq!(shape_categories(ordered("DESC")).unwrap().sort_order, SortOrder::Desc);
    assert_eq!(shape_categories(ordered("asc")).unwrap().sort_order, SortOrder::Asc);
    let err = shape_categories(ordered("sideways")).unwrap_err();
    assert_eq!(err.field(), Some(Field::SortOrder));
  }

  #[test]
  fn root_only_conflicts_with_parent() {
    let err = shape_categories(ListCriteria {
      root_only: true,
      parent_id: Some(Uuid::new_v4()),
      ..Default::default()
    })
    .unwrap_err();
    assert_eq!(err.field(), Some(Field::ParentId));
  }

  #[test]
  fn blank_name_filter_is_dropped() {
    let q = shape_categories(ListCriteria { name: Some("   ".into()), ..Default::default() })
      .unwrap();
    assert_eq!(q.name_contains, None);

    let q = shape_categories(ListCriteria { name: Some(" lap ".into()), ..Default::default() })
      .unwrap();
    assert_eq!(q.name_contains.as_deref(), Some("lap"));
  }

  #[test]
  fn scopes_pass_through() {
    let org = Uuid::new_v4();
    let parent = Uuid::new_v4();
    let q = shape_categories(ListCriteria {
      organization_id: Some(org),
      parent_id: Some(parent),
      is_active: Some(false),
      ..Default::default()
    })
    .unwrap();
    assert_eq!(q.organization_id, Some(org));
    assert_eq!(q.parent_id, Some(parent));
    assert_eq!(q.is_active, Some(false));
  }
}
