//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so they sort correctly as text. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use helpdesk_core::{
  category::{Category, CategoryRecord},
  filter::{CategorySort, OrganizationSort, SortOrder},
  organization::{Organization, OrganizationRecord},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<&str>) -> Result<Option<Uuid>> { s.map(decode_uuid).transpose() }

// ─── DateTime<Utc> ──────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Sorting ─────────────────────────────────────────────────────────────────

pub fn category_sort_column(sort: CategorySort) -> &'static str {
  match sort {
    CategorySort::Name => "name",
    CategorySort::CreatedAt => "created_at",
    CategorySort::UpdatedAt => "updated_at",
  }
}

pub fn organization_sort_column(sort: OrganizationSort) -> &'static str {
  match sort {
    OrganizationSort::Name => "name",
    OrganizationSort::Domain => "domain",
    OrganizationSort::CreatedAt => "created_at",
    OrganizationSort::UpdatedAt => "updated_at",
  }
}

pub fn encode_sort_order(order: SortOrder) -> &'static str {
  match order {
    SortOrder::Asc => "ASC",
    SortOrder::Desc => "DESC",
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const ORGANIZATION_COLUMNS: &str =
  "id, name, domain, parent_id, is_active, created_at, updated_at";

/// Raw values read directly from an `organizations` row.
pub struct RawOrganization {
  pub id:         String,
  pub name:       String,
  pub domain:     Option<String>,
  pub parent_id:  Option<String>,
  pub is_active:  bool,
  pub created_at: String,
  pub updated_at: String,
}

impl RawOrganization {
  /// Read a row selected with [`ORGANIZATION_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      domain:     row.get(2)?,
      parent_id:  row.get(3)?,
      is_active:  row.get(4)?,
      created_at: row.get(5)?,
      updated_at: row.get(6)?,
    })
  }

  pub fn into_organization(self) -> Result<Organization> {
    Ok(Organization::restore(OrganizationRecord {
      id:         decode_uuid(&self.id)?,
      name:       self.name,
      domain:     self.domain,
      parent_id:  decode_opt_uuid(self.parent_id.as_deref())?,
      is_active:  self.is_active,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    }))
  }
}

pub const CATEGORY_COLUMNS: &str =
  "id, organization_id, name, description, parent_id, is_active, created_at, updated_at";

/// Raw values read directly from a `categories` row.
pub struct RawCategory {
  pub id:              String,
  pub organization_id: String,
  pub name:            String,
  pub description:     String,
  pub parent_id:       Option<String>,
  pub is_active:       bool,
  pub created_at:      String,
  pub updated_at:      String,
}

impl RawCategory {
  /// Read a row selected with [`CATEGORY_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      organization_id: row.get(1)?,
      name:            row.get(2)?,
      description:     row.get(3)?,
      parent_id:       row.get(4)?,
      is_active:       row.get(5)?,
      created_at:      row.get(6)?,
      updated_at:      row.get(7)?,
    })
  }

  pub fn into_category(self) -> Result<Category> {
    Ok(Category::restore(CategoryRecord {
      id:              decode_uuid(&self.id)?,
      organization_id: decode_uuid(&self.organization_id)?,
      name:            self.name,
      description:     self.description,
      parent_id:       decode_opt_uuid(self.parent_id.as_deref())?,
      is_active:       self.is_active,
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
    }))
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_sort_as_text() {
    let a = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let b = a + chrono::Duration::microseconds(1);
    let c = a + chrono::Duration::seconds(1);
    assert!(encode_dt(a) < encode_dt(b));
    assert!(encode_dt(b) < encode_dt(c));
    assert_eq!(encode_dt(a).len(), encode_dt(b).len());
  }

  #[test]
  fn timestamps_round_trip() {
    let t = Utc.with_ymd_and_hms(2024, 6, 30, 23, 59, 59).unwrap();
    assert_eq!(decode_dt(&encode_dt(t)).unwrap(), t);
    assert!(decode_dt("yesterday").is_err());
  }
}
