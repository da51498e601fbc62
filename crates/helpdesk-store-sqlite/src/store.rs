//! [`SqliteStore`]: the SQLite implementation of [`DeskStore`].

use std::path::Path;

use helpdesk_core::{
  category::Category,
  filter::{CategoryQuery, ListQuery, OrganizationQuery},
  organization::Organization,
  store::DeskStore,
};
use rusqlite::{OptionalExtension as _, types::Value};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    CATEGORY_COLUMNS, ORGANIZATION_COLUMNS, RawCategory, RawOrganization, category_sort_column,
    encode_dt, encode_sort_order, encode_uuid, organization_sort_column,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A help-desk store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("sqlite schema initialised");
    Ok(())
  }

  /// Run a `SELECT COUNT(*)` with a single text parameter.
  async fn count(&self, sql: &'static str, id: Uuid) -> Result<usize> {
    let id_str = encode_uuid(id);
    let n: i64 = self
      .conn
      .call(move |conn| Ok(conn.query_row(sql, rusqlite::params![id_str], |r| r.get(0))?))
      .await?;
    Ok(usize::try_from(n).unwrap_or_default())
  }

  /// Execute a write, reporting constraint violations as [`Error::Conflict`].
  async fn write(&self, sql: &'static str, params: Vec<Value>) -> Result<usize> {
    self
      .conn
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params_from_iter(params))?))
      .await
      .map_err(Error::from_write)
  }
}

/// WHERE clause and parameters shared by both listings.
///
/// `scope` names the tenant column for categories; organizations have none.
fn list_conditions<K>(
  query: &ListQuery<K>,
  scope: Option<&'static str>,
) -> (String, Vec<Value>) {
  let mut conds: Vec<String> = Vec::new();
  let mut params: Vec<Value> = Vec::new();

  if let (Some(column), Some(org)) = (scope, query.organization_id) {
    params.push(Value::Text(encode_uuid(org)));
    conds.push(format!("{column} = ?{}", params.len()));
  }
  if let Some(parent) = query.parent_id {
    params.push(Value::Text(encode_uuid(parent)));
    conds.push(format!("parent_id = ?{}", params.len()));
  }
  if query.root_only {
    conds.push("parent_id IS NULL".to_owned());
  }
  if let Some(active) = query.is_active {
    params.push(Value::Integer(i64::from(active)));
    conds.push(format!("is_active = ?{}", params.len()));
  }
  if let Some(name) = &query.name_contains {
    params.push(Value::Text(name.clone()));
    conds.push(format!("instr(lower(name), lower(?{})) > 0", params.len()));
  }

  let where_clause = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };
  (where_clause, params)
}

fn page_params(limit: usize, offset: usize, params: &mut Vec<Value>) -> String {
  params.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
  let limit_idx = params.len();
  params.push(Value::Integer(i64::try_from(offset).unwrap_or(i64::MAX)));
  format!("LIMIT ?{limit_idx} OFFSET ?{}", params.len())
}

fn opt_uuid(id: Option<Uuid>) -> Value {
  id.map_or(Value::Null, |id| Value::Text(encode_uuid(id)))
}

// ─── DeskStore impl ──────────────────────────────────────────────────────────

impl DeskStore for SqliteStore {
  type Error = Error;

  // ── Organizations ─────────────────────────────────────────────────────────

  async fn get_organization(&self, id: Uuid) -> Result<Option<Organization>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawOrganization> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE id = ?1"),
              rusqlite::params![id_str],
              RawOrganization::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawOrganization::into_organization).transpose()
  }

  async fn save_organization(&self, organization: &Organization) -> Result<()> {
    let params = vec![
      Value::Text(encode_uuid(organization.id())),
      Value::Text(organization.name().to_owned()),
      organization
        .domain()
        .map_or(Value::Null, |d| Value::Text(d.to_owned())),
      opt_uuid(organization.parent_id()),
      Value::Integer(i64::from(organization.is_active())),
      Value::Text(encode_dt(organization.created_at())),
      Value::Text(encode_dt(organization.updated_at())),
    ];

    self
      .write(
        "INSERT INTO organizations
           (id, name, domain, parent_id, is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT (id) DO UPDATE SET
           name       = excluded.name,
           domain     = excluded.domain,
           parent_id  = excluded.parent_id,
           is_active  = excluded.is_active,
           updated_at = excluded.updated_at",
        params,
      )
      .await?;
    Ok(())
  }

  async fn delete_organization(&self, id: Uuid) -> Result<bool> {
    let n = self
      .write(
        "DELETE FROM organizations WHERE id = ?1",
        vec![Value::Text(encode_uuid(id))],
      )
      .await?;
    Ok(n > 0)
  }

  async fn list_organizations(&self, query: &OrganizationQuery) -> Result<Vec<Organization>> {
    let (where_clause, mut params) = list_conditions(query, None);
    let page = page_params(query.limit, query.offset, &mut params);
    let sql = format!(
      "SELECT {ORGANIZATION_COLUMNS} FROM organizations {where_clause}
       ORDER BY {} {}, id {page}",
      organization_sort_column(query.sort_by),
      encode_sort_order(query.sort_order),
    );

    let raws: Vec<RawOrganization> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawOrganization::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawOrganization::into_organization).collect()
  }

  async fn all_organizations(&self) -> Result<Vec<Organization>> {
    let raws: Vec<RawOrganization> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ORGANIZATION_COLUMNS} FROM organizations ORDER BY created_at, rowid"
        ))?;
        let rows = stmt
          .query_map([], RawOrganization::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawOrganization::into_organization).collect()
  }

  // ── Categories ────────────────────────────────────────────────────────────

  async fn get_category(&self, id: Uuid) -> Result<Option<Category>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCategory> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1"),
              rusqlite::params![id_str],
              RawCategory::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCategory::into_category).transpose()
  }

  async fn save_category(&self, category: &Category) -> Result<()> {
    let params = vec![
      Value::Text(encode_uuid(category.id())),
      Value::Text(encode_uuid(category.organization_id())),
      Value::Text(category.name().to_owned()),
      Value::Text(category.description().to_owned()),
      opt_uuid(category.parent_id()),
      Value::Integer(i64::from(category.is_active())),
      Value::Text(encode_dt(category.created_at())),
      Value::Text(encode_dt(category.updated_at())),
    ];

    // A category never changes tenant, so organization_id is not updated.
    self
      .write(
        "INSERT INTO categories
           (id, organization_id, name, description, parent_id,
            is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT (id) DO UPDATE SET
           name        = excluded.name,
           description = excluded.description,
           parent_id   = excluded.parent_id,
           is_active   = excluded.is_active,
           updated_at  = excluded.updated_at",
        params,
      )
      .await?;
    Ok(())
  }

  async fn delete_category(&self, id: Uuid) -> Result<bool> {
    let n = self
      .write(
        "DELETE FROM categories WHERE id = ?1",
        vec![Value::Text(encode_uuid(id))],
      )
      .await?;
    Ok(n > 0)
  }

  async fn list_categories(&self, query: &CategoryQuery) -> Result<Vec<Category>> {
    let (where_clause, mut params) = list_conditions(query, Some("organization_id"));
    let page = page_params(query.limit, query.offset, &mut params);
    let sql = format!(
      "SELECT {CATEGORY_COLUMNS} FROM categories {where_clause}
       ORDER BY {} {}, id {page}",
      category_sort_column(query.sort_by),
      encode_sort_order(query.sort_order),
    );

    let raws: Vec<RawCategory> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawCategory::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCategory::into_category).collect()
  }

  async fn categories_for_organization(&self, organization_id: Uuid) -> Result<Vec<Category>> {
    let org_str = encode_uuid(organization_id);

    let raws: Vec<RawCategory> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CATEGORY_COLUMNS} FROM categories
           WHERE organization_id = ?1
           ORDER BY created_at, rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![org_str], RawCategory::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCategory::into_category).collect()
  }

  // ── Structure ─────────────────────────────────────────────────────────────

  async fn count_child_organizations(&self, id: Uuid) -> Result<usize> {
    self
      .count("SELECT COUNT(*) FROM organizations WHERE parent_id = ?1", id)
      .await
  }

  async fn count_child_categories(&self, id: Uuid) -> Result<usize> {
    self
      .count("SELECT COUNT(*) FROM categories WHERE parent_id = ?1", id)
      .await
  }

  async fn count_organization_categories(&self, organization_id: Uuid) -> Result<usize> {
    self
      .count(
        "SELECT COUNT(*) FROM categories WHERE organization_id = ?1",
        organization_id,
      )
      .await
  }
}
