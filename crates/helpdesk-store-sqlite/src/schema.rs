//! SQL schema for the help-desk SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS organizations (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    domain      TEXT UNIQUE,            -- lower-cased; NULL when unset
    parent_id   TEXT REFERENCES organizations(id),
    is_active   INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL,          -- RFC 3339 UTC, fixed width
    updated_at  TEXT NOT NULL,
    CHECK (parent_id IS NULL OR parent_id != id)
);

CREATE TABLE IF NOT EXISTS categories (
    id              TEXT PRIMARY KEY,
    organization_id TEXT NOT NULL REFERENCES organizations(id),
    name            TEXT NOT NULL,
    description     TEXT NOT NULL DEFAULT '',
    parent_id       TEXT REFERENCES categories(id),
    is_active       INTEGER NOT NULL DEFAULT 1,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL,
    CHECK (parent_id IS NULL OR parent_id != id)
);

-- Sibling names are unique within an organization; roots count as siblings.
CREATE UNIQUE INDEX IF NOT EXISTS categories_sibling_name_idx
    ON categories(organization_id, COALESCE(parent_id, ''), name);

CREATE INDEX IF NOT EXISTS organizations_parent_idx ON organizations(parent_id);
CREATE INDEX IF NOT EXISTS categories_org_idx       ON categories(organization_id);
CREATE INDEX IF NOT EXISTS categories_parent_idx    ON categories(parent_id);

PRAGMA user_version = 1;
";
