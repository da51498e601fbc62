//! Handlers for category endpoints.
//!
//! Categories are created and listed under their organization and addressed
//! directly by id otherwise.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/organizations/:id/categories` | Query: [`ListCriteria`] |
//! | `POST`   | `/organizations/:id/categories` | Body: [`CreateBody`]; returns 201 |
//! | `GET`    | `/organizations/:id/categories/tree` | Every root category with its subtree |
//! | `GET`    | `/categories/:id` | 404 if not found |
//! | `PATCH`  | `/categories/:id` | Body: [`UpdateBody`] |
//! | `DELETE` | `/categories/:id` | 409 while children remain |
//! | `PUT`    | `/categories/:id/parent` | Body: `{"parent_id": <uuid\|null>}` |
//! | `GET`    | `/categories/:id/tree` | Subtree rooted at `:id` |
//! | `GET`    | `/categories/:id/path` | `{"path": "IT / Hardware"}` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use helpdesk_core::{
  Error as CoreError,
  category::Category,
  clock::Clock,
  filter::ListCriteria,
  hierarchy::TreeNode,
  service::{CategoryChanges, NewCategory},
  store::DeskStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ParentBody, SharedService, error::ApiError, organizations::PathResponse};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /organizations/:id/categories[?parent_id=...][&is_active=...][&limit=...]`
pub async fn list<S, C>(
  State(service): State<SharedService<S, C>>,
  Path(organization_id): Path<Uuid>,
  Query(criteria): Query<ListCriteria>,
) -> Result<Json<Vec<Category>>, ApiError>
where
  S: DeskStore,
  C: Clock,
  CoreError: From<S::Error>,
{
  Ok(Json(service.list_categories(organization_id, criteria).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:        String,
  #[serde(default)]
  pub description: String,
  pub parent_id:   Option<Uuid>,
}

impl From<CreateBody> for NewCategory {
  fn from(body: CreateBody) -> Self {
    Self { name: body.name, description: body.description, parent_id: body.parent_id }
  }
}

/// `POST /organizations/:id/categories`, body: `{"name":"IT","parent_id":null}`
pub async fn create<S, C>(
  State(service): State<SharedService<S, C>>,
  Path(organization_id): Path<Uuid>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DeskStore,
  C: Clock,
  CoreError: From<S::Error>,
{
  let category = service.create_category(organization_id, body.into()).await?;
  Ok((StatusCode::CREATED, Json(category)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /categories/:id`
pub async fn get_one<S, C>(
  State(service): State<SharedService<S, C>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Category>, ApiError>
where
  S: DeskStore,
  C: Clock,
  CoreError: From<S::Error>,
{
  Ok(Json(service.get_category(id).await?))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub name:        Option<String>,
  pub description: Option<String>,
  pub is_active:   Option<bool>,
}

impl From<UpdateBody> for CategoryChanges {
  fn from(body: UpdateBody) -> Self {
    Self { name: body.name, description: body.description, is_active: body.is_active }
  }
}

/// `PATCH /categories/:id`
pub async fn update<S, C>(
  State(service): State<SharedService<S, C>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Category>, ApiError>
where
  S: DeskStore,
  C: Clock,
  CoreError: From<S::Error>,
{
  Ok(Json(service.update_category(id, body.into()).await?))
}

/// `PUT /categories/:id/parent`
pub async fn move_to<S, C>(
  State(service): State<SharedService<S, C>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ParentBody>,
) -> Result<Json<Category>, ApiError>
where
  S: DeskStore,
  C: Clock,
  CoreError: From<S::Error>,
{
  Ok(Json(service.move_category(id, body.parent_id).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /categories/:id`
pub async fn delete<S, C>(
  State(service): State<SharedService<S, C>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: DeskStore,
  C: Clock,
  CoreError: From<S::Error>,
{
  service.delete_category(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Structure ────────────────────────────────────────────────────────────────

/// `GET /organizations/:id/categories/tree`
pub async fn forest<S, C>(
  State(service): State<SharedService<S, C>>,
  Path(organization_id): Path<Uuid>,
) -> Result<Json<Vec<TreeNode<Category>>>, ApiError>
where
  S: DeskStore,
  C: Clock,
  CoreError: From<S::Error>,
{
  Ok(Json(service.category_forest(organization_id).await?))
}

/// `GET /categories/:id/tree`
pub async fn tree<S, C>(
  State(service): State<SharedService<S, C>>,
  Path(id): Path<Uuid>,
) -> Result<Json<TreeNode<Category>>, ApiError>
where
  S: DeskStore,
  C: Clock,
  CoreError: From<S::Error>,
{
  Ok(Json(service.category_tree(id).await?))
}

/// `GET /categories/:id/path`
pub async fn path<S, C>(
  State(service): State<SharedService<S, C>>,
  Path(id): Path<Uuid>,
) -> Result<Json<PathResponse>, ApiError>
where
  S: DeskStore,
  C: Clock,
  CoreError: From<S::Error>,
{
  let path = service.category_path(id).await?;
  Ok(Json(PathResponse { id, path }))
}
