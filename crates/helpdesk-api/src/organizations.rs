//! Handlers for `/organizations` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/organizations` | Query: [`ListCriteria`] |
//! | `POST`   | `/organizations` | Body: [`CreateBody`]; returns 201 |
//! | `GET`    | `/organizations/tree` | Every root with its subtree |
//! | `GET`    | `/organizations/:id` | 404 if not found |
//! | `PATCH`  | `/organizations/:id` | Body: [`UpdateBody`] |
//! | `DELETE` | `/organizations/:id` | 409 while children or categories remain |
//! | `PUT`    | `/organizations/:id/parent` | Body: `{"parent_id": <uuid\|null>}` |
//! | `GET`    | `/organizations/:id/tree` | Subtree rooted at `:id` |
//! | `GET`    | `/organizations/:id/path` | `{"path": "A / B"}` |
//! | `GET`    | `/organizations/:id/join` | `?email=`; `{"can_join": bool}` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use helpdesk_core::{
  Error as CoreError,
  clock::Clock,
  filter::ListCriteria,
  hierarchy::TreeNode,
  organization::Organization,
  service::{NewOrganization, OrganizationChanges},
  store::DeskStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ParentBody, SharedService, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /organizations[?parent_id=...][&root_only=true][&name=...][&sort_by=...]`
pub async fn list<S, C>(
  State(service): State<SharedService<S, C>>,
  Query(criteria): Query<ListCriteria>,
) -> Result<Json<Vec<Organization>>, ApiError>
where
  S: DeskStore,
  C: Clock,
  CoreError: From<S::Error>,
{
  Ok(Json(service.list_organizations(criteria).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:      String,
  pub domain:    Option<String>,
  pub parent_id: Option<Uuid>,
}

impl From<CreateBody> for NewOrganization {
  fn from(body: CreateBody) -> Self {
    Self {
      name:      body.name,
      domain:    body.domain.unwrap_or_default(),
      parent_id: body.parent_id,
    }
  }
}

/// `POST /organizations`, body: `{"name":"Acme","domain":"acme.com"}`
pub async fn create<S, C>(
  State(service): State<SharedService<S, C>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DeskStore,
  C: Clock,
  CoreError: From<S::Error>,
{
  let organization = service.create_organization(body.into()).await?;
  Ok((StatusCode::CREATED, Json(organization)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /organizations/:id`
pub async fn get_one<S, C>(
  State(service): State<SharedService<S, C>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Organization>, ApiError>
where
  S: DeskStore,
  C: Clock,
  CoreError: From<S::Error>,
{
  Ok(Json(service.get_organization(id).await?))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// Absent fields are left unchanged; `"domain": ""` clears the domain.
#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub name:      Option<String>,
  pub domain:    Option<String>,
  pub is_active: Option<bool>,
}

impl From<UpdateBody> for OrganizationChanges {
  fn from(body: UpdateBody) -> Self {
    Self { name: body.name, domain: body.domain, is_active: body.is_active }
  }
}

/// `PATCH /organizations/:id`
pub async fn update<S, C>(
  State(service): State<SharedService<S, C>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Organization>, ApiError>
where
  S: DeskStore,
  C: Clock,
  CoreError: From<S::Error>,
{
  Ok(Json(service.update_organization(id, body.into()).await?))
}

/// `PUT /organizations/:id/parent`
pub async fn move_to<S, C>(
  State(service): State<SharedService<S, C>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ParentBody>,
) -> Result<Json<Organization>, ApiError>
where
  S: DeskStore,
  C: Clock,
  CoreError: From<S::Error>,
{
  Ok(Json(service.move_organization(id, body.parent_id).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /organizations/:id`
pub async fn delete<S, C>(
  State(service): State<SharedService<S, C>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: DeskStore,
  C: Clock,
  CoreError: From<S::Error>,
{
  service.delete_organization(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Structure ────────────────────────────────────────────────────────────────

/// `GET /organizations/tree`
pub async fn forest<S, C>(
  State(service): State<SharedService<S, C>>,
) -> Result<Json<Vec<TreeNode<Organization>>>, ApiError>
where
  S: DeskStore,
  C: Clock,
  CoreError: From<S::Error>,
{
  Ok(Json(service.organization_forest().await?))
}

/// `GET /organizations/:id/tree`
pub async fn tree<S, C>(
  State(service): State<SharedService<S, C>>,
  Path(id): Path<Uuid>,
) -> Result<Json<TreeNode<Organization>>, ApiError>
where
  S: DeskStore,
  C: Clock,
  CoreError: From<S::Error>,
{
  Ok(Json(service.organization_tree(id).await?))
}

#[derive(Debug, Serialize)]
pub struct PathResponse {
  pub id:   Uuid,
  pub path: String,
}

/// `GET /organizations/:id/path`
pub async fn path<S, C>(
  State(service): State<SharedService<S, C>>,
  Path(id): Path<Uuid>,
) -> Result<Json<PathResponse>, ApiError>
where
  S: DeskStore,
  C: Clock,
  CoreError: From<S::Error>,
{
  let path = service.organization_path(id).await?;
  Ok(Json(PathResponse { id, path }))
}

// ─── Join ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct JoinParams {
  pub email: String,
}

#[derive(Debug, Serialize)]
pub struct JoinResponse {
  pub organization_id: Uuid,
  pub email:           String,
  pub can_join:        bool,
}

/// `GET /organizations/:id/join?email=<address>`
pub async fn join<S, C>(
  State(service): State<SharedService<S, C>>,
  Path(id): Path<Uuid>,
  Query(params): Query<JoinParams>,
) -> Result<Json<JoinResponse>, ApiError>
where
  S: DeskStore,
  C: Clock,
  CoreError: From<S::Error>,
{
  let email = params.email.trim();
  if email.is_empty() {
    return Err(ApiError::BadRequest("email must not be empty".into()));
  }
  let can_join = service.can_join_by_email(id, email).await?;
  Ok(Json(JoinResponse { organization_id: id, email: email.to_owned(), can_join }))
}
