//! JSON REST API for the help desk.
//!
//! Exposes an axum [`Router`] backed by a [`HierarchyService`] over any
//! [`DeskStore`]. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", helpdesk_api::api_router(service.clone()))
//! ```

pub mod categories;
pub mod error;
pub mod organizations;
pub mod roles;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, put},
};
use helpdesk_core::{clock::Clock, service::HierarchyService, store::DeskStore};
use serde::Deserialize;
use uuid::Uuid;

pub use error::ApiError;

/// Router state: one service shared by every request.
pub type SharedService<S, C> = Arc<HierarchyService<S, C>>;

/// Body of the `PUT .../parent` endpoints. A `null` or missing `parent_id`
/// makes the entity a root.
#[derive(Debug, Deserialize)]
pub struct ParentBody {
  pub parent_id: Option<Uuid>,
}

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, C>(service: SharedService<S, C>) -> Router<()>
where
  S: DeskStore + 'static,
  C: Clock + 'static,
  helpdesk_core::Error: From<S::Error>,
{
  Router::new()
    // Organizations
    .route(
      "/organizations",
      get(organizations::list::<S, C>).post(organizations::create::<S, C>),
    )
    .route("/organizations/tree", get(organizations::forest::<S, C>))
    .route(
      "/organizations/{id}",
      get(organizations::get_one::<S, C>)
        .patch(organizations::update::<S, C>)
        .delete(organizations::delete::<S, C>),
    )
    .route("/organizations/{id}/parent", put(organizations::move_to::<S, C>))
    .route("/organizations/{id}/tree", get(organizations::tree::<S, C>))
    .route("/organizations/{id}/path", get(organizations::path::<S, C>))
    .route("/organizations/{id}/join", get(organizations::join::<S, C>))
    // Categories
    .route(
      "/organizations/{id}/categories",
      get(categories::list::<S, C>).post(categories::create::<S, C>),
    )
    .route("/organizations/{id}/categories/tree", get(categories::forest::<S, C>))
    .route(
      "/categories/{id}",
      get(categories::get_one::<S, C>)
        .patch(categories::update::<S, C>)
        .delete(categories::delete::<S, C>),
    )
    .route("/categories/{id}/parent", put(categories::move_to::<S, C>))
    .route("/categories/{id}/tree", get(categories::tree::<S, C>))
    .route("/categories/{id}/path", get(categories::path::<S, C>))
    // Roles
    .route("/roles", get(roles::list))
    .with_state(service)
}
