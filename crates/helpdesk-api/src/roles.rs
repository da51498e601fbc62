//! Handler for `GET /roles`: every role, lowest first, with what it may do.

use axum::Json;
use helpdesk_core::role::{Capability, Role};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RoleView {
  pub role:         Role,
  pub capabilities: Vec<Capability>,
}

/// `GET /roles`
pub async fn list() -> Json<Vec<RoleView>> {
  let roles = Role::all()
    .map(|role| RoleView { role, capabilities: role.capabilities() })
    .collect();
  Json(roles)
}
