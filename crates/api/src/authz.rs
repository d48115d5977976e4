//! Role guard applied inside handlers, after authentication.

use axum::http::StatusCode;
use axum::response::Response;

use pvz_auth::{authorize, Role};

use crate::app::errors::json_error;
use crate::context::PrincipalContext;

/// Callers allowed to read pickup point listings.
pub const ANY_ROLE: &[Role] = &[Role::Employee, Role::Moderator];
pub const MODERATOR: &[Role] = &[Role::Moderator];
pub const EMPLOYEE: &[Role] = &[Role::Employee];

/// `Ok` if the caller's role is in `allowed`, otherwise a ready `403` response.
pub fn require_role(principal: &PrincipalContext, allowed: &[Role]) -> Result<(), Response> {
    authorize(&principal.principal(), allowed).map_err(|e| {
        tracing::info!(
            principal_id = %principal.principal_id(),
            role = %principal.role(),
            error = %e,
            "access denied"
        );
        json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string())
    })
}
