use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use pvz_auth::Role;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// Issue a token for the requested role without credentials.
pub async fn dummy_login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::DummyLoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(e) => return errors::bad_request(e.body_text()),
    };

    let role: Role = match body.role.parse() {
        Ok(role) => role,
        Err(e) => return errors::bad_request(format!("{e}; expected employee or moderator")),
    };

    match services.jwt.issue(role, Utc::now()) {
        Ok(token) => {
            tracing::info!(%role, "issued dummy token");
            (StatusCode::OK, Json(token)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to sign token");
            errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "token_error",
                "failed to issue token",
            )
        }
    }
}
