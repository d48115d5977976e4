use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use pvz_core::PickupPointId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz::{require_role, EMPLOYEE};
use crate::context::PrincipalContext;

pub async fn add(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::AddProductRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(denied) = require_role(&principal, EMPLOYEE) {
        return denied;
    }
    let Json(body) = match body {
        Ok(body) => body,
        Err(e) => return errors::bad_request(e.body_text()),
    };

    match services.pvz.add_product(body.pvz_id, &body.product_type).await {
        Ok(product) => (
            StatusCode::CREATED,
            Json(dto::ProductResponse::from(product)),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_last(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(pvz_id): Path<String>,
) -> axum::response::Response {
    if let Err(denied) = require_role(&principal, EMPLOYEE) {
        return denied;
    }
    let pvz_id: PickupPointId = match pvz_id.parse() {
        Ok(id) => id,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.pvz.delete_last_product(pvz_id).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "deleted": true }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
