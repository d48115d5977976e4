use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use pvz_core::PickupPointId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz::{require_role, EMPLOYEE};
use crate::context::PrincipalContext;

pub async fn start(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::StartReceptionRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(denied) = require_role(&principal, EMPLOYEE) {
        return denied;
    }
    let Json(body) = match body {
        Ok(body) => body,
        Err(e) => return errors::bad_request(e.body_text()),
    };

    match services.pvz.start_reception(body.pvz_id).await {
        Ok(reception) => (
            StatusCode::CREATED,
            Json(dto::ReceptionResponse::from(reception)),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn close_last(
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

    match services.pvz.close_reception(pvz_id).await {
        Ok(reception) => (
            StatusCode::OK,
            Json(dto::ReceptionResponse::from(reception)),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
