use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz::{require_role, ANY_ROLE, MODERATOR};
use crate::context::PrincipalContext;

pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::CreatePickupPointRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(denied) = require_role(&principal, MODERATOR) {
        return denied;
    }
    let Json(body) = match body {
        Ok(body) => body,
        Err(e) => return errors::bad_request(e.body_text()),
    };

    match services.pvz.create_pickup_point(body.into()).await {
        Ok(point) => (
            StatusCode::CREATED,
            Json(dto::PickupPointResponse::from(point)),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(params): Query<dto::ListPickupPointsParams>,
) -> axum::response::Response {
    if let Err(denied) = require_role(&principal, ANY_ROLE) {
        return denied;
    }
    let query = match params.into_query(Utc::now()) {
        Ok(query) => query,
        Err(message) => return errors::bad_request(message),
    };

    match services.pvz.list_pickup_points(query).await {
        Ok(views) => {
            let body: Vec<dto::PickupPointViewResponse> =
                views.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_all(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(denied) = require_role(&principal, ANY_ROLE) {
        return denied;
    }

    match services.pvz.list_all_pickup_points().await {
        Ok(points) => {
            let body: Vec<dto::PickupPointResponse> = points.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}
