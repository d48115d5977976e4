use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use pvz_core::DomainError;
use pvz_infra::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Storage(e) => {
            // Details stay in the logs; the service already recorded them.
            tracing::debug!(error = %e, "answering 500 for storage failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_error",
                "internal storage error",
            )
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    json_error(domain_status(&err), err.code(), err.to_string())
}

fn domain_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::NotFound | DomainError::PickupPointNotFound => StatusCode::NOT_FOUND,
        DomainError::AlreadyExists | DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::CityNotAllowed
        | DomainError::ProductTypeNotAllowed
        | DomainError::ActiveReceptionExists
        | DomainError::NoActiveReception
        | DomainError::NoProduct
        | DomainError::Validation(_) => StatusCode::BAD_REQUEST,
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn bad_request(message: impl Into<String>) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", message)
}
