use axum::{
    routing::{get, post},
    Router,
};

pub mod auth;
pub mod pickup_points;
pub mod products;
pub mod receptions;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/pvz", post(pickup_points::create).get(pickup_points::list))
        .route("/pvz/all", get(pickup_points::list_all))
        .route(
            "/pvz/:pvz_id/close_last_reception",
            post(receptions::close_last),
        )
        .route(
            "/pvz/:pvz_id/delete_last_product",
            post(products::delete_last),
        )
        .route("/receptions", post(receptions::start))
        .route("/products", post(products::add))
}

/// Router for endpoints reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/dummyLogin", post(auth::dummy_login))
}
