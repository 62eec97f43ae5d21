use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{
    health::health_check,
    orders::{create_order, get_order, get_user_orders, mark_order_failed, mark_order_paid},
    users::{create_user, delete_user, get_user, get_users},
};
use crate::schemas::{ApiDoc, AppState};

/// Create application router with all routes and middleware
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Users
        .route("/api/v1/users", post(create_user).get(get_users))
        .route("/api/v1/users/:user_id", get(get_user).delete(delete_user))
        // Orders
        .route(
            "/api/v1/users/:user_id/orders",
            post(create_order).get(get_user_orders),
        )
        .route("/api/v1/orders/:order_id", get(get_order))
        .route("/api/v1/orders/:order_id/paid", post(mark_order_paid))
        .route("/api/v1/orders/:order_id/failed", post(mark_order_failed))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
