use axum::{http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use store::{Store, StoreError};
use tracing::{error, warn};
use utoipa::{OpenApi, ToSchema};

use crate::handlers::orders::{
    CreateOrderRequest, MarkOrderFailedRequest, MarkOrderPaidRequest, OrderResponse,
    SettledOrderResponse,
};
use crate::handlers::users::{CreateUserRequest, UserResponse};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    pub store: Store,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: &str) -> Self {
        Self {
            data,
            message: message.to_string(),
            success: true,
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

pub fn status_for(err: &StoreError) -> StatusCode {
    match err {
        StoreError::Duplicate(_) => StatusCode::CONFLICT,
        StoreError::ReferentialIntegrity(_) => StatusCode::UNPROCESSABLE_ENTITY,
        StoreError::NotNull(_) | StoreError::Validation(_) => StatusCode::BAD_REQUEST,
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
        StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Turns a store failure into the JSON error body handlers return.
///
/// Engine details of 5xx failures are logged, not sent.
pub fn error_response(err: StoreError) -> ApiError {
    let status = status_for(&err);
    let message = if status.is_server_error() {
        error!("Store failure: {}", err);
        if matches!(err, StoreError::Connection(_)) {
            "Database unavailable".to_string()
        } else {
            "Internal server error".to_string()
        }
    } else {
        warn!("Request rejected: {}", err);
        err.to_string()
    };

    (
        status,
        Json(ErrorResponse {
            error: message,
            code: err.code().to_string(),
            success: false,
        }),
    )
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::users::create_user,
        crate::handlers::users::get_users,
        crate::handlers::users::get_user,
        crate::handlers::users::delete_user,
        crate::handlers::orders::create_order,
        crate::handlers::orders::get_user_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::mark_order_paid,
        crate::handlers::orders::mark_order_failed,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            CreateUserRequest,
            UserResponse,
            CreateOrderRequest,
            MarkOrderPaidRequest,
            MarkOrderFailedRequest,
            OrderResponse,
            SettledOrderResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User management endpoints"),
        (name = "orders", description = "Credit purchase endpoints"),
    ),
    info(
        title = "mediacredits API",
        description = "Users, orders and token balances of the media generation service",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;
