use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::NaiveDateTime;
use model::entities::order::{self, PurchaseMethod};
use sea_orm::ActiveEnum;
use serde::{Deserialize, Serialize};
use store::orders::NewOrder;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use super::users::UserResponse;
use crate::schemas::{ApiError, ApiResponse, AppState, ErrorResponse, error_response};

/// Request body for recording a purchase attempt
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, max = 64))]
    pub id: Option<String>,
    /// Product the credits were bought for
    #[validate(length(min = 1, max = 64))]
    pub service: String,
    #[validate(range(min = 0))]
    pub purchase_cost_in_cents: i32,
    /// One of `crypto-ton`, `crypto-sol`, `fiat`
    pub method_of_purchase: String,
    #[validate(length(min = 1, max = 256))]
    pub crypto_transaction_hash: Option<String>,
}

/// Request body for confirming a payment
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct MarkOrderPaidRequest {
    /// Tokens bought; added to the buyer's balance
    #[validate(range(min = 0))]
    pub tokens: i32,
}

/// Request body for a failed payment
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct MarkOrderFailedRequest {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Order response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: String,
    pub user_id: String,
    pub service: String,
    pub purchase_cost_in_cents: i32,
    pub method_of_purchase: String,
    pub crypto_transaction_hash: Option<String>,
    pub tokens_amount_bought: Option<i32>,
    /// `pending`, `paid`, `failed` or `failed: <reason>`
    pub payment_status: Option<String>,
    pub paid_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<order::Model> for OrderResponse {
    fn from(model: order::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            service: model.service,
            purchase_cost_in_cents: model.purchase_cost_in_cents,
            method_of_purchase: model.method_of_purchase.to_value(),
            crypto_transaction_hash: model.crypto_transaction_hash,
            tokens_amount_bought: model.tokens_amount_bought,
            payment_status: model.payment_status,
            paid_at: model.paid_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// A paid order together with the credited buyer
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SettledOrderResponse {
    pub order: OrderResponse,
    pub user: UserResponse,
}

fn parse_method(raw: &str) -> Result<PurchaseMethod, ApiError> {
    PurchaseMethod::try_from_value(&raw.to_string()).map_err(|_| {
        warn!("Unknown purchase method: {}", raw);
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Unknown purchase method '{raw}'"),
                code: "VALIDATION_ERROR".to_string(),
                success: false,
            }),
        )
    })
}

/// Record a purchase for a user
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/orders",
    tag = "orders",
    params(
        ("user_id" = String, Path, description = "Buyer ID"),
    ),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created with payment pending", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 422, description = "Buyer does not exist", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_order(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateOrderRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>), ApiError> {
    let method_of_purchase = parse_method(&request.method_of_purchase)?;

    let created = state
        .store
        .create_order(NewOrder {
            id: request.id,
            user_id,
            service: request.service,
            purchase_cost_in_cents: request.purchase_cost_in_cents,
            method_of_purchase,
            crypto_transaction_hash: request.crypto_transaction_hash,
        })
        .await
        .map_err(error_response)?;
    info!("Order {} created for user {}", created.id, created.user_id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(created.into(), "Order created successfully")),
    ))
}

/// List a user's orders
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/orders",
    tag = "orders",
    params(
        ("user_id" = String, Path, description = "Buyer ID"),
    ),
    responses(
        (status = 200, description = "Orders retrieved successfully", body = ApiResponse<Vec<OrderResponse>>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user_orders(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<OrderResponse>>>, ApiError> {
    // An unknown user is a 404, not an empty list
    state.store.get_user(&user_id).await.map_err(error_response)?;

    let orders = state.store.list_orders(&user_id).await.map_err(error_response)?;
    debug!("User {} has {} orders", user_id, orders.len());

    let orders = orders.into_iter().map(OrderResponse::from).collect();
    Ok(Json(ApiResponse::ok(orders, "Orders retrieved successfully")))
}

/// Get a specific order by ID
#[utoipa::path(
    get,
    path = "/api/v1/orders/{order_id}",
    tag = "orders",
    params(
        ("order_id" = String, Path, description = "Order ID"),
    ),
    responses(
        (status = 200, description = "Order retrieved successfully", body = ApiResponse<OrderResponse>),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_order(
    Path(order_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let found = state.store.get_order(&order_id).await.map_err(error_response)?;
    Ok(Json(ApiResponse::ok(found.into(), "Order retrieved successfully")))
}

/// Confirm payment and credit the buyer
#[utoipa::path(
    post,
    path = "/api/v1/orders/{order_id}/paid",
    tag = "orders",
    params(
        ("order_id" = String, Path, description = "Order ID"),
    ),
    request_body = MarkOrderPaidRequest,
    responses(
        (status = 200, description = "Order paid and tokens credited", body = ApiResponse<SettledOrderResponse>),
        (status = 400, description = "Order already paid or invalid request", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn mark_order_paid(
    Path(order_id): Path<String>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<MarkOrderPaidRequest>>,
) -> Result<Json<ApiResponse<SettledOrderResponse>>, ApiError> {
    let (paid, buyer) = state
        .store
        .settle_order(&order_id, request.tokens)
        .await
        .map_err(error_response)?;
    info!("Order {} paid, user {} now holds {} tokens", paid.id, buyer.id, buyer.tokens);

    let settled = SettledOrderResponse {
        order: paid.into(),
        user: UserResponse::new(buyer, state.store.now()),
    };
    Ok(Json(ApiResponse::ok(settled, "Order paid successfully")))
}

/// Record a failed payment
#[utoipa::path(
    post,
    path = "/api/v1/orders/{order_id}/failed",
    tag = "orders",
    params(
        ("order_id" = String, Path, description = "Order ID"),
    ),
    request_body = MarkOrderFailedRequest,
    responses(
        (status = 200, description = "Order marked failed", body = ApiResponse<OrderResponse>),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn mark_order_failed(
    Path(order_id): Path<String>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<MarkOrderFailedRequest>>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let failed = state
        .store
        .mark_order_failed(&order_id, request.reason)
        .await
        .map_err(error_response)?;
    Ok(Json(ApiResponse::ok(failed.into(), "Order marked as failed")))
}
