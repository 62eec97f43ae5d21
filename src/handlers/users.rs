use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::NaiveDateTime;
use model::entities::user;
use serde::{Deserialize, Serialize};
use store::users::NewUser;
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

use crate::schemas::{ApiError, ApiResponse, AppState, error_response};

/// Request body for creating a new user
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateUserRequest {
    /// Caller-chosen id; a UUID is generated when absent
    #[validate(length(min = 1, max = 64))]
    pub id: Option<String>,
    /// Email address (must be unique)
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[validate(length(min = 1, max = 64))]
    pub username: Option<String>,
    /// Starting token balance
    #[serde(default)]
    #[validate(range(min = 0))]
    pub tokens: i32,
    pub unlimited_tokens_end_date: Option<NaiveDateTime>,
}

/// User response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub email_verified: bool,
    pub username: Option<String>,
    pub tokens: i32,
    pub unlimited_tokens_end_date: Option<NaiveDateTime>,
    /// Whether an unlimited plan is active right now
    pub unlimited: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl UserResponse {
    pub fn new(model: user::Model, now: NaiveDateTime) -> Self {
        Self {
            unlimited: model.has_unlimited_tokens(now),
            id: model.id,
            email: model.email,
            email_verified: model.email_verified,
            username: model.username,
            tokens: model.tokens,
            unlimited_tokens_end_date: model.unlimited_tokens_end_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Email or id already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_user(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateUserRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    trace!("Entering create_user function");
    debug!("Creating user with email: {}", request.email);

    let new_user = NewUser {
        id: request.id,
        email: request.email,
        email_verified: request.email_verified,
        username: request.username,
        tokens: request.tokens,
        unlimited_tokens_end_date: request.unlimited_tokens_end_date,
    };

    let created = state.store.create_user(new_user).await.map_err(error_response)?;
    info!("User created successfully with ID: {}", created.id);

    let response = ApiResponse::ok(
        UserResponse::new(created, state.store.now()),
        "User created successfully",
    );
    Ok((StatusCode::CREATED, Json(response)))
}

/// Get all users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Vec<UserResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, ApiError> {
    let users = state.store.list_users().await.map_err(error_response)?;
    debug!("Retrieved {} users from database", users.len());

    let now = state.store.now();
    let users = users.into_iter().map(|u| UserResponse::new(u, now)).collect();
    Ok(Json(ApiResponse::ok(users, "Users retrieved successfully")))
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = String, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let found = state.store.get_user(&user_id).await.map_err(error_response)?;
    Ok(Json(ApiResponse::ok(
        UserResponse::new(found, state.store.now()),
        "User retrieved successfully",
    )))
}

/// Delete a user
///
/// Generations and orders go with the user. Users that still own generation
/// inputs, sessions or linked accounts are not deleted.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = String, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 422, description = "User still owns inputs, sessions or accounts", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_user(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    state.store.delete_user(&user_id).await.map_err(error_response)?;
    info!("User with ID {} deleted successfully", user_id);

    Ok(Json(ApiResponse::ok(
        format!("User {user_id} deleted"),
        "User deleted successfully",
    )))
}
