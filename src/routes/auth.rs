use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::auth::{AccessToken, TokenObtainRequest, TokenPair, TokenRefreshRequest},
    error::AppResult,
    response::ApiResponse,
    services::auth_service::{obtain_token_pair, refresh_access_token},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/token", post(obtain_token))
        .route("/token/refresh", post(refresh_token))
}

#[utoipa::path(
    post,
    path = "/api/token/",
    request_body = TokenObtainRequest,
    responses(
        (status = 200, description = "Access and refresh tokens", body = ApiResponse<TokenPair>),
        (status = 400, description = "Invalid credentials or inactive account")
    ),
    tag = "Auth"
)]
pub async fn obtain_token(
    State(state): State<AppState>,
    Json(payload): Json<TokenObtainRequest>,
) -> AppResult<Json<ApiResponse<TokenPair>>> {
    let resp = obtain_token_pair(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/token/refresh/",
    request_body = TokenRefreshRequest,
    responses(
        (status = 200, description = "Fresh access token", body = ApiResponse<AccessToken>),
        (status = 400, description = "Invalid or expired refresh token")
    ),
    tag = "Auth"
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<TokenRefreshRequest>,
) -> AppResult<Json<ApiResponse<AccessToken>>> {
    let resp = refresh_access_token(&state, payload).await?;
    Ok(Json(resp))
}
