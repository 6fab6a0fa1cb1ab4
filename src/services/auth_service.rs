use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    audit,
    dto::auth::{AccessToken, Claims, TokenObtainRequest, TokenPair, TokenRefreshRequest, TokenType},
    error::{AppError, AppResult},
    models::UserCredentials,
    response::{ApiResponse, Meta},
    state::AppState,
};

const INVALID_CREDENTIALS: &str = "No active account found with the given credentials";

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn issue_token(
    secret: &str,
    user_id: Uuid,
    token_type: TokenType,
    ttl: Duration,
) -> AppResult<String> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        token_type,
        iat: now.timestamp() as usize,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

/// Decode and check a token, including that it is of the expected kind.
pub fn decode_token(token: &str, secret: &str, expected: TokenType) -> anyhow::Result<Claims> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    if decoded.claims.token_type != expected {
        anyhow::bail!("expected {expected:?} token, got {:?}", decoded.claims.token_type);
    }
    Ok(decoded.claims)
}

pub async fn obtain_token_pair(
    state: &AppState,
    payload: TokenObtainRequest,
) -> AppResult<ApiResponse<TokenPair>> {
    let TokenObtainRequest { username, password } = payload;
    let user = sqlx::query_as::<_, UserCredentials>(
        "SELECT id, password_hash, is_active FROM users WHERE username = $1",
    )
    .bind(username.as_str())
    .fetch_optional(&state.pool)
    .await?;

    let user = match user {
        Some(u) if u.is_active => u,
        _ => return Err(AppError::BadRequest(INVALID_CREDENTIALS.into())),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest(INVALID_CREDENTIALS.into()));
    }

    let config = &state.config;
    let pair = TokenPair {
        access: issue_token(
            &config.jwt_secret,
            user.id,
            TokenType::Access,
            Duration::minutes(config.access_token_ttl_minutes),
        )?,
        refresh: issue_token(
            &config.jwt_secret,
            user.id,
            TokenType::Refresh,
            Duration::hours(config.refresh_token_ttl_hours),
        )?,
    };

    audit::record(
        &state.pool,
        user.id,
        "token_obtain",
        "users",
        serde_json::json!({ "username": username }),
    )
    .await;

    Ok(ApiResponse::success("Token issued", pair, Some(Meta::empty())))
}

pub async fn refresh_access_token(
    state: &AppState,
    payload: TokenRefreshRequest,
) -> AppResult<ApiResponse<AccessToken>> {
    let config = &state.config;
    let claims = decode_token(&payload.refresh, &config.jwt_secret, TokenType::Refresh)
        .map_err(|_| AppError::BadRequest("Token is invalid or expired".into()))?;
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::BadRequest("Token is invalid or expired".into()))?;

    let active: Option<(bool,)> = sqlx::query_as("SELECT is_active FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await?;
    if !matches!(active, Some((true,))) {
        return Err(AppError::BadRequest(INVALID_CREDENTIALS.into()));
    }

    let access = issue_token(
        &config.jwt_secret,
        user_id,
        TokenType::Access,
        Duration::minutes(config.access_token_ttl_minutes),
    )?;

    Ok(ApiResponse::success(
        "Token refreshed",
        AccessToken { access },
        Some(Meta::empty()),
    ))
}
