use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header},
};
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::{
    dto::auth::TokenType,
    entity::Users,
    error::AppError,
    services::auth_service::decode_token,
    state::AppState,
};

/// An authenticated caller whose account is currently active.
///
/// Every way of failing (no header, bad token, unknown or inactive account)
/// rejects with the same 403 so callers cannot tell them apart.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub is_staff: bool,
}

pub fn ensure_staff(user: &AuthUser) -> Result<(), AppError> {
    if !user.is_staff {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = bearer_token(&parts.headers).ok_or(AppError::Forbidden)?;
        let claims = decode_token(token, &state.config.jwt_secret, TokenType::Access)
            .map_err(|err| {
                tracing::debug!(error = %err, "rejected bearer token");
                AppError::Forbidden
            })?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::Forbidden)?;

        let user = Users::find_by_id(user_id).one(&state.orm).await?;
        match user {
            Some(user) if user.is_active => Ok(AuthUser {
                user_id: user.id,
                username: user.username,
                is_staff: user.is_staff,
            }),
            Some(_) => {
                tracing::debug!(%user_id, "inactive account refused");
                Err(AppError::Forbidden)
            }
            None => {
                tracing::debug!(%user_id, "token subject no longer exists");
                Err(AppError::Forbidden)
            }
        }
    }
}
