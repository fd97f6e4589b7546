use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::{
    domain::Role,
    dto::auth::Claims,
    entity::Users,
    error::{AppError, AppResult},
    state::AppState,
};

pub const TOKEN_TTL_HOURS: i64 = 24;

/// The caller behind a valid bearer token, re-checked against the users table
/// so deactivated accounts lose access immediately.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Present when the request carries a token; public endpoints use it to widen
/// what admins and owners can see.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

pub fn ensure_role(user: &AuthUser, role: Role) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_any_role(user: &AuthUser, roles: &[Role]) -> Result<(), AppError> {
    if !roles.contains(&user.role) {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, Role::Admin)
}

pub fn issue_token(user_id: Uuid, role: Role, secret: &str) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        role,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn decode_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}

fn bearer_token(parts: &Parts) -> Option<Result<&str, AppError>> {
    let header = parts.headers.get(header::AUTHORIZATION)?;
    let result = header
        .to_str()
        .map_err(|_| AppError::Unauthorized)
        .and_then(|value| {
            value
                .strip_prefix("Bearer ")
                .map(str::trim)
                .ok_or(AppError::Unauthorized)
        });
    Some(result)
}

async fn authenticate(token: &str, state: &AppState) -> AppResult<AuthUser> {
    let claims = decode_token(token, &state.config.jwt_secret)?;
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthorized)?;

    let user = Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .filter(|u| u.is_active)
        .ok_or(AppError::Unauthorized)?;

    Ok(AuthUser {
        user_id: user.id,
        role: user.role,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)??;
        authenticate(token, state).await
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts) {
            None => Ok(MaybeAuthUser(None)),
            Some(token) => Ok(MaybeAuthUser(Some(authenticate(token?, state).await?))),
        }
    }
}
