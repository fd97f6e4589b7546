use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    domain::{Role, catalog::normalize_tags},
    dto::auth::{LoginRequest, LoginResponse, RegisterRequest},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    error::{AppError, AppResult, unique_violation_as},
    middleware::auth::issue_token,
    models::{User, string_list_json},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    payload.validate()?;
    let RegisterRequest {
        email,
        password,
        name,
        role,
        business_name,
        business_description,
        specialties,
    } = payload;

    if !role.is_self_service() {
        return Err(AppError::BadRequest(format!("cannot register as {role}")));
    }
    let business_name = business_name.map(|n| n.trim().to_string());
    if role == Role::Vendor && business_name.as_deref().is_none_or(str::is_empty) {
        return Err(AppError::BadRequest(
            "vendors must provide a business name".into(),
        ));
    }

    let email = email.trim().to_lowercase();
    let exist = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let password_hash = hash_password(&password)?;
    let is_vendor = role == Role::Vendor;
    let specialties = normalize_tags(specialties.unwrap_or_default());

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        password_hash: Set(password_hash),
        name: Set(name.trim().to_string()),
        role: Set(role),
        is_active: Set(true),
        business_name: Set(business_name.filter(|_| is_vendor)),
        business_description: Set(business_description.filter(|_| is_vendor)),
        vendor_approved: Set(false),
        vendor_specialties: Set(string_list_json(&specialties)),
        vendor_rating: Set(None),
        approved_at: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|e| {
        unique_violation_as(e, || AppError::BadRequest("Email is already taken".into()))
    })?;

    tracing::info!(user_id = %user.id, role = %user.role, "user registered");
    audit::record(
        &state.pool,
        user.id,
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id, "role": user.role }),
    )
    .await;

    let message = if is_vendor {
        "Vendor registered, awaiting approval"
    } else {
        "User created"
    };
    Ok(ApiResponse::success(message, User::from(user), None))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    payload.validate()?;
    let LoginRequest { email, password } = payload;
    let email = email.trim().to_lowercase();

    let user = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    let user = match user {
        Some(u) => u,
        None => return Err(AppError::BadRequest("Invalid email or password".into())),
    };

    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }
    if !user.is_active {
        return Err(AppError::Forbidden);
    }

    let token = issue_token(user.id, user.role, &state.config.jwt_secret)?;

    audit::record(
        &state.pool,
        user.id,
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id, "at": Utc::now() }),
    )
    .await;

    let resp = LoginResponse {
        token: format!("Bearer {}", token),
        user: User::from(user),
    };
    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_internal_error() {
        assert!(matches!(
            verify_password("x", "not-a-phc-string"),
            Err(AppError::Internal(_))
        ));
    }
}
