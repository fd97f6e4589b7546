use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    domain::{Role, catalog::normalize_tags},
    dto::users::{SetActiveRequest, UpdateProfileRequest, UserList, UserListQuery},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{User, string_list_json},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::contains_pattern,
    state::AppState,
};

pub(crate) async fn find_user(state: &AppState, id: Uuid) -> AppResult<UserModel> {
    Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn me(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let model = find_user(state, user.user_id).await?;
    Ok(ApiResponse::success("Profile", User::from(model), None))
}

pub async fn update_me(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<User>> {
    payload.validate()?;
    let existing = find_user(state, user.user_id).await?;
    let is_vendor = existing.role == Role::Vendor;

    let touches_vendor_fields = payload.business_name.is_some()
        || payload.business_description.is_some()
        || payload.specialties.is_some();
    if touches_vendor_fields && !is_vendor {
        return Err(AppError::BadRequest(
            "only vendors have a business profile".into(),
        ));
    }

    let mut active: UserActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(business_name) = payload.business_name {
        active.business_name = Set(Some(business_name.trim().to_string()));
    }
    if let Some(description) = payload.business_description {
        active.business_description = Set(Some(description));
    }
    if let Some(specialties) = payload.specialties {
        active.vendor_specialties = Set(string_list_json(&normalize_tags(specialties)));
    }
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    if is_vendor {
        audit::record(
            &state.pool,
            user.user_id,
            "profile_update",
            "users",
            serde_json::json!({ "user_id": updated.id, "business_name": updated.business_name }),
        )
        .await;
    }

    Ok(ApiResponse::success(
        "Profile updated",
        User::from(updated),
        Some(Meta::empty()),
    ))
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: UserListQuery,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let mut condition = Condition::all();
    if let Some(role) = query.role {
        condition = condition.add(UserCol::Role.eq(role));
    }
    if let Some(active) = query.active {
        condition = condition.add(UserCol::IsActive.eq(active));
    }
    if let Some(search) = query.q.as_ref().filter(|s| !s.trim().is_empty()) {
        let pattern = contains_pattern(search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(UserCol::Email).ilike(pattern.clone()))
                .add(Expr::col(UserCol::Name).ilike(pattern.clone()))
                .add(Expr::col(UserCol::BusinessName).ilike(pattern)),
        );
    }

    let finder = Users::find()
        .filter(condition)
        .order_by_desc(UserCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(User::from)
        .collect();

    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn set_user_active(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: SetActiveRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    if id == user.user_id && !payload.active {
        return Err(AppError::BadRequest("admins cannot deactivate themselves".into()));
    }

    let existing = find_user(state, id).await?;
    let mut active: UserActive = existing.into();
    active.is_active = Set(payload.active);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    tracing::info!(user_id = %updated.id, active = updated.is_active, "user activation changed");
    audit::record(
        &state.pool,
        user.user_id,
        "user_set_active",
        "users",
        serde_json::json!({ "user_id": updated.id, "active": updated.is_active }),
    )
    .await;

    Ok(ApiResponse::success(
        "User updated",
        User::from(updated),
        Some(Meta::empty()),
    ))
}
