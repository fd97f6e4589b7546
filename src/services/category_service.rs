use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    domain::catalog::slugify,
    dto::categories::{CategoryList, CreateCategoryRequest},
    entity::categories::{ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories},
    error::{AppError, AppResult, unique_violation_as},
    middleware::auth::{AuthUser, ensure_admin},
    models::Category,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items = Categories::find()
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();
    Ok(ApiResponse::success("Categories", CategoryList { items }, None))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    payload.validate()?;

    let name = payload.name.trim().to_string();
    let slug = slugify(&name);
    if slug.is_empty() {
        return Err(AppError::BadRequest(
            "category name needs at least one letter or digit".into(),
        ));
    }

    let clash = Categories::find()
        .filter(
            Condition::any()
                .add(CategoryCol::Slug.eq(slug.as_str()))
                .add(CategoryCol::Name.eq(name.as_str())),
        )
        .one(&state.orm)
        .await?;
    let duplicate = format!("category {slug} already exists");
    if clash.is_some() {
        return Err(AppError::Conflict(duplicate));
    }

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        slug: Set(slug),
        description: Set(payload.description),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|e| unique_violation_as(e, || AppError::Conflict(duplicate)))?;

    audit::record(
        &state.pool,
        user.user_id,
        "category_create",
        "categories",
        serde_json::json!({ "category_id": category.id, "slug": category.slug }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category created",
        Category::from(category),
        Some(Meta::empty()),
    ))
}
