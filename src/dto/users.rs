use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{domain::Role, models::User};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 2, max = 120))]
    pub business_name: Option<String>,
    #[validate(length(max = 2000))]
    pub business_description: Option<String>,
    #[validate(length(max = 10))]
    pub specialties: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserListQuery {
    pub role: Option<Role>,
    pub q: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetActiveRequest {
    pub active: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub items: Vec<User>,
}
