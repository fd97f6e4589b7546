use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod categories;
pub mod doc;
pub mod health;
pub mod messages;
pub mod official;
pub mod orders;
pub mod params;
pub mod products;
pub mod users;
pub mod vendor;
pub mod vendors;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/vendors", vendors::router())
        .nest("/vendor", vendor::router())
        .nest("/categories", categories::router())
        .nest("/products", products::router())
        .nest("/orders", orders::router())
        .nest("/messages", messages::router())
        .nest("/admin", admin::router().nest("/official", official::router()))
}
