pub mod admin;
pub mod auth;
pub mod categories;
pub mod messages;
pub mod official;
pub mod orders;
pub mod products;
pub mod users;
pub mod vendors;
