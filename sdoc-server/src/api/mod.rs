//! HTTP API handlers

pub mod health;
pub mod projects;

pub use health::health_routes;
pub use projects::{create_project, delete_project, get_project, list_projects};
