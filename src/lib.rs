pub mod api; // JSON API (axum server behind the api-server feature)
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

pub use error::{Result, SuggestionError};
pub use services::FoodSuggestionEngine;
