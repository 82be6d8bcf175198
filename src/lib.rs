//! Lectern Library Catalog Server
//!
//! A Rust implementation of the Lectern library catalog, providing a REST
//! JSON API for browsing books, authors and genres, and for managing
//! physical copies and their borrowing state.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
