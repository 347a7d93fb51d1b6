//! Bookshelf library catalog server
//!
//! A REST JSON API over a PostgreSQL catalog: members browse, search, borrow
//! and favorite books; administrators manage inventory and cover images.
//! The `client` module offers a typed client with "load more" paging.

use std::sync::Arc;

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod storage;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
