//! Business logic services

pub mod borrowings;
pub mod catalog;
pub mod covers;
pub mod favorites;
pub mod users;

use std::sync::Arc;

use crate::{config::AppConfig, repository::Repository, storage::ObjectStorage};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub covers: covers::CoverService,
    pub borrowings: borrowings::BorrowingsService,
    pub favorites: favorites::FavoritesService,
    pub users: users::UsersService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository and object storage
    pub fn new(repository: Repository, storage: Arc<dyn ObjectStorage>, config: &AppConfig) -> Self {
        let covers = covers::CoverService::new(storage, &config.storage);
        Self {
            catalog: catalog::CatalogService::new(repository.clone(), covers.clone(), &config.catalog),
            borrowings: borrowings::BorrowingsService::new(repository.clone(), covers.clone()),
            favorites: favorites::FavoritesService::new(repository.clone(), covers.clone()),
            users: users::UsersService::new(
                repository.clone(),
                config.catalog.default_max_borrow_limit,
            ),
            covers,
            repository,
        }
    }

    /// Check that the relational store answers
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        self.repository.books.ping().await
    }
}
