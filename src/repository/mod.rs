//! Repository layer for database operations
//!
//! Each table sits behind a trait so services can be exercised against mocks;
//! the PostgreSQL implementations live in the submodules.

pub mod books;
pub mod borrowings;
pub mod favorites;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookInput},
        borrowing::{BorrowFilter, BorrowingRecord, ProcedureResult},
        favorite::BookFavorite,
        pagination::PageWindow,
        user::{UpdateProfile, UserProfile},
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BooksStore: Send + Sync {
    /// Books ordered newest first, restricted to `window`, with the total match count
    async fn search(&self, search: Option<String>, window: PageWindow) -> AppResult<(Vec<Book>, i64)>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Book>;
    async fn create(&self, input: &BookInput) -> AppResult<Book>;
    async fn update(&self, id: Uuid, input: &BookInput) -> AppResult<Book>;
    async fn set_cover(&self, id: Uuid, cover: Option<String>) -> AppResult<Book>;
    async fn delete(&self, id: Uuid) -> AppResult<()>;
    /// Round-trip to the store
    async fn ping(&self) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BorrowingsStore: Send + Sync {
    /// Invoke the `borrow_book` remote procedure
    async fn borrow(&self, user_id: Uuid, book_id: Uuid) -> AppResult<ProcedureResult>;
    /// Invoke the `return_book` remote procedure
    async fn return_borrowing(&self, borrowing_id: Uuid) -> AppResult<ProcedureResult>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<BorrowingRecord>;
    /// Records newest first; `user_id = None` lists every user
    async fn list(&self, user_id: Option<Uuid>, filter: BorrowFilter) -> AppResult<Vec<BorrowingRecord>>;
    async fn has_active(&self, user_id: Uuid, book_id: Uuid) -> AppResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    /// Insert the pair unless present; returns whether a row was added
    async fn add(&self, user_id: Uuid, book_id: Uuid) -> AppResult<bool>;
    /// Delete every row for the pair; returns the number removed
    async fn remove(&self, user_id: Uuid, book_id: Uuid) -> AppResult<u64>;
    async fn exists(&self, user_id: Uuid, book_id: Uuid) -> AppResult<bool>;
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<BookFavorite>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersStore: Send + Sync {
    async fn find(&self, id: Uuid) -> AppResult<Option<UserProfile>>;
    /// Insert a profile, keeping any row created concurrently for the same id
    async fn insert(&self, profile: &UserProfile) -> AppResult<UserProfile>;
    async fn update_profile(&self, id: Uuid, update: &UpdateProfile) -> AppResult<UserProfile>;
}

/// Main repository struct holding one store per table
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BooksStore>,
    pub borrowings: Arc<dyn BorrowingsStore>,
    pub favorites: Arc<dyn FavoritesStore>,
    pub users: Arc<dyn UsersStore>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            borrowings: Arc::new(borrowings::BorrowingsRepository::new(pool.clone())),
            favorites: Arc::new(favorites::FavoritesRepository::new(pool.clone())),
            users: Arc::new(users::UsersRepository::new(pool)),
        }
    }
}

/// Escape LIKE wildcards and wrap the term for a substring match
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
