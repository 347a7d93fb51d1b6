//! Data models for Bookshelf

pub mod book;
pub mod borrowing;
pub mod favorite;
pub mod pagination;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookInput, BookPatch, BookQuery, BookSummary};
pub use borrowing::{BorrowFilter, BorrowingRecord, BorrowingStatus, ProcedureResult};
pub use favorite::BookFavorite;
pub use pagination::{BookPage, PageWindow};
pub use user::{UserClaims, UserProfile, UserRole};
