//! Book favorite (user bookmark) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::book::BookSummary;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookFavorite {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub favorited_at: DateTime<Utc>,
    pub book: Option<BookSummary>,
}

/// Favorite state of one book for the current user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct FavoriteState {
    pub book_id: Uuid,
    pub favorited: bool,
}
