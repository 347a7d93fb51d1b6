//! Favorite books of a user

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::favorite::{BookFavorite, FavoriteState},
    repository::Repository,
};

use super::covers::CoverService;

#[derive(Clone)]
pub struct FavoritesService {
    repository: Repository,
    covers: CoverService,
}

impl FavoritesService {
    pub fn new(repository: Repository, covers: CoverService) -> Self {
        Self { repository, covers }
    }

    /// Mark a book as favorite; favoriting twice keeps a single row
    pub async fn favorite_book(&self, user_id: Uuid, book_id: Uuid) -> AppResult<FavoriteState> {
        // 404 for unknown books
        self.repository.books.get_by_id(book_id).await?;

        if self.repository.favorites.add(user_id, book_id).await? {
            tracing::info!("User {} favorited book {}", user_id, book_id);
        }
        Ok(FavoriteState {
            book_id,
            favorited: true,
        })
    }

    /// Remove a favorite; removing an absent favorite succeeds
    pub async fn unfavorite_book(&self, user_id: Uuid, book_id: Uuid) -> AppResult<FavoriteState> {
        let removed = self.repository.favorites.remove(user_id, book_id).await?;
        if removed > 0 {
            tracing::info!("User {} unfavorited book {}", user_id, book_id);
        }
        Ok(FavoriteState {
            book_id,
            favorited: false,
        })
    }

    /// Flip the favorite state and return the new one
    pub async fn toggle_favorite(&self, user_id: Uuid, book_id: Uuid) -> AppResult<FavoriteState> {
        if self.is_book_favorited(user_id, book_id).await? {
            self.unfavorite_book(user_id, book_id).await
        } else {
            self.favorite_book(user_id, book_id).await
        }
    }

    pub async fn is_book_favorited(&self, user_id: Uuid, book_id: Uuid) -> AppResult<bool> {
        self.repository.favorites.exists(user_id, book_id).await
    }

    /// Favorites newest first, with cover URLs resolved
    pub async fn get_user_favorites(&self, user_id: Uuid) -> AppResult<Vec<BookFavorite>> {
        let mut favorites = self.repository.favorites.list_for_user(user_id).await?;
        for summary in favorites.iter_mut().filter_map(|f| f.book.as_mut()) {
            self.covers.resolve_summary(summary);
        }
        Ok(favorites)
    }
}
