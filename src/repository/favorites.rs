//! Book favorites repository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use super::FavoritesStore;
use crate::{
    error::AppResult,
    models::{book::BookSummary, favorite::BookFavorite},
};

#[derive(Clone)]
pub struct FavoritesRepository {
    pool: Pool<Postgres>,
}

impl FavoritesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FavoritesStore for FavoritesRepository {
    async fn add(&self, user_id: Uuid, book_id: Uuid) -> AppResult<bool> {
        // The table has no unique constraint on the pair
        let result = sqlx::query(
            r#"
            INSERT INTO book_favorites (id, user_id, book_id, favorited_at)
            SELECT $1, $2, $3, $4
            WHERE NOT EXISTS (
                SELECT 1 FROM book_favorites WHERE user_id = $2 AND book_id = $3
            )
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(book_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, user_id: Uuid, book_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM book_favorites WHERE user_id = $1 AND book_id = $2")
            .bind(user_id)
            .bind(book_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn exists(&self, user_id: Uuid, book_id: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM book_favorites WHERE user_id = $1 AND book_id = $2)",
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<BookFavorite>> {
        let rows = sqlx::query(
            r#"
            SELECT f.id, f.user_id, f.book_id, f.favorited_at,
                   b.title, b.author, b.cover_image_url, b.available_quantity
            FROM book_favorites f
            LEFT JOIN books b ON b.id = f.book_id
            WHERE f.user_id = $1
            ORDER BY f.favorited_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut favorites = Vec::with_capacity(rows.len());
        for row in rows {
            let book_id: Uuid = row.try_get("book_id")?;
            let book = match row.try_get::<Option<String>, _>("title")? {
                Some(title) => Some(BookSummary {
                    id: book_id,
                    title,
                    author: row.try_get::<Option<String>, _>("author")?.unwrap_or_default(),
                    cover_image_url: row.try_get("cover_image_url")?,
                    cover_url: None,
                    available_quantity: row
                        .try_get::<Option<i32>, _>("available_quantity")?
                        .unwrap_or(0),
                }),
                None => None,
            };

            favorites.push(BookFavorite {
                id: row.try_get("id")?,
                user_id: row.try_get("user_id")?,
                book_id,
                favorited_at: row.try_get("favorited_at")?,
                book,
            });
        }

        Ok(favorites)
    }
}
