//! Books repository for database operations

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::{like_pattern, BooksStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookInput},
        pagination::PageWindow,
    },
};

const BOOK_COLUMNS: &str = r#"
    id, title, author, isbn, publisher, publication_year, category, description,
    quantity, available_quantity, cover_image_url, created_at, updated_at
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BooksStore for BooksRepository {
    async fn search(&self, search: Option<String>, window: PageWindow) -> AppResult<(Vec<Book>, i64)> {
        let pattern = search.as_deref().map(like_pattern);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM books
            WHERE ($1::text IS NULL OR title ILIKE $1 OR author ILIKE $1)
            "#,
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let query = format!(
            r#"
            SELECT {}
            FROM books
            WHERE ($1::text IS NULL OR title ILIKE $1 OR author ILIKE $1)
            ORDER BY created_at DESC, id
            LIMIT $2 OFFSET $3
            "#,
            BOOK_COLUMNS
        );

        let books = sqlx::query_as::<_, Book>(&query)
            .bind(&pattern)
            .bind(window.limit())
            .bind(window.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((books, total))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Book> {
        let query = format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS);
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    async fn create(&self, input: &BookInput) -> AppResult<Book> {
        let now = Utc::now();
        let query = format!(
            r#"
            INSERT INTO books (
                id, title, author, isbn, publisher, publication_year, category, description,
                quantity, available_quantity, cover_image_url, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );

        let book = sqlx::query_as::<_, Book>(&query)
            .bind(Uuid::new_v4())
            .bind(&input.title)
            .bind(&input.author)
            .bind(&input.isbn)
            .bind(&input.publisher)
            .bind(input.publication_year)
            .bind(&input.category)
            .bind(&input.description)
            .bind(input.quantity)
            .bind(input.available_quantity)
            .bind(&input.cover_image_url)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(book)
    }

    async fn update(&self, id: Uuid, input: &BookInput) -> AppResult<Book> {
        let query = format!(
            r#"
            UPDATE books SET
                title = $2,
                author = $3,
                isbn = $4,
                publisher = $5,
                publication_year = $6,
                category = $7,
                description = $8,
                quantity = $9,
                available_quantity = $10,
                cover_image_url = $11,
                updated_at = $12
            WHERE id = $1
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );

        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.author)
            .bind(&input.isbn)
            .bind(&input.publisher)
            .bind(input.publication_year)
            .bind(&input.category)
            .bind(&input.description)
            .bind(input.quantity)
            .bind(input.available_quantity)
            .bind(&input.cover_image_url)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    async fn set_cover(&self, id: Uuid, cover: Option<String>) -> AppResult<Book> {
        let query = format!(
            "UPDATE books SET cover_image_url = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            BOOK_COLUMNS
        );

        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .bind(cover)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
