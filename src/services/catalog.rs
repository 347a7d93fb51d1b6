//! Catalog management service

use uuid::Uuid;

use crate::{
    config::CatalogConfig,
    error::{AppError, AppResult},
    models::{
        book::{Book, BookInput, BookPatch, BookQuery},
        pagination::{BookPage, PageWindow},
    },
    repository::Repository,
};

use super::covers::{CoverService, CoverUpload};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    covers: CoverService,
    page_size: i64,
    max_page_size: i64,
    max_window_rows: i64,
}

impl CatalogService {
    pub fn new(repository: Repository, covers: CoverService, config: &CatalogConfig) -> Self {
        Self {
            repository,
            covers,
            page_size: config.page_size,
            max_page_size: config.max_page_size.max(1),
            max_window_rows: config.max_window_rows.max(1),
        }
    }

    /// List books newest first, optionally filtered on title or author
    pub async fn list_books(&self, query: &BookQuery) -> AppResult<BookPage> {
        let per_page = query
            .per_page
            .unwrap_or(self.page_size)
            .min(self.max_page_size);
        let window = PageWindow::new(query.page.unwrap_or(1), per_page, query.append.unwrap_or(false))
            .ok_or_else(|| AppError::Validation("Page is out of range".to_string()))?;
        if window.limit() > self.max_window_rows {
            return Err(AppError::Validation(format!(
                "At most {} books can be listed at once; request further pages in append mode",
                self.max_window_rows
            )));
        }
        let search = query.search_term().map(str::to_string);

        let (books, total) = self.repository.books.search(search, window).await?;

        Ok(BookPage {
            items: books.into_iter().map(|b| self.covers.resolve_book(b)).collect(),
            total,
            page: window.page,
            per_page: window.per_page,
            has_more: window.has_more(total),
        })
    }

    /// Get a book by ID
    pub async fn get_book(&self, id: Uuid) -> AppResult<Book> {
        let book = self.repository.books.get_by_id(id).await?;
        Ok(self.covers.resolve_book(book))
    }

    /// Validate and create a new book
    pub async fn add_book(&self, input: BookInput) -> AppResult<Book> {
        let input = input.prepare()?;
        let book = self.repository.books.create(&input).await?;
        tracing::info!("Created book {} ({})", book.id, book.title);
        Ok(self.covers.resolve_book(book))
    }

    /// Apply a partial update; the merged book must still be valid
    pub async fn update_book(&self, id: Uuid, patch: BookPatch) -> AppResult<Book> {
        let current = self.repository.books.get_by_id(id).await?;
        let input = patch.apply_to(&current).prepare()?;
        let book = self.repository.books.update(id, &input).await?;
        tracing::info!("Updated book {}", id);
        Ok(self.covers.resolve_book(book))
    }

    /// Delete a book, then drop its stored cover
    pub async fn delete_book(&self, id: Uuid) -> AppResult<()> {
        let book = self.repository.books.get_by_id(id).await?;
        self.repository.books.delete(id).await?;
        tracing::info!("Deleted book {}", id);

        self.covers.discard(book.cover_image_url.as_deref()).await;
        Ok(())
    }

    /// Upload a new cover and attach it to the book.
    /// The upload is removed again if the book cannot be updated.
    pub async fn set_book_cover(&self, id: Uuid, upload: CoverUpload) -> AppResult<Book> {
        let current = self.repository.books.get_by_id(id).await?;
        let stored = self.covers.upload_cover(upload).await?;

        let book = match self
            .repository
            .books
            .set_cover(id, Some(stored.path.clone()))
            .await
        {
            Ok(book) => book,
            Err(e) => {
                tracing::warn!("Rolling back cover upload {} for book {}: {}", stored.path, id, e);
                self.covers.discard(Some(&stored.path)).await;
                return Err(e);
            }
        };

        if current.cover_image_url.as_deref() != Some(stored.path.as_str()) {
            self.covers.discard(current.cover_image_url.as_deref()).await;
        }

        Ok(self.covers.resolve_book(book))
    }

    /// Detach the cover from the book and drop the stored object
    pub async fn clear_book_cover(&self, id: Uuid) -> AppResult<Book> {
        let current = self.repository.books.get_by_id(id).await?;
        let book = self.repository.books.set_cover(id, None).await?;
        self.covers.discard(current.cover_image_url.as_deref()).await;
        Ok(self.covers.resolve_book(book))
    }
}
