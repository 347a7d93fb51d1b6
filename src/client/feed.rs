//! Accumulated catalog listing with "load more" paging

use indexmap::IndexMap;
use uuid::Uuid;

use crate::models::book::Book;

use super::BookSource;

/// Books shown so far for the current search, in listing order and unique by id.
///
/// A failed load records the error and leaves the loaded books untouched.
pub struct BookFeed<S: BookSource> {
    source: S,
    per_page: i64,
    books: IndexMap<Uuid, Book>,
    page: i64,
    search: String,
    total: Option<i64>,
    has_more: bool,
    error: Option<String>,
}

impl<S: BookSource> BookFeed<S> {
    pub fn new(source: S, per_page: i64) -> Self {
        Self {
            source,
            per_page: per_page.max(1),
            books: IndexMap::new(),
            page: 1,
            search: String::new(),
            total: None,
            has_more: true,
            error: None,
        }
    }

    pub fn books(&self) -> impl Iterator<Item = &Book> {
        self.books.values()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn search_term(&self) -> &str {
        &self.search
    }

    /// Total matching rows reported by the last successful load
    pub fn total(&self) -> Option<i64> {
        self.total
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// First page of the unfiltered catalog
    pub async fn initialize(&mut self) -> bool {
        self.page = 1;
        self.search.clear();
        self.load(1, false).await
    }

    /// First page of the results for `term` (trimmed)
    pub async fn search(&mut self, term: &str) -> bool {
        self.search = term.trim().to_string();
        self.page = 1;
        self.load(1, false).await
    }

    /// Append the next page. Does nothing once the listing is exhausted.
    pub async fn load_more(&mut self) -> bool {
        if !self.has_more {
            return false;
        }
        let next = self.page + 1;
        let loaded = self.load(next, true).await;
        if loaded {
            self.page = next;
        }
        loaded
    }

    /// Reload every page shown so far, e.g. after an edit
    pub async fn refresh(&mut self) -> bool {
        self.load(self.page, false).await
    }

    async fn load(&mut self, page: i64, append: bool) -> bool {
        self.error = None;
        let search = Some(self.search.clone()).filter(|s| !s.is_empty());

        match self
            .source
            .fetch_books(search, page, self.per_page, append)
            .await
        {
            Ok(result) => {
                if !append {
                    self.books.clear();
                }
                for book in result.items {
                    // Rows shift when books are added between loads
                    self.books.entry(book.id).or_insert(book);
                }
                self.total = Some(result.total);
                self.has_more = result.has_more;
                true
            }
            Err(e) => {
                tracing::warn!("Failed to load books (page {}): {}", page, e);
                self.error = Some(e.to_string());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{Duration, Utc};

    use crate::{
        client::{ClientError, ClientResult, MockBookSource},
        models::pagination::{BookPage, PageWindow},
    };

    fn book(title: &str, author: &str, age_minutes: i64) -> Book {
        let created = Utc::now() - Duration::minutes(age_minutes);
        Book {
            id: Uuid::new_v4(),
            title: title.to_string(),
            author: author.to_string(),
            isbn: None,
            publisher: None,
            publication_year: None,
            category: None,
            description: None,
            quantity: 1,
            available_quantity: 1,
            cover_image_url: None,
            cover_url: None,
            created_at: created,
            updated_at: created,
        }
    }

    /// Catalog kept newest first, windowed like the server does
    #[derive(Clone, Default)]
    struct Catalog {
        books: Arc<Mutex<Vec<Book>>>,
    }

    impl Catalog {
        fn with(count: usize) -> Self {
            let books = (0..count)
                .map(|i| book(&format!("Book {}", i), "Anonymous", i as i64))
                .collect();
            Self {
                books: Arc::new(Mutex::new(books)),
            }
        }

        fn add_newest(&self, book: Book) {
            self.books.lock().unwrap().insert(0, book);
        }
    }

    #[async_trait]
    impl BookSource for Catalog {
        async fn fetch_books(
            &self,
            search: Option<String>,
            page: i64,
            per_page: i64,
            append: bool,
        ) -> ClientResult<BookPage> {
            let Some(window) = PageWindow::new(page, per_page, append) else {
                return Err(ClientError::Api {
                    status: 400,
                    message: "Page is out of range".to_string(),
                });
            };
            let matching: Vec<Book> = self
                .books
                .lock()
                .unwrap()
                .iter()
                .filter(|b| match &search {
                    Some(term) => {
                        let term = term.to_lowercase();
                        b.title.to_lowercase().contains(&term)
                            || b.author.to_lowercase().contains(&term)
                    }
                    None => true,
                })
                .cloned()
                .collect();

            let total = matching.len() as i64;
            let items = matching
                .into_iter()
                .skip(window.offset() as usize)
                .take(window.limit() as usize)
                .collect();

            Ok(BookPage {
                items,
                total,
                page: window.page,
                per_page: window.per_page,
                has_more: window.has_more(total),
            })
        }
    }

    #[tokio::test]
    async fn test_load_more_until_exhausted() {
        let mut feed = BookFeed::new(Catalog::with(25), 10);
        assert!(feed.initialize().await);
        assert_eq!(feed.len(), 10);
        assert!(feed.has_more());

        assert!(feed.load_more().await);
        assert!(feed.load_more().await);
        assert_eq!(feed.len(), 25);
        assert_eq!(feed.page(), 3);
        assert!(!feed.has_more());

        // Exhausted: nothing is fetched and the page stays put
        assert!(!feed.load_more().await);
        assert_eq!(feed.page(), 3);
    }

    #[tokio::test]
    async fn test_no_duplicates_when_rows_shift() {
        let catalog = Catalog::with(20);
        let mut feed = BookFeed::new(catalog.clone(), 10);
        feed.initialize().await;

        // A new book pushes the 10th row of page 1 onto page 2
        catalog.add_newest(book("Fresh arrival", "Someone", -1));
        feed.load_more().await;

        let mut ids: Vec<Uuid> = feed.books().map(|b| b.id).collect();
        let count = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), count);
        assert_eq!(count, 19);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_resets_page() {
        let catalog = Catalog::with(15);
        catalog.add_newest(book("The Dispossessed", "Ursula K. Le Guin", -1));
        catalog.add_newest(book("Earthsea", "URSULA K. LE GUIN", -2));

        let mut feed = BookFeed::new(catalog, 10);
        feed.initialize().await;
        feed.load_more().await;
        assert_eq!(feed.page(), 2);

        assert!(feed.search("  le guin ").await);
        assert_eq!(feed.search_term(), "le guin");
        assert_eq!(feed.page(), 1);
        assert_eq!(feed.len(), 2);
        assert!(!feed.has_more());
    }

    #[tokio::test]
    async fn test_refresh_reloads_all_pages_shown() {
        let catalog = Catalog::with(30);
        let mut feed = BookFeed::new(catalog.clone(), 10);
        feed.initialize().await;
        feed.load_more().await;

        catalog.add_newest(book("Fresh arrival", "Someone", -1));
        assert!(feed.refresh().await);
        assert_eq!(feed.len(), 20);
        assert_eq!(feed.books().next().map(|b| b.title.as_str()), Some("Fresh arrival"));
        assert_eq!(feed.total(), Some(31));
    }

    #[tokio::test]
    async fn test_failed_load_keeps_books_and_page() {
        let mut source = MockBookSource::new();
        let first = BookPage {
            items: vec![book("Kindred", "Octavia E. Butler", 0)],
            total: 2,
            page: 1,
            per_page: 1,
            has_more: true,
        };
        source
            .expect_fetch_books()
            .withf(|_, page, _, append| *page == 1 && !*append)
            .return_once(move |_, _, _, _| Ok(first));
        source
            .expect_fetch_books()
            .withf(|_, page, _, append| *page == 2 && *append)
            .returning(|_, _, _, _| {
                Err(ClientError::Api {
                    status: 500,
                    message: "Internal server error".to_string(),
                })
            });

        let mut feed = BookFeed::new(source, 1);
        assert!(feed.initialize().await);
        assert!(!feed.load_more().await);

        assert_eq!(feed.error(), Some("Internal server error"));
        assert_eq!(feed.len(), 1);
        assert_eq!(feed.page(), 1);
        assert!(feed.has_more());
    }
}
