//! Typed HTTP client for the Bookshelf API
//!
//! [`ApiClient`] wraps the REST endpoints; [`feed::BookFeed`] keeps the
//! "load more" state of a catalog listing on top of any [`BookSource`].

pub mod feed;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    book::Book,
    borrowing::{BorrowingRecord, ProcedureResult},
    favorite::{BookFavorite, FavoriteState},
    pagination::BookPage,
    user::UserProfile,
};

pub use feed::BookFeed;

/// Client-side failure; the Display text is shown to the user as is
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            ClientError::Api { status, .. } => Some(*status),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Anything able to serve windows of the catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookSource: Send + Sync {
    async fn fetch_books(
        &self,
        search: Option<String>,
        page: i64,
        per_page: i64,
        append: bool,
    ) -> ClientResult<BookPage>;
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl ApiClient {
    /// `base_url` is the API root, e.g. `http://localhost:8080/api/v1`
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            client: Client::new(),
        }
    }

    /// Use a bearer token issued by the auth provider
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = self.authorized(request).send().await?;
        Ok(check(response).await?.json().await?)
    }

    pub async fn list_books(
        &self,
        search: Option<&str>,
        page: i64,
        per_page: i64,
        append: bool,
    ) -> ClientResult<BookPage> {
        let mut query = vec![
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
            ("append", append.to_string()),
        ];
        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            query.push(("search", term.to_string()));
        }

        self.send(self.client.get(self.url("/books")).query(&query)).await
    }

    pub async fn get_book(&self, id: Uuid) -> ClientResult<Book> {
        self.send(self.client.get(self.url(&format!("/books/{}", id)))).await
    }

    /// Borrow a book. A refusal by the server comes back as a failed result.
    pub async fn borrow_book(&self, book_id: Uuid) -> ClientResult<ProcedureResult> {
        let request = self.client.post(self.url(&format!("/books/{}/borrow", book_id)));
        procedure(self.send(request).await, "Borrow failed")
    }

    /// Return a borrowing. A refusal by the server comes back as a failed result.
    pub async fn return_book(&self, borrowing_id: Uuid) -> ClientResult<ProcedureResult> {
        let request = self
            .client
            .post(self.url(&format!("/borrowings/{}/return", borrowing_id)));
        procedure(self.send(request).await, "Return failed")
    }

    pub async fn toggle_favorite(&self, book_id: Uuid) -> ClientResult<FavoriteState> {
        self.send(
            self.client
                .post(self.url(&format!("/books/{}/favorite/toggle", book_id))),
        )
        .await
    }

    /// `status` is one of all, current, borrowed, returned, overdue, lost
    pub async fn my_borrowings(&self, status: Option<&str>) -> ClientResult<Vec<BorrowingRecord>> {
        let mut request = self.client.get(self.url("/me/borrowings"));
        if let Some(status) = status {
            request = request.query(&[("status", status)]);
        }
        self.send(request).await
    }

    pub async fn my_favorites(&self) -> ClientResult<Vec<BookFavorite>> {
        self.send(self.client.get(self.url("/me/favorites"))).await
    }

    pub async fn me(&self) -> ClientResult<UserProfile> {
        self.send(self.client.get(self.url("/me"))).await
    }
}

#[async_trait]
impl BookSource for ApiClient {
    async fn fetch_books(
        &self,
        search: Option<String>,
        page: i64,
        per_page: i64,
        append: bool,
    ) -> ClientResult<BookPage> {
        self.list_books(search.as_deref(), page, per_page, append).await
    }
}

/// Turn a non-2xx response into [`ClientError::Api`] with the server's message
async fn check(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Rule violations reported by the server are failed results, not errors
fn procedure(
    result: ClientResult<ProcedureResult>,
    default_error: &str,
) -> ClientResult<ProcedureResult> {
    match result {
        Err(ClientError::Api { status, message })
            if status == StatusCode::UNPROCESSABLE_ENTITY.as_u16() =>
        {
            let message = if message.is_empty() {
                default_error.to_string()
            } else {
                message
            };
            Ok(ProcedureResult::failed(message))
        }
        other => other,
    }
}
