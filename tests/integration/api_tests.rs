//! API integration tests
//!
//! Run against a live server with: cargo test -- --ignored
//! Tokens are minted with JWT_SECRET; admin tests need ADMIN_USER_ID to name
//! a user whose profile has the admin role.

use bookshelf_server::{
    client::{ApiClient, BookFeed},
    models::user::UserClaims,
};
use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn token_for(user_id: Uuid) -> String {
    let secret =
        std::env::var("JWT_SECRET").unwrap_or_else(|_| "change-this-secret-in-production".to_string());
    UserClaims {
        sub: user_id,
        email: Some(format!("{}@example.org", user_id.simple())),
        name: Some("Integration Reader".to_string()),
        exp: (Utc::now() + Duration::hours(1)).timestamp(),
        iat: Some(Utc::now().timestamp()),
    }
    .create_token(&secret)
    .expect("Failed to create token")
}

fn admin_token() -> Option<String> {
    let id = std::env::var("ADMIN_USER_ID").ok()?;
    Some(token_for(id.parse().expect("ADMIN_USER_ID must be a UUID")))
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_ready_check() {
    let response = Client::new()
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let response = Client::new()
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_me_creates_default_profile() {
    let user_id = Uuid::new_v4();
    let response = Client::new()
        .get(format!("{}/me", BASE_URL))
        .bearer_auth(token_for(user_id))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["id"], user_id.to_string());
    assert_eq!(body["role"], "user");
    assert_eq!(body["full_name"], "Integration Reader");
}

#[tokio::test]
#[ignore]
async fn test_list_books() {
    let response = Client::new()
        .get(format!("{}/books?page=1&per_page=5", BASE_URL))
        .bearer_auth(token_for(Uuid::new_v4()))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());
    assert!(body["total"].is_number());
    assert!(body["has_more"].is_boolean());
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_create_book() {
    let response = Client::new()
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(token_for(Uuid::new_v4()))
        .json(&json!({
            "title": "Not allowed",
            "author": "Nobody",
            "quantity": 1,
            "available_quantity": 1
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_create_book_rejects_excess_availability() {
    let Some(token) = admin_token() else {
        return;
    };

    let response = Client::new()
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "title": "Too many",
            "author": "Somebody",
            "quantity": 1,
            "available_quantity": 2
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_book_lifecycle_with_borrow_and_favorite() {
    let Some(admin) = admin_token() else {
        return;
    };
    let client = Client::new();

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&admin)
        .json(&json!({
            "title": "Integration Test Book",
            "author": "Test Author",
            "isbn": "9780000000002",
            "quantity": 1,
            "available_quantity": 1
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let book: Value = response.json().await.expect("Failed to parse response");
    let book_id: Uuid = book["id"].as_str().and_then(|s| s.parse().ok()).expect("Book id");

    let reader = ApiClient::new(BASE_URL).with_token(token_for(Uuid::new_v4()));

    // Favorite toggle flips twice back to the initial state
    assert!(reader.toggle_favorite(book_id).await.expect("toggle").favorited);
    assert!(!reader.toggle_favorite(book_id).await.expect("toggle").favorited);

    // Borrow the only copy, then a second borrow is refused
    let borrowed = reader.borrow_book(book_id).await.expect("borrow");
    assert!(borrowed.success, "{:?}", borrowed.error);
    let other = ApiClient::new(BASE_URL).with_token(token_for(Uuid::new_v4()));
    let refused = other.borrow_book(book_id).await.expect("borrow");
    assert!(!refused.success);

    let records = reader.my_borrowings(Some("current")).await.expect("borrowings");
    let record = records
        .iter()
        .find(|r| r.book_id == book_id)
        .expect("Borrowing record");
    let returned = reader.return_book(record.id).await.expect("return");
    assert!(returned.success, "{:?}", returned.error);

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_feed_pages_without_duplicates() {
    let client = ApiClient::new(BASE_URL).with_token(token_for(Uuid::new_v4()));
    let mut feed = BookFeed::new(client, 5);

    assert!(feed.initialize().await, "{:?}", feed.error());
    while feed.has_more() {
        assert!(feed.load_more().await, "{:?}", feed.error());
    }

    let mut ids: Vec<Uuid> = feed.books().map(|b| b.id).collect();
    let count = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), count);
    assert_eq!(feed.total(), Some(count as i64));
}

#[tokio::test]
#[ignore]
async fn test_swagger_ui() {
    let response = Client::new()
        .get("http://localhost:8080/swagger-ui/")
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}
