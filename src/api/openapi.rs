//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, borrowings, covers, favorites, health, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bookshelf API",
        version = "1.0.0",
        description = "Library catalog REST API: browse, borrow and favorite books",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Covers
        covers::upload_cover,
        covers::set_book_cover,
        covers::clear_book_cover,
        // Borrowings
        borrowings::borrow_book,
        borrowings::return_book,
        borrowings::has_borrowed,
        borrowings::my_borrowings,
        borrowings::list_borrowings,
        // Favorites
        favorites::is_favorited,
        favorites::favorite_book,
        favorites::unfavorite_book,
        favorites::toggle_favorite,
        favorites::my_favorites,
        // Users
        users::me,
        users::update_my_profile,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::BookInput,
            crate::models::book::BookPatch,
            crate::models::pagination::BookPage,
            crate::services::covers::StoredCover,
            covers::CoverForm,
            // Borrowings
            crate::models::borrowing::BorrowingRecord,
            crate::models::borrowing::BorrowingStatus,
            crate::models::borrowing::ProcedureResult,
            borrowings::BorrowedResponse,
            // Favorites
            crate::models::favorite::BookFavorite,
            crate::models::favorite::FavoriteState,
            // Users
            crate::models::user::UserProfile,
            crate::models::user::UserRole,
            crate::models::user::UpdateProfile,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Catalog management"),
        (name = "covers", description = "Cover image uploads"),
        (name = "borrowings", description = "Borrowing and returning books"),
        (name = "favorites", description = "Favorite books"),
        (name = "users", description = "Own profile")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
