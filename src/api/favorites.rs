//! Favorite endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::favorite::{BookFavorite, FavoriteState},
};

use super::AuthenticatedUser;

/// Favorite state of a book for the caller
#[utoipa::path(
    get,
    path = "/books/{id}/favorite",
    tag = "favorites",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Favorite state", body = FavoriteState)
    )
)]
pub async fn is_favorited(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<Uuid>,
) -> AppResult<Json<FavoriteState>> {
    let favorited = state
        .services
        .favorites
        .is_book_favorited(claims.sub, book_id)
        .await?;

    Ok(Json(FavoriteState { book_id, favorited }))
}

/// Add a book to the caller's favorites
#[utoipa::path(
    post,
    path = "/books/{id}/favorite",
    tag = "favorites",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book is a favorite", body = FavoriteState),
        (status = 404, description = "Book not found")
    )
)]
pub async fn favorite_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<Uuid>,
) -> AppResult<Json<FavoriteState>> {
    let profile = state.services.users.ensure_profile(&claims).await?;

    let favorite = state.services.favorites.favorite_book(profile.id, book_id).await?;
    Ok(Json(favorite))
}

/// Remove a book from the caller's favorites
#[utoipa::path(
    delete,
    path = "/books/{id}/favorite",
    tag = "favorites",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book is not a favorite", body = FavoriteState)
    )
)]
pub async fn unfavorite_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<Uuid>,
) -> AppResult<Json<FavoriteState>> {
    let favorite = state
        .services
        .favorites
        .unfavorite_book(claims.sub, book_id)
        .await?;

    Ok(Json(favorite))
}

/// Flip the favorite state of a book
#[utoipa::path(
    post,
    path = "/books/{id}/favorite/toggle",
    tag = "favorites",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "New favorite state", body = FavoriteState),
        (status = 404, description = "Book not found")
    )
)]
pub async fn toggle_favorite(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<Uuid>,
) -> AppResult<Json<FavoriteState>> {
    let profile = state.services.users.ensure_profile(&claims).await?;

    let favorite = state.services.favorites.toggle_favorite(profile.id, book_id).await?;
    Ok(Json(favorite))
}

/// Favorites of the caller
#[utoipa::path(
    get,
    path = "/me/favorites",
    tag = "favorites",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Favorites, newest first", body = Vec<BookFavorite>)
    )
)]
pub async fn my_favorites(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BookFavorite>>> {
    let favorites = state.services.favorites.get_user_favorites(claims.sub).await?;
    Ok(Json(favorites))
}
