//! Cover image upload endpoints (multipart/form-data, field `file`)

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{error::AppResult, models::book::Book, services::covers::StoredCover};

use super::{read_cover_upload, AuthenticatedUser};

/// Multipart form carrying the image
#[derive(ToSchema)]
pub struct CoverForm {
    /// PNG, JPEG, GIF or WebP image
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Upload a cover image without attaching it to a book
#[utoipa::path(
    post,
    path = "/covers",
    tag = "covers",
    security(("bearer_auth" = [])),
    request_body(content = CoverForm, content_type = "multipart/form-data", description = "Image file"),
    responses(
        (status = 201, description = "Cover stored", body = StoredCover),
        (status = 400, description = "Not an accepted image or too large")
    )
)]
pub async fn upload_cover(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<StoredCover>)> {
    state.services.users.require_admin(&claims).await?;

    let upload = read_cover_upload(multipart).await?;
    let stored = state.services.covers.upload_cover(upload).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Replace the cover of a book
#[utoipa::path(
    put,
    path = "/books/{id}/cover",
    tag = "covers",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    request_body(content = CoverForm, content_type = "multipart/form-data", description = "Image file"),
    responses(
        (status = 200, description = "Cover updated", body = Book),
        (status = 400, description = "Not an accepted image or too large"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn set_book_cover(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<Json<Book>> {
    state.services.users.require_admin(&claims).await?;

    let upload = read_cover_upload(multipart).await?;
    let book = state.services.catalog.set_book_cover(id, upload).await?;
    Ok(Json(book))
}

/// Remove the cover of a book
#[utoipa::path(
    delete,
    path = "/books/{id}/cover",
    tag = "covers",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Cover removed", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn clear_book_cover(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Book>> {
    state.services.users.require_admin(&claims).await?;

    let book = state.services.catalog.clear_book_cover(id).await?;
    Ok(Json(book))
}
