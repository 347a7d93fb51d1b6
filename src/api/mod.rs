//! API handlers for the Bookshelf REST endpoints

pub mod books;
pub mod borrowings;
pub mod covers;
pub mod favorites;
pub mod health;
pub mod openapi;
pub mod storage;
pub mod users;

use axum::{
    async_trait,
    extract::{FromRequestParts, Multipart},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{error::AppError, models::user::UserClaims, services::covers::CoverUpload, AppState};

/// Extractor for the authenticated identity from the provider's JWT
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|e| {
                    if e.is_missing() {
                        AppError::Authentication("Missing authorization header".to_string())
                    } else {
                        AppError::Authentication("Invalid authorization header format".to_string())
                    }
                })?;

        let claims = UserClaims::from_token(bearer.token(), &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Read the first file field of a multipart form as a cover upload
pub(crate) async fn read_cover_upload(mut multipart: Multipart) -> Result<CoverUpload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;

        return Ok(CoverUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(AppError::Validation("Please select an image file".to_string()))
}
