//! Object serving for stored cover images

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    storage::content_type_for,
};

#[derive(Debug, Deserialize)]
pub struct SignedQuery {
    pub expires: i64,
    pub token: String,
}

async fn serve(state: &crate::AppState, bucket: &str, path: &str) -> AppResult<impl IntoResponse> {
    let covers = &state.services.covers;
    if bucket != covers.signer().bucket() {
        return Err(AppError::NotFound(format!("Bucket {} not found", bucket)));
    }

    let bytes = covers.storage().download(path).await?;
    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(path)),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        bytes,
    ))
}

/// Serve a public object
pub async fn public_object(
    State(state): State<crate::AppState>,
    Path((bucket, path)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    serve(&state, &bucket, &path).await
}

/// Serve an object through a time-limited signed URL
pub async fn signed_object(
    State(state): State<crate::AppState>,
    Path((bucket, path)): Path<(String, String)>,
    Query(query): Query<SignedQuery>,
) -> AppResult<impl IntoResponse> {
    let valid = state
        .services
        .covers
        .signer()
        .verify(&path, query.expires, &query.token, Utc::now().timestamp());
    if !valid {
        return Err(AppError::Authorization("Invalid or expired signature".to_string()));
    }

    serve(&state, &bucket, &path).await
}
