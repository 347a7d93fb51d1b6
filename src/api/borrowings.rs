//! Borrowing endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, ErrorResponse},
    models::borrowing::{BorrowingQuery, BorrowingRecord, ProcedureResult},
};

use super::AuthenticatedUser;

#[derive(Serialize, ToSchema)]
pub struct BorrowedResponse {
    pub book_id: Uuid,
    /// The caller currently holds a copy
    pub borrowed: bool,
}

/// A procedure that reports `success = false` is a rule violation for HTTP callers
fn procedure_response(result: ProcedureResult) -> AppResult<Json<ProcedureResult>> {
    if result.success {
        Ok(Json(result))
    } else {
        Err(AppError::BusinessRule(result.error.unwrap_or_default()))
    }
}

/// Borrow a copy of a book
#[utoipa::path(
    post,
    path = "/books/{id}/borrow",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book borrowed", body = ProcedureResult),
        (status = 422, description = "Borrow refused (no copies, limit reached...)")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<Uuid>,
) -> AppResult<Json<ProcedureResult>> {
    // Borrowing records reference the profile row
    let profile = state.services.users.ensure_profile(&claims).await?;

    let result = state.services.borrowings.borrow_book(profile.id, book_id).await?;
    procedure_response(result)
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/borrowings/{id}/return",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Borrowing record ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = ProcedureResult),
        (status = 403, description = "Not your borrowing"),
        (status = 422, description = "Return refused")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(borrowing_id): Path<Uuid>,
) -> AppResult<Json<ProcedureResult>> {
    let profile = state.services.users.ensure_profile(&claims).await?;

    let result = state.services.borrowings.return_book(&profile, borrowing_id).await?;
    procedure_response(result)
}

/// Whether the caller currently holds a copy of a book
#[utoipa::path(
    get,
    path = "/books/{id}/borrowed",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Borrowed state", body = BorrowedResponse)
    )
)]
pub async fn has_borrowed(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<Uuid>,
) -> AppResult<Json<BorrowedResponse>> {
    let borrowed = state
        .services
        .borrowings
        .has_user_borrowed_book(claims.sub, book_id)
        .await?;

    Ok(Json(BorrowedResponse { book_id, borrowed }))
}

/// Borrowings of the caller
#[utoipa::path(
    get,
    path = "/me/borrowings",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(
        ("status" = Option<String>, Query, description = "all, current, borrowed, returned, overdue or lost")
    ),
    responses(
        (status = 200, description = "Borrowing records, newest first", body = Vec<BorrowingRecord>),
        (status = 400, description = "Unknown status filter", body = ErrorResponse)
    )
)]
pub async fn my_borrowings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BorrowingQuery>,
) -> AppResult<Json<Vec<BorrowingRecord>>> {
    let records = state
        .services
        .borrowings
        .get_user_borrowings(claims.sub, query.filter()?)
        .await?;

    Ok(Json(records))
}

/// Borrowings of every user
#[utoipa::path(
    get,
    path = "/borrowings",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(
        ("status" = Option<String>, Query, description = "all, current, borrowed, returned, overdue or lost")
    ),
    responses(
        (status = 200, description = "Borrowing records, newest first", body = Vec<BorrowingRecord>),
        (status = 400, description = "Unknown status filter", body = ErrorResponse),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn list_borrowings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BorrowingQuery>,
) -> AppResult<Json<Vec<BorrowingRecord>>> {
    state.services.users.require_admin(&claims).await?;

    let records = state
        .services
        .borrowings
        .list_borrowings(query.filter()?)
        .await?;

    Ok(Json(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_procedure_is_rule_violation() {
        let result = procedure_response(ProcedureResult::failed("Borrow limit reached"));
        match result {
            Err(AppError::BusinessRule(msg)) => assert_eq!(msg, "Borrow limit reached"),
            _ => panic!("expected a business rule error"),
        }

        let ok = procedure_response(ProcedureResult {
            success: true,
            due_date: Some("2026-11-01".to_string()),
            error: None,
        });
        assert!(ok.is_ok());
    }

    #[test]
    fn test_unknown_status_filter_is_bad_request() {
        use axum::{http::StatusCode, response::IntoResponse};

        let query = BorrowingQuery {
            status: Some("misplaced".to_string()),
        };
        let response = query.filter().unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
