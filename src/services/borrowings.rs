//! Borrow/return orchestration and borrowing listings

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        borrowing::{BorrowFilter, BorrowingRecord, ProcedureResult},
        user::UserProfile,
    },
    repository::Repository,
};

use super::covers::CoverService;

#[derive(Clone)]
pub struct BorrowingsService {
    repository: Repository,
    covers: CoverService,
}

impl BorrowingsService {
    pub fn new(repository: Repository, covers: CoverService) -> Self {
        Self { repository, covers }
    }

    /// Borrow one copy of a book. Availability, limits and the due date are
    /// decided by the `borrow_book` procedure.
    pub async fn borrow_book(&self, user_id: Uuid, book_id: Uuid) -> AppResult<ProcedureResult> {
        let result = self.repository.borrowings.borrow(user_id, book_id).await?;
        Ok(settle(result, "Borrow failed", |r| {
            tracing::info!(
                "User {} borrowed book {} (due {})",
                user_id,
                book_id,
                r.due_date.as_deref().unwrap_or("-")
            )
        }))
    }

    /// Return a borrowing. Members may only return their own records.
    pub async fn return_book(
        &self,
        profile: &UserProfile,
        borrowing_id: Uuid,
    ) -> AppResult<ProcedureResult> {
        if !profile.is_admin() {
            let record = self.repository.borrowings.get_by_id(borrowing_id).await?;
            if record.user_id != profile.id {
                return Err(AppError::Authorization(
                    "You can only return your own borrowings".to_string(),
                ));
            }
        }

        let result = self.repository.borrowings.return_borrowing(borrowing_id).await?;
        Ok(settle(result, "Return failed", |_| {
            tracing::info!("Borrowing {} returned by {}", borrowing_id, profile.id)
        }))
    }

    /// Borrowings of one user, newest first
    pub async fn get_user_borrowings(
        &self,
        user_id: Uuid,
        filter: BorrowFilter,
    ) -> AppResult<Vec<BorrowingRecord>> {
        let records = self.repository.borrowings.list(Some(user_id), filter).await?;
        Ok(self.with_covers(records))
    }

    /// Borrowings of every user (admin)
    pub async fn list_borrowings(&self, filter: BorrowFilter) -> AppResult<Vec<BorrowingRecord>> {
        let records = self.repository.borrowings.list(None, filter).await?;
        Ok(self.with_covers(records))
    }

    /// Whether the user currently holds a copy of the book
    pub async fn has_user_borrowed_book(&self, user_id: Uuid, book_id: Uuid) -> AppResult<bool> {
        self.repository.borrowings.has_active(user_id, book_id).await
    }

    fn with_covers(&self, mut records: Vec<BorrowingRecord>) -> Vec<BorrowingRecord> {
        for summary in records.iter_mut().filter_map(|r| r.book.as_mut()) {
            self.covers.resolve_summary(summary);
        }
        records
    }
}

/// Fill in a default message on failure, run `on_success` otherwise
fn settle(
    mut result: ProcedureResult,
    default_error: &str,
    on_success: impl FnOnce(&ProcedureResult),
) -> ProcedureResult {
    if result.success {
        on_success(&result);
    } else {
        let message = result
            .error
            .take()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| default_error.to_string());
        tracing::info!("{}: {}", default_error, message);
        result.error = Some(message);
    }
    result
}
