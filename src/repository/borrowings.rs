//! Borrowing records repository and remote procedure calls

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use super::BorrowingsStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookSummary,
        borrowing::{effective_status, BorrowFilter, BorrowingRecord, BorrowingStatus, ProcedureResult},
    },
};

const RECORD_SELECT: &str = r#"
    SELECT r.id, r.book_id, r.user_id, r.borrowed_at, r.due_date, r.returned_at,
           r.status, r.notes, r.created_at, r.updated_at,
           b.title AS book_title, b.author AS book_author,
           b.cover_image_url AS book_cover_image_url,
           b.available_quantity AS book_available_quantity
    FROM borrowing_records r
    LEFT JOIN books b ON b.id = r.book_id
"#;

#[derive(Clone)]
pub struct BorrowingsRepository {
    pool: Pool<Postgres>,
}

impl BorrowingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Run a procedure returning a JSON `{success, due_date?, error?}` document
    async fn call_procedure(&self, sql: &str, args: &[Uuid]) -> AppResult<ProcedureResult> {
        let mut query = sqlx::query_scalar::<_, serde_json::Value>(sql);
        for arg in args {
            query = query.bind(*arg);
        }
        procedure_outcome(query.fetch_one(&self.pool).await)
    }
}

/// An exception raised inside a procedure is a refusal the caller should see,
/// not a store failure.
fn procedure_outcome(result: Result<serde_json::Value, sqlx::Error>) -> AppResult<ProcedureResult> {
    match result {
        Ok(value) => serde_json::from_value(value)
            .map_err(|e| AppError::Internal(format!("Unexpected procedure result: {}", e))),
        Err(sqlx::Error::Database(db)) => {
            tracing::warn!("Procedure raised {:?}: {}", db.code(), db.message());
            Ok(ProcedureResult::failed(db.message()))
        }
        Err(e) => Err(e.into()),
    }
}

fn record_from_row(row: &PgRow, now: DateTime<Utc>) -> AppResult<BorrowingRecord> {
    let raw_status: String = row.try_get("status")?;
    let status: BorrowingStatus = raw_status
        .parse()
        .map_err(AppError::Internal)?;
    let due_date: DateTime<Utc> = row.try_get("due_date")?;
    let effective = effective_status(status, due_date, now);
    let book_id: Uuid = row.try_get("book_id")?;

    let book = match row.try_get::<Option<String>, _>("book_title")? {
        Some(title) => Some(BookSummary {
            id: book_id,
            title,
            author: row.try_get::<Option<String>, _>("book_author")?.unwrap_or_default(),
            cover_image_url: row.try_get("book_cover_image_url")?,
            cover_url: None,
            available_quantity: row
                .try_get::<Option<i32>, _>("book_available_quantity")?
                .unwrap_or(0),
        }),
        None => None,
    };

    Ok(BorrowingRecord {
        id: row.try_get("id")?,
        book_id,
        user_id: row.try_get("user_id")?,
        borrowed_at: row.try_get("borrowed_at")?,
        due_date,
        returned_at: row.try_get("returned_at")?,
        status,
        effective_status: effective,
        is_overdue: effective == BorrowingStatus::Overdue,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        book,
    })
}

#[async_trait]
impl BorrowingsStore for BorrowingsRepository {
    async fn borrow(&self, user_id: Uuid, book_id: Uuid) -> AppResult<ProcedureResult> {
        self.call_procedure(
            "SELECT to_json(borrow_book(p_user_id => $1, p_book_id => $2))",
            &[user_id, book_id],
        )
        .await
    }

    async fn return_borrowing(&self, borrowing_id: Uuid) -> AppResult<ProcedureResult> {
        self.call_procedure(
            "SELECT to_json(return_book(p_borrowing_id => $1))",
            &[borrowing_id],
        )
        .await
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<BorrowingRecord> {
        let query = format!("{} WHERE r.id = $1", RECORD_SELECT);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrowing record {} not found", id)))?;

        record_from_row(&row, Utc::now())
    }

    async fn list(&self, user_id: Option<Uuid>, filter: BorrowFilter) -> AppResult<Vec<BorrowingRecord>> {
        let statuses: Option<Vec<String>> = filter
            .statuses()
            .map(|s| s.into_iter().map(String::from).collect());

        let query = format!(
            r#"{}
            WHERE ($1::uuid IS NULL OR r.user_id = $1)
              AND ($2::text[] IS NULL OR r.status = ANY($2))
            ORDER BY r.borrowed_at DESC
            "#,
            RECORD_SELECT
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .bind(statuses)
            .fetch_all(&self.pool)
            .await?;

        let now = Utc::now();
        rows.iter().map(|row| record_from_row(row, now)).collect()
    }

    async fn has_active(&self, user_id: Uuid, book_id: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM borrowing_records
                WHERE user_id = $1 AND book_id = $2 AND status = 'borrowed'
            )
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    use serde_json::json;
    use sqlx::error::{DatabaseError, ErrorKind};

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct RaisedException(&'static str);

    impl DatabaseError for RaisedException {
        fn message(&self) -> &str {
            self.0
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed("P0001"))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    #[test]
    fn test_raised_exception_becomes_failed_result() {
        let raised = sqlx::Error::Database(Box::new(RaisedException("Book is not available")));
        assert_eq!(
            procedure_outcome(Err(raised)).unwrap(),
            ProcedureResult::failed("Book is not available")
        );
    }

    #[test]
    fn test_procedure_payload_is_decoded() {
        let result = procedure_outcome(Ok(json!({"success": false, "error": "Borrow limit reached"})));
        assert_eq!(result.unwrap(), ProcedureResult::failed("Borrow limit reached"));

        assert!(matches!(
            procedure_outcome(Ok(json!("unexpected"))),
            Err(AppError::Internal(_))
        ));
    }

    #[test]
    fn test_connection_failure_stays_an_error() {
        assert!(matches!(
            procedure_outcome(Err(sqlx::Error::PoolTimedOut)),
            Err(AppError::Database(_))
        ));
    }
}
