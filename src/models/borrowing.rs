//! Borrowing record model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::book::BookSummary;
use crate::error::{AppError, AppResult};

/// Borrowing lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BorrowingStatus {
    Borrowed,
    Returned,
    Overdue,
    Lost,
}

impl BorrowingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowingStatus::Borrowed => "borrowed",
            BorrowingStatus::Returned => "returned",
            BorrowingStatus::Overdue => "overdue",
            BorrowingStatus::Lost => "lost",
        }
    }
}

impl std::fmt::Display for BorrowingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BorrowingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "borrowed" => Ok(BorrowingStatus::Borrowed),
            "returned" => Ok(BorrowingStatus::Returned),
            "overdue" => Ok(BorrowingStatus::Overdue),
            "lost" => Ok(BorrowingStatus::Lost),
            _ => Err(format!("Invalid borrowing status: {}", s)),
        }
    }
}

/// Borrowing record with its book summary
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowingRecord {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub borrowed_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    /// Status as stored
    pub status: BorrowingStatus,
    /// Status taking the due date into account
    pub effective_status: BorrowingStatus,
    pub is_overdue: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub book: Option<BookSummary>,
}

/// A borrowed record past its due date is overdue even if the store has not
/// reassigned its status yet.
pub fn effective_status(
    status: BorrowingStatus,
    due_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> BorrowingStatus {
    match status {
        BorrowingStatus::Borrowed if due_date < now => BorrowingStatus::Overdue,
        other => other,
    }
}

/// Which records a borrowing listing returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorrowFilter {
    #[default]
    All,
    /// Borrowed or overdue
    Current,
    Status(BorrowingStatus),
}

impl BorrowFilter {
    /// Stored statuses matched by this filter, `None` meaning every status
    pub fn statuses(&self) -> Option<Vec<&'static str>> {
        match self {
            BorrowFilter::All => None,
            BorrowFilter::Current => Some(vec![
                BorrowingStatus::Borrowed.as_str(),
                BorrowingStatus::Overdue.as_str(),
            ]),
            BorrowFilter::Status(status) => Some(vec![status.as_str()]),
        }
    }
}

impl std::str::FromStr for BorrowFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(BorrowFilter::All),
            "current" => Ok(BorrowFilter::Current),
            other => other.parse().map(BorrowFilter::Status),
        }
    }
}

/// Borrowing listing query parameters
#[derive(Debug, Default, Deserialize)]
pub struct BorrowingQuery {
    /// all, current, borrowed, returned, overdue or lost
    pub status: Option<String>,
}

impl BorrowingQuery {
    pub fn filter(&self) -> AppResult<BorrowFilter> {
        match self.status.as_deref() {
            Some(raw) => raw.parse().map_err(AppError::Validation),
            None => Ok(BorrowFilter::All),
        }
    }
}

/// Outcome of the `borrow_book` / `return_book` remote procedures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProcedureResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcedureResult {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            due_date: None,
            error: Some(message.into()),
        }
    }
}
