//! Book (catalog entry) model and related types

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// ISBN-10 or ISBN-13, digits only
static ISBN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10}([0-9]{3})?$").expect("ISBN pattern compiles"));

/// Book as stored in the `books` table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub publication_year: Option<i32>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub quantity: i32,
    pub available_quantity: i32,
    /// Stored cover reference: an absolute URL or an object-storage path
    pub cover_image_url: Option<String>,
    /// Cover reference resolved to a fetchable URL (filled by the service layer)
    #[sqlx(skip)]
    #[serde(default)]
    pub cover_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Subset of a book embedded in borrowing and favorite listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookSummary {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    pub available_quantity: i32,
}

/// Book creation payload (admin form)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_quantities", skip_on_field_errors = false))]
pub struct BookInput {
    #[validate(length(min = 1, message = "Title and author are required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Title and author are required"))]
    pub author: String,
    #[validate(regex(path = *ISBN_REGEX, message = "ISBN must be 10 or 13 digits"))]
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    #[validate(range(min = 1000, max = 9999, message = "Publication year must be between 1000 and 9999"))]
    pub publication_year: Option<i32>,
    pub category: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    #[validate(range(min = 0, message = "Available quantity cannot be negative"))]
    pub available_quantity: i32,
    pub cover_image_url: Option<String>,
}

fn validate_quantities(input: &BookInput) -> Result<(), ValidationError> {
    if input.available_quantity > input.quantity {
        let mut err = ValidationError::new("available_exceeds_quantity");
        err.message = Some("Available quantity cannot exceed total quantity".into());
        return Err(err);
    }
    Ok(())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl BookInput {
    /// Trim text fields and turn blank optionals into `None`
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            isbn: trimmed(self.isbn),
            publisher: trimmed(self.publisher),
            publication_year: self.publication_year,
            category: trimmed(self.category),
            description: trimmed(self.description),
            quantity: self.quantity,
            available_quantity: self.available_quantity,
            cover_image_url: trimmed(self.cover_image_url),
        }
    }

    /// Normalize then validate; the returned input is ready to be stored
    pub fn prepare(self) -> Result<Self, validator::ValidationErrors> {
        let mut input = self.normalized();
        input.validate()?;
        input.available_quantity = input.available_quantity.min(input.quantity);
        Ok(input)
    }
}

impl From<&Book> for BookInput {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
            publisher: book.publisher.clone(),
            publication_year: book.publication_year,
            category: book.category.clone(),
            description: book.description.clone(),
            quantity: book.quantity,
            available_quantity: book.available_quantity,
            cover_image_url: book.cover_image_url.clone(),
        }
    }
}

/// Partial book update. A blank string clears an optional text field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    /// `null` clears the year, an absent field keeps it
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schema(value_type = Option<i32>)]
    pub publication_year: Option<Option<i32>>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i32>,
    pub available_quantity: Option<i32>,
    pub cover_image_url: Option<String>,
}

impl BookPatch {
    /// Merge this patch onto the stored book
    pub fn apply_to(self, book: &Book) -> BookInput {
        let current = BookInput::from(book);
        BookInput {
            title: self.title.unwrap_or(current.title),
            author: self.author.unwrap_or(current.author),
            isbn: self.isbn.or(current.isbn),
            publisher: self.publisher.or(current.publisher),
            publication_year: self.publication_year.unwrap_or(current.publication_year),
            category: self.category.or(current.category),
            description: self.description.or(current.description),
            quantity: self.quantity.unwrap_or(current.quantity),
            available_quantity: self.available_quantity.unwrap_or(current.available_quantity),
            cover_image_url: self.cover_image_url.or(current.cover_image_url),
        }
    }
}

/// Book listing query parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Case-insensitive substring matched against title or author
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Fetch only the requested page instead of every page up to it
    pub append: Option<bool>,
}

impl BookQuery {
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> BookInput {
        BookInput {
            title: "  Dune ".to_string(),
            author: "Frank Herbert".to_string(),
            isbn: Some("9780441013593".to_string()),
            publisher: Some("   ".to_string()),
            publication_year: Some(1965),
            category: None,
            description: None,
            quantity: 3,
            available_quantity: 2,
            cover_image_url: Some("".to_string()),
        }
    }

    fn book() -> Book {
        let now = Utc::now();
        Book {
            id: Uuid::new_v4(),
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            isbn: None,
            publisher: None,
            publication_year: None,
            category: None,
            description: None,
            quantity: 4,
            available_quantity: 4,
            cover_image_url: None,
            cover_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_prepare_normalizes() {
        let prepared = input().prepare().unwrap();
        assert_eq!(prepared.title, "Dune");
        assert_eq!(prepared.publisher, None);
        assert_eq!(prepared.cover_image_url, None);
    }

    #[test]
    fn test_required_fields() {
        let mut bad = input();
        bad.author = "   ".to_string();
        assert!(bad.prepare().is_err());
    }

    #[test]
    fn test_isbn_shape() {
        for isbn in ["0441013597", "9780441013593"] {
            let mut ok = input();
            ok.isbn = Some(isbn.to_string());
            assert!(ok.prepare().is_ok(), "{isbn} should be accepted");
        }
        for isbn in ["978-0441013593", "044101359", "97804410135931", "04410135X7"] {
            let mut bad = input();
            bad.isbn = Some(isbn.to_string());
            assert!(bad.prepare().is_err(), "{isbn} should be rejected");
        }
    }

    #[test]
    fn test_quantity_bounds() {
        let mut bad = input();
        bad.available_quantity = 4;
        assert!(bad.prepare().is_err());

        let mut bad = input();
        bad.quantity = -1;
        bad.available_quantity = -1;
        assert!(bad.prepare().is_err());

        let mut edge = input();
        edge.quantity = 0;
        edge.available_quantity = 0;
        assert!(edge.prepare().is_ok());
    }

    #[test]
    fn test_year_range() {
        for year in [999, 10000] {
            let mut bad = input();
            bad.publication_year = Some(year);
            assert!(bad.prepare().is_err(), "{year} should be rejected");
        }
        for year in [1000, 9999] {
            let mut ok = input();
            ok.publication_year = Some(year);
            assert!(ok.prepare().is_ok(), "{year} should be accepted");
        }
    }

    #[test]
    fn test_patch_is_validated_against_stored_book() {
        // Lowering quantity below the stored available count must be rejected
        let patch = BookPatch {
            quantity: Some(2),
            ..Default::default()
        };
        assert!(patch.apply_to(&book()).prepare().is_err());

        let patch = BookPatch {
            quantity: Some(2),
            available_quantity: Some(1),
            ..Default::default()
        };
        let merged = patch.apply_to(&book()).prepare().unwrap();
        assert_eq!(merged.quantity, 2);
        assert_eq!(merged.available_quantity, 1);
        assert_eq!(merged.title, "Dune");
    }

    #[test]
    fn test_blank_patch_clears_optional_field() {
        let mut stored = book();
        stored.category = Some("Science fiction".to_string());
        let patch = BookPatch {
            category: Some(" ".to_string()),
            ..Default::default()
        };
        let merged = patch.apply_to(&stored).prepare().unwrap();
        assert_eq!(merged.category, None);
    }

    #[test]
    fn test_patch_null_year_clears_it() {
        let mut stored = book();
        stored.publication_year = Some(1965);

        let keep: BookPatch = serde_json::from_str(r#"{"title": "Dune Messiah"}"#).unwrap();
        assert_eq!(keep.apply_to(&stored).publication_year, Some(1965));

        let clear: BookPatch = serde_json::from_str(r#"{"publication_year": null}"#).unwrap();
        assert_eq!(clear.publication_year, Some(None));
        let merged = clear.apply_to(&stored).prepare().unwrap();
        assert_eq!(merged.publication_year, None);

        let set: BookPatch = serde_json::from_str(r#"{"publication_year": 1969}"#).unwrap();
        assert_eq!(set.apply_to(&stored).publication_year, Some(1969));
    }

    #[test]
    fn test_search_term() {
        let query = BookQuery {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.search_term(), None);

        let query = BookQuery {
            search: Some(" herbert ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.search_term(), Some("herbert"));
    }
}
