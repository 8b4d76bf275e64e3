//! Book copy (physical exemplar) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use validator::Validate;

use super::{
    book::Book,
    record::{Record, RecordId},
};
use crate::{
    error::AppResult,
    validation::{optional_date, parse_optional_date, sanitize, FieldError, Form, Submission},
    views::present,
};

/// Circulation status of a copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "copy_status")]
pub enum CopyStatus {
    Available,
    #[default]
    Maintenance,
    Loaned,
    Reserved,
}

impl CopyStatus {
    pub const ALL: [CopyStatus; 4] = [
        CopyStatus::Available,
        CopyStatus::Maintenance,
        CopyStatus::Loaned,
        CopyStatus::Reserved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CopyStatus::Available => "Available",
            CopyStatus::Maintenance => "Maintenance",
            CopyStatus::Loaned => "Loaned",
            CopyStatus::Reserved => "Reserved",
        }
    }
}

impl FromStr for CopyStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CopyStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Book copy record. `due_back` only means something while the copy is not available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BookCopy {
    pub id: RecordId,
    #[sqlx(rename = "book_id")]
    pub book: RecordId,
    pub imprint: String,
    pub status: CopyStatus,
    pub due_back: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub enum CopyFilter {
    Book(RecordId),
    Status(CopyStatus),
}

impl Record for BookCopy {
    type Filter = CopyFilter;
    const KIND: &'static str = "bookcopy";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn matches(&self, filter: &CopyFilter) -> bool {
        match filter {
            CopyFilter::Book(id) => self.book == *id,
            CopyFilter::Status(status) => self.status == *status,
        }
    }
}

/// Copy with its book resolved (`None` when the reference dangles)
#[derive(Debug, Clone)]
pub struct PopulatedCopy {
    pub copy: BookCopy,
    pub book: Option<Book>,
}

impl PopulatedCopy {
    pub fn present(&self) -> AppResult<Value> {
        let mut value = present(&self.copy)?;
        if let Value::Object(fields) = &mut value {
            fields.insert(
                "book".to_string(),
                self.book.as_ref().map(present).transpose()?.unwrap_or(Value::Null),
            );
        }
        Ok(value)
    }
}

/// Sanitized book copy form submission
#[derive(Debug, Clone, Serialize, Validate)]
pub struct BookCopyForm {
    #[validate(length(min = 1, message = "Book must be specified"))]
    pub book: String,
    #[validate(length(min = 1, message = "Imprint must be specified"))]
    pub imprint: String,
    pub status: String,
    pub due_back: String,
}

impl Form for BookCopyForm {
    const FIELDS: &'static [&'static str] = &["book", "imprint", "status", "due_back"];

    fn from_submission(submission: &Submission) -> Self {
        Self {
            book: sanitize(submission.text("book")),
            imprint: sanitize(submission.text("imprint")),
            status: sanitize(submission.text("status")),
            due_back: sanitize(submission.text("due_back")),
        }
    }

    fn check_extra(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if !self.status.is_empty() && self.status.parse::<CopyStatus>().is_err() {
            errors.push(FieldError::new("status", "Invalid status"));
        }
        errors.extend(optional_date("due_back", &self.due_back, "Invalid date"));
        errors
    }
}

impl BookCopyForm {
    /// An empty status falls back to [`CopyStatus::Maintenance`]
    pub fn to_copy(&self, id: RecordId) -> BookCopy {
        BookCopy {
            id,
            book: RecordId::from(self.book.as_str()),
            imprint: self.imprint.clone(),
            status: self.status.parse().unwrap_or_default(),
            due_back: parse_optional_date(&self.due_back).ok().flatten(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!("Loaned".parse::<CopyStatus>(), Ok(CopyStatus::Loaned));
        assert!("loaned".parse::<CopyStatus>().is_err());
        assert_eq!(CopyStatus::default(), CopyStatus::Maintenance);
    }

    #[test]
    fn test_status_serializes_as_name() {
        assert_eq!(
            serde_json::to_value(CopyStatus::Available).unwrap(),
            serde_json::json!("Available")
        );
    }

    #[test]
    fn test_form_empty_status_defaults() {
        let form = BookCopyForm {
            book: "B1".to_string(),
            imprint: "Gollancz, 2007".to_string(),
            status: String::new(),
            due_back: "2024-05-01".to_string(),
        };
        let copy = form.to_copy(RecordId::from("C1"));
        assert_eq!(copy.status, CopyStatus::Maintenance);
        assert_eq!(copy.due_back, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert!(form.check_extra().is_empty());
    }
}
