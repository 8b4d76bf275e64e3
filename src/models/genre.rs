//! Genre model and form

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::record::{Record, RecordId};
use crate::validation::{sanitize, Form, Submission};

/// Genre record. `name` is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Genre {
    pub id: RecordId,
    pub name: String,
}

#[derive(Debug, Clone)]
pub enum GenreFilter {
    Name(String),
}

impl Record for Genre {
    type Filter = GenreFilter;
    const KIND: &'static str = "genre";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn matches(&self, filter: &GenreFilter) -> bool {
        match filter {
            GenreFilter::Name(name) => self.name == *name,
        }
    }

    fn natural_key(&self) -> Option<&str> {
        Some(&self.name)
    }
}

/// Sanitized genre form submission
#[derive(Debug, Clone, Serialize, Validate)]
pub struct GenreForm {
    #[validate(length(min = 1, message = "Genre name required"))]
    pub name: String,
}

impl Form for GenreForm {
    const FIELDS: &'static [&'static str] = &["name"];

    fn from_submission(submission: &Submission) -> Self {
        Self {
            name: sanitize(submission.text("name")),
        }
    }
}

impl GenreForm {
    pub fn to_genre(&self, id: RecordId) -> Genre {
        Genre {
            id,
            name: self.name.clone(),
        }
    }
}
