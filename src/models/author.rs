//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::convert::Infallible;
use validator::Validate;

use super::record::{Record, RecordId};
use crate::validation::{optional_date, parse_optional_date, sanitize, FieldError, Form, Submission};

/// Full author model from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Author {
    pub id: RecordId,
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// "Family, First", or empty when either part is missing
    pub fn full_name(&self) -> String {
        if self.first_name.is_empty() || self.family_name.is_empty() {
            String::new()
        } else {
            format!("{}, {}", self.family_name, self.first_name)
        }
    }

    pub fn lifespan(&self) -> String {
        let fmt = |d: Option<NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
        format!("{} - {}", fmt(self.date_of_birth), fmt(self.date_of_death))
    }
}

impl Record for Author {
    type Filter = Infallible;
    const KIND: &'static str = "author";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn matches(&self, filter: &Infallible) -> bool {
        match *filter {}
    }

    fn display_fields(&self) -> Vec<(&'static str, String)> {
        vec![("full_name", self.full_name()), ("lifespan", self.lifespan())]
    }
}

/// Sanitized author form submission
#[derive(Debug, Clone, Serialize, Validate)]
pub struct AuthorForm {
    #[validate(length(min = 1, message = "First name must be specified."))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Family name must be specified."))]
    pub family_name: String,
    pub date_of_birth: String,
    pub date_of_death: String,
}

impl Form for AuthorForm {
    const FIELDS: &'static [&'static str] =
        &["first_name", "family_name", "date_of_birth", "date_of_death"];

    fn from_submission(submission: &Submission) -> Self {
        Self {
            first_name: sanitize(submission.text("first_name")),
            family_name: sanitize(submission.text("family_name")),
            date_of_birth: sanitize(submission.text("date_of_birth")),
            date_of_death: sanitize(submission.text("date_of_death")),
        }
    }

    fn check_extra(&self) -> Vec<FieldError> {
        [
            optional_date("date_of_birth", &self.date_of_birth, "Invalid date of birth"),
            optional_date("date_of_death", &self.date_of_death, "Invalid date of death"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

impl AuthorForm {
    /// Build the record; unparseable dates become `None` (they were reported by `check`)
    pub fn to_author(&self, id: RecordId) -> Author {
        Author {
            id,
            first_name: self.first_name.clone(),
            family_name: self.family_name.clone(),
            date_of_birth: parse_optional_date(&self.date_of_birth).ok().flatten(),
            date_of_death: parse_optional_date(&self.date_of_death).ok().flatten(),
        }
    }
}
