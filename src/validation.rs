//! Form normalization, sanitization and validation.
//!
//! A submission is checked in two phases: each entity form is built from the
//! raw [`Submission`] with every field trimmed and HTML-escaped (array fields
//! normalized first), then the sanitized form is validated. The result always
//! carries the sanitized values, valid or not, so a re-rendered form keeps
//! what the user typed.

use chrono::NaiveDate;
use indexmap::{map::Entry, IndexMap};
use serde::Serialize;
use validator::{Validate, ValidationErrors};

use crate::{
    error::{AppError, AppResult},
    models::RecordId,
};

/// Raw value of one submitted field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Single(String),
    Many(Vec<String>),
}

/// Raw form submission, in field arrival order
#[derive(Debug, Clone, Default)]
pub struct Submission {
    fields: IndexMap<String, FieldValue>,
}

impl Submission {
    /// Build from decoded `key=value` pairs; a repeated key becomes an array
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut fields: IndexMap<String, FieldValue> = IndexMap::new();
        for (key, value) in pairs {
            let value = value.into();
            match fields.entry(key.into()) {
                Entry::Vacant(entry) => {
                    entry.insert(FieldValue::Single(value));
                }
                Entry::Occupied(mut entry) => {
                    let slot = entry.get_mut();
                    let merged = match std::mem::replace(slot, FieldValue::Many(Vec::new())) {
                        FieldValue::Single(first) => FieldValue::Many(vec![first, value]),
                        FieldValue::Many(mut values) => {
                            values.push(value);
                            FieldValue::Many(values)
                        }
                    };
                    *slot = merged;
                }
            }
        }
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Scalar value of a field; absent reads as empty, an array reads as its first entry
    pub fn text(&self, name: &str) -> &str {
        match self.fields.get(name) {
            Some(FieldValue::Single(value)) => value,
            Some(FieldValue::Many(values)) => values.first().map(String::as_str).unwrap_or(""),
            None => "",
        }
    }

    /// Array value of a field, see [`normalize_list`]
    pub fn list(&self, name: &str) -> Vec<String> {
        normalize_list(self.fields.get(name))
    }

    /// Record identity carried in the body (delete confirmations)
    pub fn identity(&self, name: &str) -> AppResult<RecordId> {
        let value = self.text(name).trim();
        if value.is_empty() {
            return Err(AppError::BadRequest(format!("Missing {}", name)));
        }
        Ok(RecordId::from(value))
    }
}

/// Absent → empty, scalar → one element, array → unchanged
pub fn normalize_list(value: Option<&FieldValue>) -> Vec<String> {
    match value {
        None => Vec::new(),
        Some(FieldValue::Single(value)) => vec![value.clone()],
        Some(FieldValue::Many(values)) => values.clone(),
    }
}

/// Replace HTML-significant characters with entities
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }
    out
}

/// Trim then escape
pub fn sanitize(raw: &str) -> String {
    escape_html(raw.trim())
}

/// Empty means "no date"; anything else must be `YYYY-MM-DD`
pub fn parse_optional_date(value: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map(Some)
}

pub fn optional_date(field: &str, value: &str, message: &str) -> Option<FieldError> {
    parse_optional_date(value)
        .err()
        .map(|_| FieldError::new(field, message))
}

/// One violated rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// A sanitized entity form
pub trait Form: Validate + Serialize {
    /// Declaration order; errors are reported in this order
    const FIELDS: &'static [&'static str];

    fn from_submission(submission: &Submission) -> Self;

    /// Rules the derive cannot express (dates, enumerations)
    fn check_extra(&self) -> Vec<FieldError> {
        Vec::new()
    }
}

/// Sanitized values plus every violated rule
#[derive(Debug, Clone)]
pub struct Checked<F> {
    pub form: F,
    pub errors: Vec<FieldError>,
}

impl<F> Checked<F> {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Normalize, sanitize and validate a submission as form `F`
pub fn check<F: Form>(submission: &Submission) -> Checked<F> {
    let form = F::from_submission(submission);
    let mut errors = match form.validate() {
        Ok(()) => Vec::new(),
        Err(e) => field_errors(&e),
    };
    errors.extend(form.check_extra());
    errors.sort_by_key(|e| {
        F::FIELDS
            .iter()
            .position(|f| *f == e.field)
            .unwrap_or(F::FIELDS.len())
    });
    Checked { form, errors }
}

fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |e| FieldError {
                field: field.clone(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            })
        })
        .collect()
}
