//! Record identity and the behaviour shared by every catalog collection

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque record identity. Assigned once and never changed by an update.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Mint a fresh identity for a new record
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A record held by a [`RecordStore`](crate::repository::RecordStore).
pub trait Record: Clone + Send + Sync + Serialize + 'static {
    /// Lookup criteria accepted by `find_by` and `count`
    type Filter: Send + Sync + fmt::Debug;

    /// Singular path segment, also used in log lines
    const KIND: &'static str;

    fn id(&self) -> &RecordId;

    /// Whether this record satisfies `filter`
    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Non-identity field that must be unique across the collection
    fn natural_key(&self) -> Option<&str> {
        None
    }

    fn url(&self) -> String {
        format!("/catalog/{}/{}", Self::KIND, self.id())
    }

    /// Derived display strings added to the view-model next to the stored fields
    fn display_fields(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = RecordId::generate();
        let b = RecordId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
    }

    #[test]
    fn test_any_string_is_an_identity() {
        let id = RecordId::from("B1");
        assert_eq!(id.to_string(), "B1");
        assert_eq!(serde_json::to_value(&id).unwrap(), serde_json::json!("B1"));
    }
}
