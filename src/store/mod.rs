/// Document store abstraction.
/// The reconciler and registry only talk to the backend through this trait,
/// so the hosted document database, SQLite and the in-memory store are interchangeable.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::{ClassroomError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

pub type Fields = Map<String, Value>;

/// Teacher-owned classroom records.
pub const CLASSROOMS: &str = "classrooms";
/// Student profiles, keyed by the authenticated student id.
pub const STUDENTS: &str = "students";
/// Per-student subcollection of memberships, keyed by join code.
pub const JOINED_CLASSES: &str = "classes";
/// Sign-in records holding each user's role.
pub const USERS: &str = "users";

// Class content, nested under `classrooms/{id}`.
pub const NOTICES: &str = "notices";
pub const LINKS: &str = "links";
pub const ASSIGNMENTS: &str = "assignments";
pub const NOTES: &str = "notes";
/// Nested under each note unit.
pub const NOTE_RESOURCES: &str = "resources";
pub const ATTENDANCE: &str = "attendanceMonths";
pub const MEMBERS: &str = "members";

/// Path of a subcollection nested under `collection/parent_id`.
pub fn child_path(collection: &str, parent_id: &str, subcollection: &str) -> String {
    format!("{}/{}/{}", collection, parent_id, subcollection)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertMode {
    /// Supplied fields overwrite, absent fields are kept.
    Merge,
    /// The stored fields become exactly the supplied fields.
    Replace,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
    /// Server-assigned on first insert, never changed afterwards.
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// Decode the document fields into a record type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_str())
    }
}

/// Serialize a record into a field map suitable for `upsert`.
pub fn to_fields<T: Serialize>(record: &T) -> Result<Fields> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(ClassroomError::Validation(format!(
            "record must serialize to an object, got {}",
            other
        ))),
    }
}

/// Apply a merge upsert on top of existing fields.
pub(crate) fn merge_fields(existing: &mut Fields, incoming: Fields) {
    for (key, value) in incoming {
        existing.insert(key, value);
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Equality lookup on a top-level string field.
    async fn find_by_field(&self, collection: &str, field: &str, value: &str) -> Result<Vec<Document>>;

    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    async fn list_children(
        &self,
        collection: &str,
        parent_id: &str,
        subcollection: &str,
    ) -> Result<Vec<Document>>;

    async fn upsert(&self, collection: &str, id: &str, fields: Fields, mode: UpsertMode) -> Result<()>;

    /// Deleting a missing document is not an error.
    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<()>;

    fn server_timestamp(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
