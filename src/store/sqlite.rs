/// SQLite-backed document store.
/// Every collection lives in one `documents` table; fields are kept as a JSON object.

use super::{child_path, merge_fields, Document, DocumentStore, Fields, UpsertMode};
use crate::error::{ClassroomError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open (or create) a store at the given database path
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        let conn = Connection::open(&db_path).map_err(|e| {
            ClassroomError::BackendUnavailable(format!("Failed to open database {:?}: {}", db_path, e))
        })?;
        Self::initialize(&conn)?;

        Ok(SqliteStore {
            conn: Arc::new(Mutex::new(conn)),
            db_path,
        })
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            ClassroomError::BackendUnavailable(format!("Failed to create in-memory DB: {}", e))
        })?;
        Self::initialize(&conn)?;

        Ok(SqliteStore {
            conn: Arc::new(Mutex::new(conn)),
            db_path: PathBuf::from(":memory:"),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn initialize(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                fields TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (collection, id)
            );

            CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection);
            "#,
        )?;
        Ok(())
    }
}

fn read_document(row: &Row<'_>) -> rusqlite::Result<Document> {
    let fields_json: String = row.get(1)?;
    let fields: Fields = serde_json::from_str(&fields_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Document {
        id: row.get(0)?,
        fields,
        created_at: row.get(2)?,
    })
}

fn select_collection(conn: &Connection, collection: &str) -> Result<Vec<Document>> {
    let mut stmt = conn.prepare(
        "SELECT id, fields, created_at FROM documents WHERE collection = ?1 ORDER BY created_at, id",
    )?;
    let docs = stmt
        .query_map(params![collection], read_document)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(docs)
}

fn select_by_field(conn: &Connection, collection: &str, field: &str, value: &str) -> Result<Vec<Document>> {
    let path = format!("$.\"{}\"", field);
    let mut stmt = conn.prepare(
        "SELECT id, fields, created_at FROM documents
         WHERE collection = ?1 AND json_extract(fields, ?2) = ?3
         ORDER BY created_at, id",
    )?;
    let docs = stmt
        .query_map(params![collection, path, value], read_document)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(docs)
}

fn select_one(conn: &Connection, collection: &str, id: &str) -> Result<Option<Document>> {
    let doc = conn
        .query_row(
            "SELECT id, fields, created_at FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection, id],
            read_document,
        )
        .optional()?;
    Ok(doc)
}

fn write_document(
    conn: &Connection,
    collection: &str,
    id: &str,
    fields: Fields,
    mode: UpsertMode,
    now: DateTime<Utc>,
) -> Result<()> {
    let fields = match (mode, select_one(conn, collection, id)?) {
        (UpsertMode::Merge, Some(mut existing)) => {
            merge_fields(&mut existing.fields, fields);
            existing.fields
        }
        _ => fields,
    };
    let fields_json = serde_json::to_string(&fields)?;

    conn.execute(
        "INSERT INTO documents (collection, id, fields, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)
         ON CONFLICT(collection, id) DO UPDATE SET
             fields = excluded.fields,
             updated_at = excluded.updated_at",
        params![collection, id, fields_json, now],
    )?;
    Ok(())
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn find_by_field(&self, collection: &str, field: &str, value: &str) -> Result<Vec<Document>> {
        let conn = self.conn.lock().await;
        select_by_field(&conn, collection, field, value)
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let conn = self.conn.lock().await;
        select_one(&conn, collection, id)
    }

    async fn list_children(
        &self,
        collection: &str,
        parent_id: &str,
        subcollection: &str,
    ) -> Result<Vec<Document>> {
        let path = child_path(collection, parent_id, subcollection);
        let conn = self.conn.lock().await;
        select_collection(&conn, &path)
    }

    async fn upsert(&self, collection: &str, id: &str, fields: Fields, mode: UpsertMode) -> Result<()> {
        let now = self.server_timestamp();
        let conn = self.conn.lock().await;
        write_document(&conn, collection, id, fields, mode, now)
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;
        Ok(())
    }
}
