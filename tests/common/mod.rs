#![allow(dead_code)]

//! Common test utilities and helpers for integration tests
//! Provides store setup, record builders and a failure-injecting store wrapper

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use classroom_client::error::{ClassroomError, Result};
use classroom_client::models::{ClassroomDetails, ClassroomRecord, Role, RoleIntent, StudentProfile};
use classroom_client::services::{
    ClassroomRegistry, ContentService, MembershipReconciler, SessionService,
};
use classroom_client::store::{
    child_path, to_fields, Document, DocumentStore, Fields, MemoryStore, SqliteStore, UpsertMode,
    CLASSROOMS, JOINED_CLASSES, STUDENTS,
};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Test context holding one store and the services built on it
pub struct TestContext {
    pub store: Arc<dyn DocumentStore>,
    pub registry: ClassroomRegistry,
    pub reconciler: MembershipReconciler,
    pub session: SessionService,
    pub content: ContentService,
    pub temp_dir: Option<TempDir>,
}

impl TestContext {
    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        TestContext {
            registry: ClassroomRegistry::new(store.clone()),
            reconciler: MembershipReconciler::new(store.clone()),
            session: SessionService::new(store.clone()),
            content: ContentService::new(store.clone()),
            store,
            temp_dir: None,
        }
    }

    /// Create a new test context with in-memory storage
    pub fn new_in_memory() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    /// Create a new test context with file-based SQLite storage
    pub fn new_with_file_storage() -> Result<Self> {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = SqliteStore::open(temp_dir.path().join("test_classroom.db"))?;
        let mut ctx = Self::with_store(Arc::new(store));
        ctx.temp_dir = Some(temp_dir);
        Ok(ctx)
    }

    /// Insert a classroom directly at the storage layer
    pub async fn seed_classroom(&self, record: &ClassroomRecord) -> Result<()> {
        self.store
            .upsert(CLASSROOMS, &record.id, record.to_fields()?, UpsertMode::Replace)
            .await
    }

    /// Insert a raw membership document, bypassing join normalization
    pub async fn seed_membership(&self, student_id: &str, doc_id: &str, fields: serde_json::Value) -> Result<()> {
        let path = child_path(STUDENTS, student_id, JOINED_CLASSES);
        self.store
            .upsert(&path, doc_id, to_fields(&fields)?, UpsertMode::Replace)
            .await
    }

    /// Sign `uid` in with an explicit role
    pub async fn sign_in_as(&self, uid: &str, role: Role) -> Result<()> {
        self.session
            .sign_in(uid, None, Some(RoleIntent::new(role)))
            .await
            .map(|_| ())
    }

    /// Seed classroom T1 and sign in teacher-1 (teacher) and S1 (student)
    pub async fn with_class_members(&self) -> Result<()> {
        self.seed_classroom(&TestClassroomBuilder::new().id("T1").build()).await?;
        self.sign_in_as("teacher-1", Role::Teacher).await?;
        self.sign_in_as("S1", Role::Student).await
    }

    pub async fn membership_count(&self, student_id: &str) -> Result<usize> {
        Ok(self
            .store
            .list_children(STUDENTS, student_id, JOINED_CLASSES)
            .await?
            .len())
    }
}

/// Helper for creating classroom records
pub struct TestClassroomBuilder {
    id: String,
    code: String,
    share_link: String,
    details: ClassroomDetails,
    created_by: String,
}

impl Default for TestClassroomBuilder {
    fn default() -> Self {
        TestClassroomBuilder {
            id: "T1".to_string(),
            code: "XQ7F2K".to_string(),
            share_link: "https://s/XQ7F2K".to_string(),
            details: ClassroomDetails::new("Physics", "Dr. Rao", "IIT Delhi", "BSc", "5"),
            created_by: "teacher-1".to_string(),
        }
    }
}

impl TestClassroomBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn code(mut self, code: &str) -> Self {
        self.code = code.to_string();
        self
    }

    pub fn share_link(mut self, link: &str) -> Self {
        self.share_link = link.to_string();
        self
    }

    pub fn subject(mut self, subject: &str) -> Self {
        self.details.subject = subject.to_string();
        self
    }

    pub fn professor(mut self, professor: &str) -> Self {
        self.details.professor_name = professor.to_string();
        self
    }

    pub fn created_by(mut self, teacher: &str) -> Self {
        self.created_by = teacher.to_string();
        self
    }

    pub fn build(self) -> ClassroomRecord {
        ClassroomRecord {
            id: self.id,
            class_code: self.code,
            share_link: self.share_link,
            details: self.details,
            created_by: self.created_by,
            created_at: Utc::now(),
        }
    }
}

/// Profile from the end-to-end scenario
pub fn valid_profile() -> StudentProfile {
    StudentProfile::new("A", "1", "X", "5")
}

pub fn details() -> ClassroomDetails {
    ClassroomDetails::new("Chemistry", "Dr. Iyer", "NIT Trichy", "BTech", "3")
}

pub fn membership_fields(code: &str, subject: &str, classroom_id: &str) -> serde_json::Value {
    json!({
        "code": code,
        "link": "",
        "subject": subject,
        "professorName": "Cached Prof",
        "collegeName": "Cached College",
        "degree": "BSc",
        "semester": "4",
        "classroomId": classroom_id,
    })
}

/// Wraps a store and fails chosen operations with `BackendUnavailable`
pub struct FlakyStore {
    inner: Arc<dyn DocumentStore>,
    fail_lookups: AtomicBool,
    fail_listing: AtomicBool,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: Arc<dyn DocumentStore>) -> Self {
        FlakyStore {
            inner,
            fail_lookups: AtomicBool::new(false),
            fail_listing: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn fail_lookups(&self, on: bool) {
        self.fail_lookups.store(on, Ordering::SeqCst);
    }

    pub fn fail_listing(&self, on: bool) {
        self.fail_listing.store(on, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, what: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(ClassroomError::BackendUnavailable(format!("{} unavailable", what)));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn find_by_field(&self, collection: &str, field: &str, value: &str) -> Result<Vec<Document>> {
        Self::check(&self.fail_lookups, "lookup")?;
        self.inner.find_by_field(collection, field, value).await
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        Self::check(&self.fail_lookups, "lookup")?;
        self.inner.get_by_id(collection, id).await
    }

    async fn list_children(
        &self,
        collection: &str,
        parent_id: &str,
        subcollection: &str,
    ) -> Result<Vec<Document>> {
        Self::check(&self.fail_listing, "listing")?;
        self.inner.list_children(collection, parent_id, subcollection).await
    }

    async fn upsert(&self, collection: &str, id: &str, fields: Fields, mode: UpsertMode) -> Result<()> {
        Self::check(&self.fail_writes, "write")?;
        self.inner.upsert(collection, id, fields, mode).await
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<()> {
        Self::check(&self.fail_writes, "write")?;
        self.inner.delete_by_id(collection, id).await
    }

    fn server_timestamp(&self) -> DateTime<Utc> {
        self.inner.server_timestamp()
    }
}
