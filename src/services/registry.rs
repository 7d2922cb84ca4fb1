/// Classroom registry.
/// Teacher-side operations on the authoritative classroom records: creation
/// with a unique join code and share link, lookup by code, listing and deletion.

use crate::error::{ClassroomError, Result};
use crate::models::{ClassroomDetails, ClassroomRecord, JoinCode};
use crate::store::{DocumentStore, UpsertMode, CLASSROOMS};
use log::{debug, info, warn};
use rand::Rng;
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

const CODE_LENGTH: usize = 6;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const MAX_CODE_ATTEMPTS: usize = 8;

/// Random uppercase alphanumeric join code.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// `{origin}/join/{code}`
pub fn share_link(origin: &Url, code: &JoinCode) -> String {
    format!("{}/join/{}", origin.as_str().trim_end_matches('/'), code)
}

#[derive(Clone)]
pub struct ClassroomRegistry {
    store: Arc<dyn DocumentStore>,
}

impl ClassroomRegistry {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        ClassroomRegistry { store }
    }

    /// Create a classroom owned by `teacher_id`.
    ///
    /// Code uniqueness is checked with a lookup before insert, so two
    /// concurrent creations can still race onto the same code; `find_by_code`
    /// resolves that deterministically at read time.
    pub async fn create_classroom(
        &self,
        teacher_id: &str,
        details: &ClassroomDetails,
        origin: &Url,
    ) -> Result<ClassroomRecord> {
        let teacher_id = teacher_id.trim();
        if teacher_id.is_empty() {
            return Err(ClassroomError::Validation("teacher id is required".to_string()));
        }
        let details = details.validated()?;

        let mut code = None;
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let candidate = JoinCode::normalize(&generate_code())?;
            let taken = self
                .store
                .find_by_field(CLASSROOMS, "classCode", candidate.as_str())
                .await?;
            if taken.is_empty() {
                code = Some(candidate);
                break;
            }
            debug!("Code {} already taken (attempt {})", candidate, attempt);
        }
        let code = code.ok_or_else(|| {
            ClassroomError::Conflict("could not allocate a unique class code".to_string())
        })?;

        let mut record = ClassroomRecord {
            id: Uuid::new_v4().to_string(),
            class_code: code.to_string(),
            share_link: share_link(origin, &code),
            details,
            created_by: teacher_id.to_string(),
            created_at: self.store.server_timestamp(),
        };
        self.store
            .upsert(CLASSROOMS, &record.id, record.to_fields()?, UpsertMode::Replace)
            .await?;

        // Pick up the store-assigned creation time.
        if let Some(doc) = self.store.get_by_id(CLASSROOMS, &record.id).await? {
            record.created_at = doc.created_at;
        }

        info!("Created classroom {} with code {}", record.id, record.class_code);
        Ok(record)
    }

    pub async fn get_classroom(&self, id: &str) -> Result<Option<ClassroomRecord>> {
        match self.store.get_by_id(CLASSROOMS, id).await? {
            Some(doc) => Ok(Some(ClassroomRecord::from_document(&doc)?)),
            None => Ok(None),
        }
    }

    /// Classroom registered under `code`. When more than one record carries
    /// the code, the oldest one (then lowest id) is returned.
    pub async fn find_by_code(&self, code: &JoinCode) -> Result<Option<ClassroomRecord>> {
        let docs = self
            .store
            .find_by_field(CLASSROOMS, "classCode", code.as_str())
            .await?;
        if docs.len() > 1 {
            warn!("{} classrooms share code {}; using the oldest", docs.len(), code);
        }

        // One unreadable duplicate must not hide the readable ones.
        let mut records: Vec<ClassroomRecord> = docs
            .iter()
            .filter_map(|doc| match ClassroomRecord::from_document(doc) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping unreadable classroom {} for code {}: {}", doc.id, code, e);
                    None
                }
            })
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(records.into_iter().next())
    }

    /// Classrooms created by `teacher_id`, oldest first.
    pub async fn list_classrooms(&self, teacher_id: &str) -> Result<Vec<ClassroomRecord>> {
        let docs = self.store.find_by_field(CLASSROOMS, "createdBy", teacher_id).await?;
        let mut records = docs
            .iter()
            .map(ClassroomRecord::from_document)
            .collect::<Result<Vec<_>>>()?;
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    /// Delete a classroom. Only its creator may delete it; memberships that
    /// point at it are left alone and fall back to their cached snapshot.
    pub async fn delete_classroom(&self, teacher_id: &str, id: &str) -> Result<()> {
        let record = self
            .get_classroom(id)
            .await?
            .ok_or_else(|| ClassroomError::NotFound(format!("classroom {}", id)))?;

        if record.created_by != teacher_id {
            warn!(
                "Teacher {} tried to delete classroom {} owned by {}",
                teacher_id, id, record.created_by
            );
            return Err(ClassroomError::Conflict(
                "only the teacher who created a classroom can delete it".to_string(),
            ));
        }

        self.store.delete_by_id(CLASSROOMS, id).await?;
        info!("Deleted classroom {} ({})", id, record.class_code);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_code_shape() {
        for _ in 0..50 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_share_link() {
        let code = JoinCode::normalize("xq7f2k").unwrap();
        let origin = Url::parse("https://class.example").unwrap();
        assert_eq!(share_link(&origin, &code), "https://class.example/join/XQ7F2K");

        let nested = Url::parse("https://class.example/app/").unwrap();
        assert_eq!(share_link(&nested, &code), "https://class.example/app/join/XQ7F2K");
    }
}
