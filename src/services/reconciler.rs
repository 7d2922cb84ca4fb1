/// Membership reconciler.
/// Joins students to classrooms by code and rebuilds the student's classroom
/// list by merging each stored membership with the live classroom record.

use crate::error::{ClassroomError, Result};
use crate::models::{
    normalize_link, ClassroomRecord, ClassroomView, JoinCode, MembershipRecord, StudentProfile,
};
use crate::services::ClassroomRegistry;
use crate::store::{child_path, to_fields, DocumentStore, UpsertMode, JOINED_CLASSES, STUDENTS};
use futures::future::join_all;
use log::{debug, error, info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Result of a successful join.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutcome {
    /// The membership as written.
    pub membership: MembershipRecord,
    /// What `list_joined_classrooms` now returns for this code.
    pub view: ClassroomView,
}

pub struct MembershipReconciler {
    store: Arc<dyn DocumentStore>,
    registry: ClassroomRegistry,
}

fn require_student(student_id: &str) -> Result<&str> {
    let student_id = student_id.trim();
    if student_id.is_empty() {
        return Err(ClassroomError::Validation("student id is required".to_string()));
    }
    Ok(student_id)
}

/// Both identifiers, when both are supplied, must point at the same classroom.
fn check_link(classroom: &ClassroomRecord, entered: &str) -> Result<()> {
    let expected = classroom.share_link.trim();
    if expected.is_empty() {
        warn!("Classroom {} has no share link; rejecting link {}", classroom.id, entered);
        return Err(ClassroomError::Conflict(
            "classroom has no share link configured".to_string(),
        ));
    }
    if entered != expected {
        warn!(
            "Link mismatch for code {}: expected {}, entered {}",
            classroom.class_code, expected, entered
        );
        return Err(ClassroomError::Conflict(
            "link does not correspond to code".to_string(),
        ));
    }
    Ok(())
}

impl MembershipReconciler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        MembershipReconciler {
            registry: ClassroomRegistry::new(store.clone()),
            store,
        }
    }

    /// The student's joined classrooms, one view per code, ordered by code.
    ///
    /// Failing to list the memberships is terminal. A failed classroom lookup
    /// only degrades that one membership to its cached snapshot.
    pub async fn list_joined_classrooms(&self, student_id: &str) -> Result<Vec<ClassroomView>> {
        let student_id = require_student(student_id)?;
        let docs = self
            .store
            .list_children(STUDENTS, student_id, JOINED_CLASSES)
            .await
            .inspect_err(|e| error!("Failed to list memberships for {}: {}", student_id, e))?;

        let memberships: Vec<MembershipRecord> = docs
            .iter()
            .filter_map(|doc| match MembershipRecord::from_document(doc) {
                Ok(m) => Some(m),
                Err(e) => {
                    warn!("Skipping unreadable membership {}: {}", doc.id, e);
                    None
                }
            })
            .collect();

        let views = join_all(memberships.iter().map(|m| self.resolve(m))).await;

        // Last write wins when two memberships normalize to the same code.
        let mut by_code = BTreeMap::new();
        for view in views {
            if let Some(code) = view.code.clone() {
                by_code.insert(code, view);
            }
        }

        debug!(
            "Student {}: {} memberships, {} classrooms",
            student_id,
            memberships.len(),
            by_code.len()
        );
        Ok(by_code.into_values().collect())
    }

    /// Merge one membership with its live classroom.
    ///
    /// The stored code is normalized on read before the `classCode` lookup,
    /// so memberships written before codes were upper-cased still resolve.
    async fn resolve(&self, membership: &MembershipRecord) -> ClassroomView {
        let Some(code) = membership.join_code() else {
            return ClassroomView::cached(membership);
        };

        match self.registry.find_by_code(&code).await {
            Ok(Some(classroom)) => ClassroomView::merged(membership, &classroom),
            Ok(None) => {
                debug!("No classroom for code {}; using cached fields", code);
                ClassroomView::cached(membership)
            }
            Err(e) => {
                warn!("Lookup for code {} failed, using cached fields: {}", code, e);
                ClassroomView::cached(membership)
            }
        }
    }

    /// Join the classroom registered under `code`.
    ///
    /// The profile upsert and the membership upsert are separate writes.
    /// Re-running a join with the same inputs completes whichever half is
    /// missing and only refreshes the snapshot and `joinedAt`.
    pub async fn join_classroom(
        &self,
        student_id: &str,
        profile: &StudentProfile,
        code: &str,
        link: Option<&str>,
    ) -> Result<JoinOutcome> {
        let student_id = require_student(student_id)?;
        let profile = profile.validated()?;
        let code = JoinCode::normalize(code)?;
        let link = normalize_link(link);

        let classroom = self
            .registry
            .find_by_code(&code)
            .await
            .inspect_err(|e| error!("Classroom lookup for {} failed: {}", code, e))?
            .ok_or_else(|| ClassroomError::NotFound("no class with this code".to_string()))?;

        if let Some(entered) = link.as_deref() {
            check_link(&classroom, entered)?;
        }

        self.store
            .upsert(STUDENTS, student_id, to_fields(&profile)?, UpsertMode::Merge)
            .await
            .inspect_err(|e| error!("Profile write for {} failed: {}", student_id, e))?;

        let membership = MembershipRecord::snapshot(&code, &classroom, self.store.server_timestamp());
        let path = child_path(STUDENTS, student_id, JOINED_CLASSES);
        self.store
            .upsert(&path, code.as_str(), membership.to_fields()?, UpsertMode::Replace)
            .await
            .inspect_err(|e| error!("Membership write for {}/{} failed: {}", student_id, code, e))?;

        info!("Student {} joined classroom {} ({})", student_id, classroom.id, code);
        let view = ClassroomView::merged(&membership, &classroom);
        Ok(JoinOutcome { membership, view })
    }

    /// Stored membership for `code`, if any.
    pub async fn get_membership(&self, student_id: &str, code: &str) -> Result<Option<MembershipRecord>> {
        let student_id = require_student(student_id)?;
        let code = JoinCode::normalize(code)?;
        let path = child_path(STUDENTS, student_id, JOINED_CLASSES);
        match self.store.get_by_id(&path, code.as_str()).await? {
            Some(doc) => Ok(Some(MembershipRecord::from_document(&doc)?)),
            None => Ok(None),
        }
    }

    /// Remove the membership for `code`. Missing memberships are not an error
    /// and the classroom itself is never touched.
    pub async fn delete_membership(&self, student_id: &str, code: &str) -> Result<()> {
        let student_id = require_student(student_id)?;
        let code = JoinCode::normalize(code)?;
        let path = child_path(STUDENTS, student_id, JOINED_CLASSES);
        self.store
            .delete_by_id(&path, code.as_str())
            .await
            .inspect_err(|e| error!("Membership delete for {}/{} failed: {}", student_id, code, e))?;

        info!("Student {} left {}", student_id, code);
        Ok(())
    }
}
