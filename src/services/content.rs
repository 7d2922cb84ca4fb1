/// Class content service.
/// Posts, lists and removes the material shared inside a classroom: notices,
/// links, assignments, note units with their resources, monthly attendance
/// sheets and the member roster. Every item lives in a subcollection of its
/// classroom document.

use crate::error::{ClassroomError, Result};
use crate::models::{
    required, Assignment, AttendanceSheet, LinkPost, NoteResource, NoteUnit, Notice, Posted, Role,
    Roster, RosterMember,
};
use crate::services::SessionService;
use crate::store::{
    child_path, to_fields, DocumentStore, UpsertMode, ASSIGNMENTS, ATTENDANCE, CLASSROOMS, LINKS,
    MEMBERS, NOTES, NOTE_RESOURCES, NOTICES,
};
use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

/// Who may perform a content write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    /// Only users whose stored role is teacher.
    Teacher,
    /// Any user with a sign-in record.
    Member,
}

fn valid_url(field: &str, value: &str) -> Result<String> {
    let value = required(field, value)?;
    Url::parse(&value)
        .map_err(|e| ClassroomError::Validation(format!("{} is not a valid URL: {}", field, e)))?;
    Ok(value)
}

fn newest_first<T>(items: &mut [Posted<T>]) {
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
}

fn oldest_first<T>(items: &mut [Posted<T>]) {
    items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}

#[derive(Clone)]
pub struct ContentService {
    store: Arc<dyn DocumentStore>,
    session: SessionService,
}

impl ContentService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        ContentService {
            session: SessionService::new(store.clone()),
            store,
        }
    }

    /// Check the caller's stored role before a write.
    async fn authorize(&self, uid: &str, access: Access, action: &str) -> Result<String> {
        let uid = required("user id", uid)?;
        let role = self
            .session
            .role_of(&uid)
            .await?
            .ok_or_else(|| ClassroomError::NotFound(format!("no sign-in record for user {}", uid)))?;

        if access == Access::Teacher && role != Role::Teacher {
            warn!("User {} ({}) may not {}", uid, role, action);
            return Err(ClassroomError::Conflict(format!("only teachers can {}", action)));
        }
        Ok(uid)
    }

    /// Path of a content collection under an existing classroom.
    async fn collection(&self, classroom_id: &str, kind: &str) -> Result<String> {
        let classroom_id = required("classroom id", classroom_id)?;
        if self.store.get_by_id(CLASSROOMS, &classroom_id).await?.is_none() {
            return Err(ClassroomError::NotFound(format!("classroom {}", classroom_id)));
        }
        Ok(child_path(CLASSROOMS, &classroom_id, kind))
    }

    async fn insert<T: Serialize>(&self, path: &str, item: T) -> Result<Posted<T>> {
        let id = Uuid::new_v4().to_string();
        self.store
            .upsert(path, &id, to_fields(&item)?, UpsertMode::Replace)
            .await?;
        let created_at = match self.store.get_by_id(path, &id).await? {
            Some(doc) => doc.created_at,
            None => self.store.server_timestamp(),
        };
        debug!("Stored {}/{}", path, id);
        Ok(Posted { id, created_at, item })
    }

    /// Decode every document at `collection/parent_id/subcollection`,
    /// skipping the ones that no longer match their record type.
    async fn load<T: DeserializeOwned>(
        &self,
        collection: &str,
        parent_id: &str,
        subcollection: &str,
    ) -> Result<Vec<Posted<T>>> {
        let docs = self.store.list_children(collection, parent_id, subcollection).await?;
        Ok(docs
            .iter()
            .filter_map(|doc| match Posted::from_document(doc) {
                Ok(posted) => Some(posted),
                Err(e) => {
                    warn!("Skipping unreadable {} item {}: {}", subcollection, doc.id, e);
                    None
                }
            })
            .collect())
    }

    async fn load_in<T: DeserializeOwned>(&self, classroom_id: &str, kind: &str) -> Result<Vec<Posted<T>>> {
        let path = self.collection(classroom_id, kind).await?;
        debug!("Listing {}", path);
        self.load(CLASSROOMS, classroom_id.trim(), kind).await
    }

    async fn remove(&self, classroom_id: &str, kind: &str, id: &str) -> Result<()> {
        let path = self.collection(classroom_id, kind).await?;
        let id = required("id", id)?;
        self.store.delete_by_id(&path, &id).await?;
        info!("Deleted {}/{}", path, id);
        Ok(())
    }

    // ===== Notices =====

    pub async fn post_notice(
        &self,
        uid: &str,
        classroom_id: &str,
        title: &str,
        description: &str,
    ) -> Result<Posted<Notice>> {
        let notice = Notice {
            title: required("title", title)?,
            description: description.trim().to_string(),
            created_by: String::new(),
        };
        let created_by = self.authorize(uid, Access::Teacher, "post notices").await?;
        let path = self.collection(classroom_id, NOTICES).await?;
        let posted = self.insert(&path, Notice { created_by, ..notice }).await?;
        info!("Notice {} posted in {}", posted.id, classroom_id.trim());
        Ok(posted)
    }

    /// Notices, newest first.
    pub async fn list_notices(&self, classroom_id: &str) -> Result<Vec<Posted<Notice>>> {
        let mut notices = self.load_in(classroom_id, NOTICES).await?;
        newest_first(&mut notices);
        Ok(notices)
    }

    pub async fn delete_notice(&self, uid: &str, classroom_id: &str, id: &str) -> Result<()> {
        self.authorize(uid, Access::Teacher, "delete notices").await?;
        self.remove(classroom_id, NOTICES, id).await
    }

    // ===== Links =====

    pub async fn post_link(
        &self,
        uid: &str,
        classroom_id: &str,
        title: &str,
        description: &str,
        url: &str,
    ) -> Result<Posted<LinkPost>> {
        let link = LinkPost {
            title: required("title", title)?,
            description: description.trim().to_string(),
            url: valid_url("url", url)?,
            created_by: String::new(),
        };
        let created_by = self.authorize(uid, Access::Teacher, "post links").await?;
        let path = self.collection(classroom_id, LINKS).await?;
        let posted = self.insert(&path, LinkPost { created_by, ..link }).await?;
        info!("Link {} posted in {}", posted.id, classroom_id.trim());
        Ok(posted)
    }

    /// Links, newest first.
    pub async fn list_links(&self, classroom_id: &str) -> Result<Vec<Posted<LinkPost>>> {
        let mut links = self.load_in(classroom_id, LINKS).await?;
        newest_first(&mut links);
        Ok(links)
    }

    pub async fn delete_link(&self, uid: &str, classroom_id: &str, id: &str) -> Result<()> {
        self.authorize(uid, Access::Teacher, "delete links").await?;
        self.remove(classroom_id, LINKS, id).await
    }

    // ===== Assignments =====

    /// Add an assignment. Any signed-in member may add one.
    /// `due_date` is `YYYY-MM-DD`.
    pub async fn add_assignment(
        &self,
        uid: &str,
        classroom_id: &str,
        title: &str,
        description: &str,
        due_date: &str,
        link: Option<&str>,
    ) -> Result<Posted<Assignment>> {
        let title = required("title", title)?;
        let due_date = NaiveDate::parse_from_str(&required("due date", due_date)?, "%Y-%m-%d")
            .map_err(|e| ClassroomError::Validation(format!("due date must be YYYY-MM-DD: {}", e)))?;
        let link = match link.map(str::trim).filter(|l| !l.is_empty()) {
            Some(l) => valid_url("link", l)?,
            None => String::new(),
        };

        let created_by = self.authorize(uid, Access::Member, "add assignments").await?;
        let path = self.collection(classroom_id, ASSIGNMENTS).await?;
        let assignment = Assignment {
            title,
            description: description.trim().to_string(),
            due_date,
            link,
            created_by,
        };
        let posted = self.insert(&path, assignment).await?;
        info!("Assignment {} due {} added in {}", posted.id, due_date, classroom_id.trim());
        Ok(posted)
    }

    /// Assignments, earliest due date first.
    pub async fn list_assignments(&self, classroom_id: &str) -> Result<Vec<Posted<Assignment>>> {
        let mut assignments: Vec<Posted<Assignment>> = self.load_in(classroom_id, ASSIGNMENTS).await?;
        assignments.sort_by(|a, b| {
            a.item
                .due_date
                .cmp(&b.item.due_date)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(assignments)
    }

    pub async fn delete_assignment(&self, uid: &str, classroom_id: &str, id: &str) -> Result<()> {
        self.authorize(uid, Access::Member, "delete assignments").await?;
        self.remove(classroom_id, ASSIGNMENTS, id).await
    }

    // ===== Notes =====

    pub async fn add_note_unit(&self, uid: &str, classroom_id: &str, name: &str) -> Result<Posted<NoteUnit>> {
        let name = required("unit name", name)?;
        let created_by = self.authorize(uid, Access::Teacher, "add note units").await?;
        let path = self.collection(classroom_id, NOTES).await?;
        let posted = self.insert(&path, NoteUnit { name, created_by }).await?;
        info!("Note unit {} added in {}", posted.id, classroom_id.trim());
        Ok(posted)
    }

    /// Note units in the order they were added.
    pub async fn list_note_units(&self, classroom_id: &str) -> Result<Vec<Posted<NoteUnit>>> {
        let mut units = self.load_in(classroom_id, NOTES).await?;
        oldest_first(&mut units);
        Ok(units)
    }

    /// Delete a note unit together with all of its resources.
    /// Resources go first, so a failure part-way leaves the unit listed and
    /// the delete can be retried.
    pub async fn delete_note_unit(&self, uid: &str, classroom_id: &str, unit_id: &str) -> Result<()> {
        self.authorize(uid, Access::Teacher, "delete note units").await?;
        let notes = self.collection(classroom_id, NOTES).await?;
        let unit_id = required("unit id", unit_id)?;

        let resources_path = child_path(&notes, &unit_id, NOTE_RESOURCES);
        let resources = self.store.list_children(&notes, &unit_id, NOTE_RESOURCES).await?;
        for doc in &resources {
            self.store.delete_by_id(&resources_path, &doc.id).await?;
        }
        self.store.delete_by_id(&notes, &unit_id).await?;

        info!(
            "Deleted note unit {} and {} resources in {}",
            unit_id,
            resources.len(),
            classroom_id.trim()
        );
        Ok(())
    }

    /// Path of an existing note unit's resources.
    async fn resources_path(&self, classroom_id: &str, unit_id: &str) -> Result<(String, String)> {
        let notes = self.collection(classroom_id, NOTES).await?;
        let unit_id = required("unit id", unit_id)?;
        if self.store.get_by_id(&notes, &unit_id).await?.is_none() {
            return Err(ClassroomError::NotFound(format!("note unit {}", unit_id)));
        }
        Ok((notes, unit_id))
    }

    /// Attach a resource to a note unit. Any signed-in member may add one.
    pub async fn add_note_resource(
        &self,
        uid: &str,
        classroom_id: &str,
        unit_id: &str,
        resource: NoteResource,
    ) -> Result<Posted<NoteResource>> {
        let resource = match resource {
            NoteResource::Link { url } => NoteResource::Link { url: valid_url("url", &url)? },
            NoteResource::Pdf { url } => NoteResource::Pdf { url: valid_url("url", &url)? },
            NoteResource::Image { url } => NoteResource::Image { url: valid_url("url", &url)? },
            NoteResource::Text { text } => NoteResource::Text { text: required("text", &text)? },
        };
        self.authorize(uid, Access::Member, "add note resources").await?;
        let (notes, unit_id) = self.resources_path(classroom_id, unit_id).await?;
        let posted = self
            .insert(&child_path(&notes, &unit_id, NOTE_RESOURCES), resource)
            .await?;
        info!("Resource {} added to note unit {}", posted.id, unit_id);
        Ok(posted)
    }

    /// Resources of a note unit in the order they were added.
    pub async fn list_note_resources(&self, classroom_id: &str, unit_id: &str) -> Result<Vec<Posted<NoteResource>>> {
        let (notes, unit_id) = self.resources_path(classroom_id, unit_id).await?;
        let mut resources = self.load(&notes, &unit_id, NOTE_RESOURCES).await?;
        oldest_first(&mut resources);
        Ok(resources)
    }

    pub async fn delete_note_resource(
        &self,
        uid: &str,
        classroom_id: &str,
        unit_id: &str,
        id: &str,
    ) -> Result<()> {
        self.authorize(uid, Access::Member, "delete note resources").await?;
        let (notes, unit_id) = self.resources_path(classroom_id, unit_id).await?;
        let id = required("id", id)?;
        self.store
            .delete_by_id(&child_path(&notes, &unit_id, NOTE_RESOURCES), &id)
            .await?;
        info!("Deleted resource {} from note unit {}", id, unit_id);
        Ok(())
    }

    // ===== Attendance =====

    /// Create the attendance sheet for one month. A second sheet for the
    /// same month is rejected.
    pub async fn create_attendance_sheet(
        &self,
        uid: &str,
        classroom_id: &str,
        year: i32,
        month: u32,
    ) -> Result<Posted<AttendanceSheet>> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() || !(1..=9999).contains(&year) {
            return Err(ClassroomError::Validation(format!(
                "invalid month {}-{}",
                year, month
            )));
        }
        let created_by = self.authorize(uid, Access::Teacher, "create attendance sheets").await?;
        let path = self.collection(classroom_id, ATTENDANCE).await?;

        let month_key = AttendanceSheet::month_key(year, month);
        let existing = self.store.find_by_field(&path, "monthKey", &month_key).await?;
        if !existing.is_empty() {
            warn!("Attendance sheet {} already exists in {}", month_key, classroom_id.trim());
            return Err(ClassroomError::Conflict(format!(
                "attendance sheet for {} already exists",
                month_key
            )));
        }

        let sheet = AttendanceSheet {
            month,
            year,
            month_key,
            created_by,
            resource_link: String::new(),
        };
        let posted = self.insert(&path, sheet).await?;
        info!("Attendance sheet {} created in {}", posted.item.month_key, classroom_id.trim());
        Ok(posted)
    }

    /// Attendance sheets, most recently created first.
    pub async fn list_attendance_sheets(&self, classroom_id: &str) -> Result<Vec<Posted<AttendanceSheet>>> {
        let mut sheets = self.load_in(classroom_id, ATTENDANCE).await?;
        newest_first(&mut sheets);
        Ok(sheets)
    }

    /// Point a sheet at the document holding that month's attendance.
    pub async fn attach_attendance_resource(
        &self,
        uid: &str,
        classroom_id: &str,
        sheet_id: &str,
        link: &str,
    ) -> Result<()> {
        let link = valid_url("resource link", link)?;
        self.authorize(uid, Access::Teacher, "update attendance sheets").await?;
        let path = self.collection(classroom_id, ATTENDANCE).await?;
        let sheet_id = required("sheet id", sheet_id)?;
        if self.store.get_by_id(&path, &sheet_id).await?.is_none() {
            return Err(ClassroomError::NotFound(format!("attendance sheet {}", sheet_id)));
        }

        let mut fields = serde_json::Map::new();
        fields.insert("resourceLink".to_string(), link.into());
        self.store.upsert(&path, &sheet_id, fields, UpsertMode::Merge).await?;
        info!("Attendance sheet {} now links its resource", sheet_id);
        Ok(())
    }

    pub async fn delete_attendance_sheet(&self, uid: &str, classroom_id: &str, id: &str) -> Result<()> {
        self.authorize(uid, Access::Teacher, "delete attendance sheets").await?;
        self.remove(classroom_id, ATTENDANCE, id).await
    }

    // ===== Roster =====

    /// Set the classroom's admin. A classroom has at most one.
    pub async fn add_admin(&self, uid: &str, classroom_id: &str, name: &str) -> Result<Posted<RosterMember>> {
        let name = required("admin name", name)?;
        self.authorize(uid, Access::Teacher, "manage the roster").await?;
        let path = self.collection(classroom_id, MEMBERS).await?;

        let admins = self.store.find_by_field(&path, "role", "teacher").await?;
        if !admins.is_empty() {
            return Err(ClassroomError::Conflict(
                "classroom already has an admin".to_string(),
            ));
        }

        let member = RosterMember {
            name,
            role: Role::Teacher,
            enroll_no: None,
        };
        self.insert(&path, member).await
    }

    pub async fn add_student(
        &self,
        uid: &str,
        classroom_id: &str,
        name: &str,
        enroll_no: &str,
    ) -> Result<Posted<RosterMember>> {
        let member = RosterMember {
            name: required("student name", name)?,
            role: Role::Student,
            enroll_no: Some(required("enrollment number", enroll_no)?),
        };
        self.authorize(uid, Access::Teacher, "manage the roster").await?;
        let path = self.collection(classroom_id, MEMBERS).await?;
        self.insert(&path, member).await
    }

    /// The admin and the students, each in the order they were added.
    pub async fn roster(&self, classroom_id: &str) -> Result<Roster> {
        let mut members = self.load_in::<RosterMember>(classroom_id, MEMBERS).await?;
        oldest_first(&mut members);

        let mut roster = Roster::default();
        for member in members {
            match member.item.role {
                Role::Teacher if roster.admin.is_none() => roster.admin = Some(member),
                Role::Teacher => warn!("Ignoring extra admin {} in {}", member.id, classroom_id.trim()),
                Role::Student => roster.students.push(member),
            }
        }
        Ok(roster)
    }

    pub async fn remove_member(&self, uid: &str, classroom_id: &str, id: &str) -> Result<()> {
        self.authorize(uid, Access::Teacher, "manage the roster").await?;
        self.remove(classroom_id, MEMBERS, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{Duration, Utc};

    fn posted(id: &str, offset_secs: i64) -> Posted<()> {
        Posted {
            id: id.to_string(),
            created_at: Utc::now() + Duration::seconds(offset_secs),
            item: (),
        }
    }

    #[test]
    fn test_valid_url() {
        assert_eq!(valid_url("url", " https://x.example/a ").unwrap(), "https://x.example/a");
        assert!(matches!(valid_url("url", "not a url"), Err(ClassroomError::Validation(_))));
        assert!(matches!(valid_url("url", ""), Err(ClassroomError::Validation(_))));
    }

    #[test]
    fn test_sort_orders() {
        let mut items = vec![posted("b", 0), posted("a", 10), posted("c", -10)];
        newest_first(&mut items);
        let ids: Vec<_> = items.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        oldest_first(&mut items);
        let ids: Vec<_> = items.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_unknown_user_cannot_write() {
        let content = ContentService::new(Arc::new(MemoryStore::new()));
        let err = content.authorize("ghost", Access::Member, "add assignments").await.unwrap_err();
        assert!(matches!(err, ClassroomError::NotFound(_)));
    }
}
