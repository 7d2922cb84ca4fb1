/// Data models for the classroom client.
/// Defines classroom, membership, student, role and class content records
/// and the merged view.

pub mod classroom;
pub mod content;
pub mod membership;
pub mod role;
pub mod student;
pub mod view;

pub use classroom::{ClassroomDetails, ClassroomRecord};
pub use content::{
    Assignment, AttendanceSheet, LinkPost, NoteResource, NoteUnit, Notice, Posted, Roster, RosterMember,
};
pub use membership::{normalize_link, Invite, JoinCode, MembershipRecord};
pub use role::{Role, RoleIntent, UserRecord};
pub use student::StudentProfile;
pub use view::ClassroomView;

use crate::error::{ClassroomError, Result};

/// Trim a caller-supplied field and reject it when nothing is left.
pub(crate) fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClassroomError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Prefer `primary` unless it is empty.
pub(crate) fn non_empty_or(primary: &str, fallback: &str) -> String {
    if primary.is_empty() {
        fallback.to_string()
    } else {
        primary.to_string()
    }
}
