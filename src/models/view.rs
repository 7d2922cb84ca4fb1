/// Merged, read-only projection of a membership against its classroom.

use super::{non_empty_or, ClassroomRecord, MembershipRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassroomView {
    /// Navigation target: the live classroom id when it exists.
    pub id: String,
    pub subject: String,
    pub professor_name: String,
    pub college_name: String,
    pub degree: String,
    pub semester: String,
    pub link: Option<String>,
    pub code: Option<String>,
    pub classroom_id: String,
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl ClassroomView {
    /// Live classroom fields win over the membership's cached snapshot,
    /// field by field. The cached link is only used when the classroom has none.
    pub fn merged(membership: &MembershipRecord, classroom: &ClassroomRecord) -> Self {
        let live = &classroom.details;
        let cached = &membership.details;

        ClassroomView {
            id: classroom.id.clone(),
            subject: non_empty_or(&live.subject, &cached.subject),
            professor_name: non_empty_or(&live.professor_name, &cached.professor_name),
            college_name: non_empty_or(&live.college_name, &cached.college_name),
            degree: non_empty_or(&live.degree, &cached.degree),
            semester: non_empty_or(&live.semester, &cached.semester),
            link: optional(&non_empty_or(&classroom.share_link, &membership.link)),
            code: membership.join_code().map(|c| c.to_string()),
            classroom_id: classroom.id.clone(),
        }
    }

    /// Fallback when the classroom is gone or could not be reached.
    pub fn cached(membership: &MembershipRecord) -> Self {
        let cached = &membership.details;
        let subject = if cached.subject.is_empty() {
            format!("Class {}", membership.id)
        } else {
            cached.subject.clone()
        };

        ClassroomView {
            id: non_empty_or(&membership.classroom_id, &membership.id),
            subject,
            professor_name: cached.professor_name.clone(),
            college_name: cached.college_name.clone(),
            degree: cached.degree.clone(),
            semester: cached.semester.clone(),
            link: optional(&membership.link),
            code: membership.join_code().map(|c| c.to_string()),
            classroom_id: membership.classroom_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClassroomDetails;
    use chrono::Utc;

    fn membership() -> MembershipRecord {
        MembershipRecord {
            id: "XQ7F2K".to_string(),
            code: "XQ7F2K".to_string(),
            link: "https://old/XQ7F2K".to_string(),
            details: ClassroomDetails::new("Old Physics", "Dr. Old", "Old College", "BSc", "4"),
            classroom_id: "T0".to_string(),
            joined_at: None,
        }
    }

    fn classroom(share_link: &str) -> ClassroomRecord {
        ClassroomRecord {
            id: "T1".to_string(),
            class_code: "XQ7F2K".to_string(),
            share_link: share_link.to_string(),
            details: ClassroomDetails::new("Physics", "Dr. Rao", "", "BSc", "5"),
            created_by: "teacher-1".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_merged_prefers_live_fields() {
        let view = ClassroomView::merged(&membership(), &classroom("https://s/XQ7F2K"));
        assert_eq!(view.id, "T1");
        assert_eq!(view.classroom_id, "T1");
        assert_eq!(view.subject, "Physics");
        assert_eq!(view.professor_name, "Dr. Rao");
        assert_eq!(view.semester, "5");
        assert_eq!(view.link.as_deref(), Some("https://s/XQ7F2K"));
        assert_eq!(view.code.as_deref(), Some("XQ7F2K"));
    }

    #[test]
    fn test_merged_falls_back_per_field() {
        let view = ClassroomView::merged(&membership(), &classroom(""));
        assert_eq!(view.college_name, "Old College");
        assert_eq!(view.link.as_deref(), Some("https://old/XQ7F2K"));
    }

    #[test]
    fn test_cached_uses_snapshot() {
        let view = ClassroomView::cached(&membership());
        assert_eq!(view.id, "T0");
        assert_eq!(view.subject, "Old Physics");
        assert_eq!(view.link.as_deref(), Some("https://old/XQ7F2K"));
    }

    #[test]
    fn test_cached_display_name_default() {
        let bare = MembershipRecord {
            id: "ABC123".to_string(),
            code: "ABC123".to_string(),
            ..Default::default()
        };
        let view = ClassroomView::cached(&bare);
        assert_eq!(view.subject, "Class ABC123");
        assert_eq!(view.id, "ABC123");
        assert_eq!(view.link, None);
    }
}
