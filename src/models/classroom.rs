/// Classroom model.
/// The authoritative, teacher-owned record students join by code.

use super::required;
use crate::error::Result;
use crate::store::{to_fields, Document, Fields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Descriptive fields shared by classrooms and membership snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassroomDetails {
    pub subject: String,
    pub professor_name: String,
    pub college_name: String,
    pub degree: String,
    pub semester: String,
}

impl ClassroomDetails {
    pub fn new(
        subject: impl Into<String>,
        professor_name: impl Into<String>,
        college_name: impl Into<String>,
        degree: impl Into<String>,
        semester: impl Into<String>,
    ) -> Self {
        ClassroomDetails {
            subject: subject.into(),
            professor_name: professor_name.into(),
            college_name: college_name.into(),
            degree: degree.into(),
            semester: semester.into(),
        }
    }

    /// Trimmed copy; every field must be non-empty.
    pub fn validated(&self) -> Result<Self> {
        Ok(ClassroomDetails {
            subject: required("subject", &self.subject)?,
            professor_name: required("professorName", &self.professor_name)?,
            college_name: required("collegeName", &self.college_name)?,
            degree: required("degree", &self.degree)?,
            semester: required("semester", &self.semester)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassroomRecord {
    /// Document id, assigned at creation.
    #[serde(skip)]
    pub id: String,
    #[serde(default)]
    pub class_code: String,
    #[serde(default)]
    pub share_link: String,
    #[serde(flatten)]
    pub details: ClassroomDetails,
    #[serde(default)]
    pub created_by: String,
    /// Taken from the document, not the field map.
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

impl ClassroomRecord {
    pub fn from_document(doc: &Document) -> Result<Self> {
        let mut record: ClassroomRecord = doc.decode()?;
        record.id = doc.id.clone();
        record.created_at = doc.created_at;
        Ok(record)
    }

    pub fn to_fields(&self) -> Result<Fields> {
        to_fields(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validated_trims_fields() {
        let details = ClassroomDetails::new(" Physics ", "Dr. Rao", "IIT", "BSc", " 5 ");
        let clean = details.validated().unwrap();
        assert_eq!(clean.subject, "Physics");
        assert_eq!(clean.semester, "5");
    }

    #[test]
    fn test_validated_rejects_missing_field() {
        let details = ClassroomDetails::new("Physics", "", "IIT", "BSc", "5");
        assert!(details.validated().is_err());
    }

    #[test]
    fn test_record_from_document() {
        let created_at = Utc::now();
        let doc = Document {
            id: "T1".to_string(),
            fields: to_fields(&json!({
                "classCode": "XQ7F2K",
                "shareLink": "https://s/join/XQ7F2K",
                "subject": "Physics",
                "professorName": "Dr. Rao",
                "createdBy": "teacher-1",
                "students": [],
            }))
            .unwrap(),
            created_at,
        };

        let record = ClassroomRecord::from_document(&doc).unwrap();
        assert_eq!(record.id, "T1");
        assert_eq!(record.class_code, "XQ7F2K");
        assert_eq!(record.details.subject, "Physics");
        assert_eq!(record.details.degree, "");
        assert_eq!(record.created_at, created_at);
    }

    #[test]
    fn test_fields_use_camel_case_and_skip_id() {
        let record = ClassroomRecord {
            id: "T1".to_string(),
            class_code: "XQ7F2K".to_string(),
            share_link: "https://s/join/XQ7F2K".to_string(),
            details: ClassroomDetails::new("Physics", "Dr. Rao", "IIT", "BSc", "5"),
            created_by: "teacher-1".to_string(),
            created_at: Utc::now(),
        };
        let fields = record.to_fields().unwrap();
        assert_eq!(fields.get("classCode"), Some(&json!("XQ7F2K")));
        assert_eq!(fields.get("professorName"), Some(&json!("Dr. Rao")));
        assert!(fields.get("id").is_none());
        assert!(fields.get("createdAt").is_none());
    }
}
