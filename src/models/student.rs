/// Student profile model.
/// Written with merge semantics whenever the student joins a classroom.

use super::required;
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentProfile {
    pub name: String,
    #[serde(rename = "enrollment")]
    pub enrollment_number: String,
    /// Free-text classroom and section, as the student typed it.
    #[serde(rename = "classroom")]
    pub classroom_label: String,
    pub semester: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl StudentProfile {
    pub fn new(
        name: impl Into<String>,
        enrollment_number: impl Into<String>,
        classroom_label: impl Into<String>,
        semester: impl Into<String>,
    ) -> Self {
        StudentProfile {
            name: name.into(),
            enrollment_number: enrollment_number.into(),
            classroom_label: classroom_label.into(),
            semester: semester.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Trimmed copy; name, enrollment, classroom and semester are required.
    pub fn validated(&self) -> Result<Self> {
        Ok(StudentProfile {
            name: required("name", &self.name)?,
            enrollment_number: required("enrollment number", &self.enrollment_number)?,
            classroom_label: required("classroom", &self.classroom_label)?,
            semester: required("semester", &self.semester)?,
            email: self
                .email
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string),
        })
    }
}
