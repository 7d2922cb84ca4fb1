/// Class content models.
/// Notices, links, assignments, note units and their resources, monthly
/// attendance sheets and the member roster posted inside a classroom.

use super::Role;
use crate::error::Result;
use crate::store::Document;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A stored content item with its document id and server creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct Posted<T> {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub item: T,
}

impl<T: DeserializeOwned> Posted<T> {
    pub fn from_document(doc: &Document) -> Result<Self> {
        Ok(Posted {
            id: doc.id.clone(),
            created_at: doc.created_at,
            item: doc.decode()?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub created_by: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkPost {
    pub title: String,
    pub description: String,
    pub url: String,
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Stored as `YYYY-MM-DD`.
    pub due_date: NaiveDate,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub created_by: String,
}

/// A named group of note resources, e.g. one syllabus unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoteUnit {
    pub name: String,
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NoteResource {
    Link { url: String },
    Text { text: String },
    Pdf { url: String },
    Image { url: String },
}

/// One attendance sheet per calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSheet {
    pub month: u32,
    pub year: i32,
    pub month_key: String,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub resource_link: String,
}

impl AttendanceSheet {
    /// `YYYY-MM`
    pub fn month_key(year: i32, month: u32) -> String {
        format!("{:04}-{:02}", year, month)
    }

    /// First day of the sheet's month; `None` for an out-of-range month.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterMember {
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enroll_no: Option<String>,
}

/// Classroom members split into the admin and the students.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    pub admin: Option<Posted<RosterMember>>,
    pub students: Vec<Posted<RosterMember>>,
}
