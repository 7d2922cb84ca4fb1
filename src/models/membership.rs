/// Membership model.
/// A student's record of a joined classroom, keyed by the normalized join code.

use super::{ClassroomDetails, ClassroomRecord};
use crate::error::{ClassroomError, Result};
use crate::store::{to_fields, Document, Fields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Join code, trimmed and upper-cased before any lookup or storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JoinCode(String);

impl JoinCode {
    pub fn normalize(raw: &str) -> Result<Self> {
        Self::try_normalize(raw)
            .ok_or_else(|| ClassroomError::Validation("class code is required".to_string()))
    }

    /// Like `normalize`, but an empty code is `None` rather than an error.
    pub fn try_normalize(raw: &str) -> Option<Self> {
        let code = raw.trim().to_uppercase();
        if code.is_empty() {
            None
        } else {
            Some(JoinCode(code))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JoinCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for JoinCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize an optional share link: trimmed, URL-decoded, empty means absent.
/// A link that fails to decode is kept as entered.
pub fn normalize_link(raw: Option<&str>) -> Option<String> {
    let trimmed = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match urlencoding::decode(trimmed) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(e) => {
            log::debug!("Keeping undecodable link as entered: {}", e);
            Some(trimmed.to_string())
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MembershipRecord {
    /// Document id; equal to the code for records written by this crate.
    #[serde(skip)]
    pub id: String,
    pub code: String,
    pub link: String,
    #[serde(flatten)]
    pub details: ClassroomDetails,
    pub classroom_id: String,
    pub joined_at: Option<DateTime<Utc>>,
}

impl MembershipRecord {
    /// Snapshot of the classroom's descriptive fields at join time.
    pub fn snapshot(code: &JoinCode, classroom: &ClassroomRecord, joined_at: DateTime<Utc>) -> Self {
        MembershipRecord {
            id: code.to_string(),
            code: code.to_string(),
            link: classroom.share_link.clone(),
            details: classroom.details.clone(),
            classroom_id: classroom.id.clone(),
            joined_at: Some(joined_at),
        }
    }

    pub fn from_document(doc: &Document) -> Result<Self> {
        let mut record: MembershipRecord = doc.decode()?;
        record.id = doc.id.clone();
        Ok(record)
    }

    pub fn to_fields(&self) -> Result<Fields> {
        to_fields(self)
    }

    /// The code this membership is keyed under: the stored code, or the
    /// document id for records that lost their code field.
    pub fn join_code(&self) -> Option<JoinCode> {
        JoinCode::try_normalize(&self.code).or_else(|| JoinCode::try_normalize(&self.id))
    }
}

/// Code and link pulled out of an invite URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invite {
    pub code: Option<String>,
    pub link: Option<String>,
}

impl Invite {
    /// Accepts either a share link (`{origin}/join/{code}`) or a join page
    /// URL carrying `?code=..&link=..` query parameters.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let url = Url::parse(raw)
            .map_err(|e| ClassroomError::Validation(format!("invalid invite link: {}", e)))?;

        let mut invite = Invite::default();
        for (key, value) in url.query_pairs() {
            match &*key {
                "code" if !value.trim().is_empty() => invite.code = Some(value.trim().to_string()),
                "link" => invite.link = normalize_link(Some(&*value)),
                _ => {}
            }
        }

        if invite.code.is_none() && invite.link.is_none() {
            let segments: Vec<&str> = url
                .path_segments()
                .map(|s| s.filter(|seg| !seg.is_empty()).collect())
                .unwrap_or_default();
            if let [.., "join", code] = segments.as_slice() {
                invite.code = Some(code.to_string());
                invite.link = Some(raw.to_string());
            }
        }

        if invite.code.is_none() && invite.link.is_none() {
            return Err(ClassroomError::Validation(
                "invite link carries no class code".to_string(),
            ));
        }
        Ok(invite)
    }
}
