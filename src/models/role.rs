/// Role model for signed-in users.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Teacher => f.write_str("teacher"),
            Role::Student => f.write_str("student"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// A role chosen before sign-in, handed to the session exactly once.
/// Not `Clone`; `SessionService::sign_in` takes it by value.
#[derive(Debug, PartialEq, Eq)]
pub struct RoleIntent(Role);

impl RoleIntent {
    pub fn new(role: Role) -> Self {
        RoleIntent(role)
    }

    pub fn into_role(self) -> Role {
        self.0
    }
}

/// Stored sign-in record under `users/{uid}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_and_display() {
        assert_eq!("Teacher".parse::<Role>().unwrap(), Role::Teacher);
        assert_eq!(" student ".parse::<Role>().unwrap(), Role::Student);
        assert!("admin".parse::<Role>().is_err());
        assert_eq!(Role::Teacher.to_string(), "teacher");
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::Student).unwrap();
        assert_eq!(json, "\"student\"");
    }

    #[test]
    fn test_intent_consumed_into_role() {
        let intent = RoleIntent::new(Role::Teacher);
        assert_eq!(intent.into_role(), Role::Teacher);
    }

    #[test]
    fn test_user_record_skips_missing_fields() {
        let record = UserRecord {
            email: None,
            role: Some(Role::Teacher),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"role": "teacher"}));
    }
}
