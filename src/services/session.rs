/// Session service.
/// Resolves a signed-in user's role from an optional pre-sign-in intent and
/// the stored `users` record.

use crate::error::{ClassroomError, Result};
use crate::models::{Role, RoleIntent, UserRecord};
use crate::store::{to_fields, DocumentStore, UpsertMode, USERS};
use log::info;
use std::sync::Arc;

#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn DocumentStore>,
}

impl SessionService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        SessionService { store }
    }

    /// Complete a sign-in for `uid`.
    ///
    /// An explicit intent overrides and is written back. Without one the stored
    /// role is used, and a first sign-in defaults to `Student`.
    pub async fn sign_in(&self, uid: &str, email: Option<&str>, intent: Option<RoleIntent>) -> Result<Role> {
        let uid = uid.trim();
        if uid.is_empty() {
            return Err(ClassroomError::Validation("user id is required".to_string()));
        }
        let email = email.map(str::trim).filter(|e| !e.is_empty()).map(str::to_string);

        if let Some(intent) = intent {
            let role = intent.into_role();
            let record = UserRecord { email, role: Some(role) };
            self.store
                .upsert(USERS, uid, to_fields(&record)?, UpsertMode::Merge)
                .await?;
            info!("User {} signed in as {} (chosen)", uid, role);
            return Ok(role);
        }

        if let Some(role) = self.role_of(uid).await? {
            info!("User {} signed in as {}", uid, role);
            return Ok(role);
        }

        let record = UserRecord {
            email,
            role: Some(Role::Student),
        };
        self.store
            .upsert(USERS, uid, to_fields(&record)?, UpsertMode::Merge)
            .await?;
        info!("User {} signed in for the first time as student", uid);
        Ok(Role::Student)
    }

    /// Stored role for `uid`; `None` before the first sign-in.
    pub async fn role_of(&self, uid: &str) -> Result<Option<Role>> {
        match self.store.get_by_id(USERS, uid).await? {
            Some(doc) => Ok(doc.decode::<UserRecord>()?.role),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> (SessionService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (SessionService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_first_sign_in_defaults_to_student() {
        let (session, store) = service();
        let role = session.sign_in("U1", Some("u1@x"), None).await.unwrap();
        assert_eq!(role, Role::Student);

        let doc = store.get_by_id(USERS, "U1").await.unwrap().unwrap();
        assert_eq!(doc.str_field("email"), Some("u1@x"));
        assert_eq!(doc.str_field("role"), Some("student"));
    }

    #[tokio::test]
    async fn test_intent_overrides_stored_role() {
        let (session, _store) = service();
        session.sign_in("U1", Some("u1@x"), None).await.unwrap();

        let role = session
            .sign_in("U1", None, Some(RoleIntent::new(Role::Teacher)))
            .await
            .unwrap();
        assert_eq!(role, Role::Teacher);
        assert_eq!(session.role_of("U1").await.unwrap(), Some(Role::Teacher));
    }

    #[tokio::test]
    async fn test_stored_role_used_without_intent() {
        let (session, store) = service();
        session
            .sign_in("U1", Some("u1@x"), Some(RoleIntent::new(Role::Teacher)))
            .await
            .unwrap();

        let role = session.sign_in("U1", None, None).await.unwrap();
        assert_eq!(role, Role::Teacher);

        // Email from the first sign-in survives the merge writes.
        let doc = store.get_by_id(USERS, "U1").await.unwrap().unwrap();
        assert_eq!(doc.str_field("email"), Some("u1@x"));
    }

    #[tokio::test]
    async fn test_role_of_unknown_user() {
        let (session, _store) = service();
        assert_eq!(session.role_of("nobody").await.unwrap(), None);
        assert!(session.sign_in(" ", None, None).await.is_err());
    }
}
