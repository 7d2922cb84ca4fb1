/// Classroom Client Library
/// Joins students to teacher-created classrooms by code and reconciles their
/// stored memberships against the live classroom records. Also carries the
/// content posted inside each classroom.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use error::{ClassroomError, Result};
pub use models::{ClassroomRecord, ClassroomView, JoinCode, MembershipRecord, StudentProfile};
pub use services::{
    ClassroomRegistry, ContentService, JoinOutcome, MembershipReconciler, SessionService,
};
pub use store::{DocumentStore, MemoryStore, SqliteStore};
