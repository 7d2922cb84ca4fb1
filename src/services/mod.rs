/// Service layer for the classroom client.
/// Business logic over the document store.

pub mod content;
pub mod reconciler;
pub mod registry;
pub mod session;

pub use content::ContentService;
pub use reconciler::{JoinOutcome, MembershipReconciler};
pub use registry::ClassroomRegistry;
pub use session::SessionService;
