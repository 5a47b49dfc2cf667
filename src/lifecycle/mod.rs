mod actor;
mod status;
mod vuln;

pub use actor::{can_delete, can_edit, Actor, Role};
pub use status::{legal_actions, legal_transitions, LegalAction, LifecycleError, Status};
pub use vuln::Vulnerability;
