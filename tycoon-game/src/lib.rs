/// Identity-provider session notifications.
pub mod auth;
/// Player command parsing and dispatch.
pub mod commands;
/// Mapping external identities onto player progress.
pub mod profile;
/// Sale reconciliation between the backend and the local store.
pub mod reconciler;
/// Per-player session state.
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth::{AuthEvent, AuthNotification, IdentitySession};
pub use commands::{COMMANDS, CommandMeta, CommandReply, GameCommand, parse_command};
pub use profile::resolve_user;
pub use reconciler::{ProgressReconciler, SaleOutcome};
pub use session::{GameSession, Tab};
