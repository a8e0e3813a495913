//! The stages of a bug-fixing session
//!
//! Each stage is split in three steps so the UI thread never blocks:
//! a synchronous `prepare` that validates session state and builds the
//! request (no network), an async `run` against the [`BackendClient`], and
//! a synchronous `record` that folds the outcome back into the [`Session`].
//!
//! [`BackendClient`]: crate::api::BackendClient
//! [`Session`]: crate::session::Session

pub mod apply;
pub mod commit;
pub mod dispatch;
pub mod intake;
pub mod validate;
pub mod viewer;

/// How a failure is surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// Error line in the pane that triggered the action
    Inline,
    /// Modal alert that must be dismissed
    Blocking,
}
