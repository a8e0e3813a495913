pub mod actions;
pub mod background;
pub mod input;
pub mod messages;
pub mod runtime;

pub use messages::BackgroundMessage;
pub use runtime::run_tui;

use crate::api::BackendClient;
use std::sync::mpsc;

/// Handles every action needs to reach the backend and report back
pub struct RuntimeContext<'a> {
    pub client: &'a BackendClient,
    pub tx: &'a mpsc::Sender<messages::BackgroundMessage>,
}
