// Application state module
// Immutable per-process state shared by every connection task

use super::types::Config;
use crate::handler::Responder;

/// Application state
pub struct AppState {
    pub config: Config,
    pub responder: Responder,
}

impl AppState {
    /// Build the state once at startup; nothing in it changes afterwards
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            responder: Responder::from_config(config),
        }
    }
}
