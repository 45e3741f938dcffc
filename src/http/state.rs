use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::session::TranscriptionSession;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Live transcription sessions (session_id → handle)
    pub sessions: Arc<RwLock<HashMap<String, Arc<TranscriptionSession>>>>,

    /// Service configuration, used to wire collaborators per session
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config: Arc::new(config),
        }
    }
}
