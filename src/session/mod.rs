pub mod config;
pub mod error;
pub mod session;
pub mod state;

pub use config::SessionConfig;
pub use error::StartError;
pub use session::TranscriptionSession;
pub use state::{SessionSnapshot, SessionStatus};
