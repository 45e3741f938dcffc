pub mod backend;
pub mod messages;
pub mod nats;

pub use backend::{BackendStream, TranscriptionBackend, TranscriptUpdate};
pub use messages::{AudioFrameMessage, TranscriptMessage};
pub use nats::{NatsBackend, NatsBackendConfig};
