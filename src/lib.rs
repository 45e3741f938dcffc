pub mod annotate;
pub mod audio;
pub mod auth;
pub mod config;
pub mod http;
pub mod session;
pub mod stt;

pub use annotate::{Annotation, LexicalAnnotator, LexiconAnnotator, TagKind};
pub use audio::{AudioFrame, AudioSource, PushHandle, PushSource, SourceConfig, WavSource};
pub use auth::{AuthorizationDecision, AuthorizationState, PermissionProvider, StaticPermissions};
pub use config::Config;
pub use http::{create_router, AppState};
pub use session::{
    SessionConfig, SessionSnapshot, SessionStatus, StartError, TranscriptionSession,
};
pub use stt::{
    AudioFrameMessage, BackendStream, NatsBackend, NatsBackendConfig, TranscriptMessage,
    TranscriptUpdate, TranscriptionBackend,
};
