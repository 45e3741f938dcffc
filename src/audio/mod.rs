pub mod source;
pub mod wav;

pub use source::{AudioFrame, AudioSource, PushHandle, PushSource, SourceConfig};
pub use wav::WavSource;
