pub mod annotator;
pub mod lexicon;

pub use annotator::{Annotation, LexicalAnnotator, TagKind};
pub use lexicon::LexiconAnnotator;
