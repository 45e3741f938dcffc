use serde::{Deserialize, Serialize};

/// Lexical category of a tagged span
///
/// Only these categories are ever reported; tokens outside them
/// (punctuation, function words, verbs, ...) are omitted from results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    Person,
    Place,
    Organization,
    Adjective,
    Adverb,
    Number,
    Noun,
}

/// A tagged span of transcript text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Lexical category of the span
    pub kind: TagKind,
    /// The matched substring, exactly as it appears in the source text
    pub text: String,
}

impl Annotation {
    pub fn new(kind: TagKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Word-level lexical tagger
///
/// Given a text snapshot, produces annotations for the recognized word-level
/// tokens, in left-to-right text order. The pass is O(text length) and is
/// re-run from scratch over the full text on every call; there is no
/// incremental mode.
pub trait LexicalAnnotator: Send + Sync {
    /// Tag a text snapshot
    fn annotate(&self, text: &str) -> Vec<Annotation>;

    /// Get annotator name for logging
    fn name(&self) -> &str;
}
