// Built-in lexicon-driven annotator
//
// This is a deterministic stand-in for a platform NLP tagger: a word-level
// tokenizer plus lookup tables and shape rules. It trades recall for
// predictability, which is what the annotation pipeline and its tests need.

use std::collections::HashSet;

use super::annotator::{Annotation, LexicalAnnotator, TagKind};

/// Proper nouns recognized as people
const PERSONS: &[&str] = &[
    "alice", "anna", "bob", "carol", "dave", "david", "emma", "grace", "henry", "james", "john",
    "linda", "lucy", "mary", "michael", "peter", "robert", "sarah", "susan", "tom",
];

/// Proper nouns recognized as places
const PLACES: &[&str] = &[
    "america", "amsterdam", "asia", "athens", "berlin", "boston", "cairo", "chicago", "denver",
    "dublin", "europe", "france", "germany", "ireland", "italy", "japan", "lisbon", "london",
    "madrid", "norway", "oslo", "paris", "prague", "rome", "seattle", "spain", "sydney", "tokyo",
    "toronto", "vienna",
];

/// Proper nouns recognized as organizations
const ORGANIZATIONS: &[&str] = &[
    "acme", "airbus", "amazon", "apple", "boeing", "fifa", "google", "ibm", "interpol",
    "microsoft", "mozilla", "nasa", "nato", "nokia", "siemens", "spotify", "toyota", "uefa",
    "unesco", "unicef",
];

const ADJECTIVES: &[&str] = &[
    "bad", "beautiful", "big", "bright", "clean", "cold", "dark", "dirty", "easy", "fast",
    "good", "great", "happy", "hard", "high", "large", "long", "loud", "low", "new", "nice",
    "old", "poor", "quick", "quiet", "rich", "sad", "short", "slow", "small", "warm", "young",
];

/// Adverbs that do not carry the `-ly` suffix
const ADVERBS: &[&str] = &[
    "again", "almost", "already", "always", "never", "often", "once", "sometimes", "soon",
    "still", "together", "twice",
];

/// Nouns the `-ly` suffix rule would otherwise misread as adverbs
const NOUNS: &[&str] = &[
    "assembly", "belly", "bully", "butterfly", "family", "firefly", "jelly", "lily", "rally",
    "tally",
];

/// Closed-class words that never produce an annotation
const FUNCTION_WORDS: &[&str] = &[
    "a", "about", "above", "after", "against", "am", "an", "and", "are", "as", "at", "be",
    "because", "been", "before", "being", "below", "between", "but", "by", "can", "could",
    "did", "do", "does", "don't", "down", "during", "for", "from", "had", "has", "have", "he",
    "her", "here", "him", "his", "how", "i", "i'm", "if", "in", "into", "is", "it", "it's",
    "its", "may", "me", "might", "must", "my", "no", "nor", "not", "of", "off", "on", "or",
    "our", "over", "shall", "she", "should", "so", "than", "that", "that's", "the", "their",
    "them", "then", "there", "these", "they", "this", "those", "through", "to", "too", "under",
    "until", "up", "us", "very", "was", "we", "were", "what", "when", "where", "which", "while",
    "who", "whom", "why", "will", "with", "would", "yes", "yet", "you", "your",
];

/// High-frequency verbs, skipped rather than misfiled as nouns
const COMMON_VERBS: &[&str] = &[
    "ask", "asked", "asks", "became", "become", "began", "begin", "begins", "believe",
    "believed", "bring", "brings", "brought", "call", "called", "calls", "came", "come",
    "comes", "coming", "feel", "feels", "felt", "find", "finds", "found", "gave", "get",
    "gets", "give", "gives", "go", "goes", "going", "gone", "got", "hear", "heard", "hears",
    "help", "helped", "helps", "keep", "keeps", "kept", "knew", "know", "knows", "launch",
    "launched", "launches", "leave", "leaves", "left", "let", "lets", "live", "lived", "lives",
    "look", "looked", "looks", "made", "make", "makes", "mean", "means", "meant", "need",
    "needed", "needs", "play", "played", "plays", "put", "puts", "ran", "run", "runs", "said",
    "saw", "say", "says", "see", "seem", "seemed", "seems", "seen", "show", "showed", "shows",
    "speak", "spoke", "start", "started", "starts", "take", "takes", "talk", "talked", "talks",
    "tell", "tells", "think", "thinks", "thought", "told", "took", "tried", "tries", "try",
    "turn", "turned", "turns", "use", "used", "uses", "visit", "visited", "visits", "want",
    "wanted", "wants", "went", "work", "worked", "works",
];

/// Lexicon-backed word tagger
///
/// Classification order per token: number shape, skip list (function words
/// and common verbs), person/place/organization gazetteers, adjective and
/// adverb lexicons, the `-ly` adverb rule, then the noun fallback for
/// remaining content words. Lookups are case-insensitive.
pub struct LexiconAnnotator {
    persons: HashSet<String>,
    places: HashSet<String>,
    organizations: HashSet<String>,
    adjectives: HashSet<String>,
    adverbs: HashSet<String>,
    nouns: HashSet<String>,
    skip: HashSet<String>,
}

impl LexiconAnnotator {
    pub fn new() -> Self {
        let to_set = |words: &[&str]| words.iter().map(|w| w.to_string()).collect::<HashSet<_>>();

        let mut skip = to_set(FUNCTION_WORDS);
        skip.extend(COMMON_VERBS.iter().map(|w| w.to_string()));

        Self {
            persons: to_set(PERSONS),
            places: to_set(PLACES),
            organizations: to_set(ORGANIZATIONS),
            adjectives: to_set(ADJECTIVES),
            adverbs: to_set(ADVERBS),
            nouns: to_set(NOUNS),
            skip,
        }
    }

    /// Extend a lexicon with caller-supplied terms (case-insensitive)
    ///
    /// `Number` has no lexicon; it is recognized by token shape alone, and
    /// extension entries for it are ignored.
    pub fn with_terms(mut self, kind: TagKind, terms: &[&str]) -> Self {
        let set = match kind {
            TagKind::Person => &mut self.persons,
            TagKind::Place => &mut self.places,
            TagKind::Organization => &mut self.organizations,
            TagKind::Adjective => &mut self.adjectives,
            TagKind::Adverb => &mut self.adverbs,
            TagKind::Noun => &mut self.nouns,
            TagKind::Number => return self,
        };

        set.extend(terms.iter().map(|t| t.to_lowercase()));
        self
    }

    fn classify(&self, token: &str) -> Option<TagKind> {
        if looks_like_number(token) {
            return Some(TagKind::Number);
        }

        let lower = token.to_lowercase();

        if self.skip.contains(&lower) {
            return None;
        }
        if self.persons.contains(&lower) {
            return Some(TagKind::Person);
        }
        if self.places.contains(&lower) {
            return Some(TagKind::Place);
        }
        if self.organizations.contains(&lower) {
            return Some(TagKind::Organization);
        }
        if self.adjectives.contains(&lower) {
            return Some(TagKind::Adjective);
        }
        if self.adverbs.contains(&lower) {
            return Some(TagKind::Adverb);
        }
        if lower.ends_with("ly") && lower.len() > 3 && !self.nouns.contains(&lower) {
            return Some(TagKind::Adverb);
        }

        // Remaining content words read as nouns, the common case for
        // out-of-lexicon vocabulary in running speech
        Some(TagKind::Noun)
    }
}

impl Default for LexiconAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalAnnotator for LexiconAnnotator {
    fn annotate(&self, text: &str) -> Vec<Annotation> {
        tokens(text)
            .into_iter()
            .filter_map(|token| self.classify(token).map(|kind| Annotation::new(kind, token)))
            .collect()
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}

/// Split text into word-level tokens, left to right
///
/// A token is a run of alphanumeric characters; apostrophes join letters
/// ("don't") and `.`/`,` join digits ("3.5", "1,000"). Everything else is a
/// separator and is never part of a token.
fn tokens(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (start, c) = chars[i];

        if !c.is_alphanumeric() {
            i += 1;
            continue;
        }

        let mut end = i;
        while end + 1 < chars.len() {
            let (_, cur) = chars[end];
            let (_, next) = chars[end + 1];

            let joins = next.is_alphanumeric()
                || (next == '\''
                    && cur.is_alphabetic()
                    && matches!(chars.get(end + 2), Some(&(_, after)) if after.is_alphabetic()))
                || ((next == '.' || next == ',')
                    && cur.is_ascii_digit()
                    && matches!(chars.get(end + 2), Some(&(_, after)) if after.is_ascii_digit()));

            if !joins {
                break;
            }
            end += 1;
        }

        let end_byte = chars[end].0 + chars[end].1.len_utf8();
        tokens.push(&text[start..end_byte]);
        i = end + 1;
    }

    tokens
}

fn looks_like_number(token: &str) -> bool {
    let mut saw_digit = false;

    for c in token.chars() {
        if c.is_ascii_digit() {
            saw_digit = true;
        } else if c != '.' && c != ',' {
            return false;
        }
    }

    saw_digit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_split_on_punctuation() {
        assert_eq!(tokens("Hello, world!"), vec!["Hello", "world"]);
        assert_eq!(tokens("one  two\tthree"), vec!["one", "two", "three"]);
        assert_eq!(tokens(""), Vec::<&str>::new());
        assert_eq!(tokens("!!! ???"), Vec::<&str>::new());
    }

    #[test]
    fn test_tokens_keep_contractions_and_decimals() {
        assert_eq!(tokens("don't stop"), vec!["don't", "stop"]);
        assert_eq!(tokens("3.5 stars, 1,000 fans"), vec!["3.5", "stars", "1,000", "fans"]);
        // A trailing period is a sentence boundary, not part of the token
        assert_eq!(tokens("the end."), vec!["the", "end"]);
    }

    #[test]
    fn test_classify_number_shapes() {
        assert!(looks_like_number("42"));
        assert!(looks_like_number("3.5"));
        assert!(looks_like_number("1,000"));
        assert!(!looks_like_number("4th"));
        assert!(!looks_like_number("..."));
    }

    #[test]
    fn test_classify_precedence() {
        let annotator = LexiconAnnotator::new();

        assert_eq!(annotator.classify("Paris"), Some(TagKind::Place));
        assert_eq!(annotator.classify("nice"), Some(TagKind::Adjective));
        assert_eq!(annotator.classify("is"), None);
        assert_eq!(annotator.classify("quickly"), Some(TagKind::Adverb));
        // `-ly` exceptions stay nouns
        assert_eq!(annotator.classify("family"), Some(TagKind::Noun));
        // Italy hits the place gazetteer before the `-ly` rule
        assert_eq!(annotator.classify("Italy"), Some(TagKind::Place));
        assert_eq!(annotator.classify("rooftop"), Some(TagKind::Noun));
    }
}
