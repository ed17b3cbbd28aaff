use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Marker that closes a URL fragment inside a corpus record.
pub const URL_MARKER: &str = "||";

lazy_static! {
    static ref ENGLISH: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Set of lowercased words excluded from both indexing and querying.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn empty() -> Self { Self::default() }

    /// Built-in English list, for hosts that run without a stopword file.
    pub fn english() -> Self {
        Self { words: ENGLISH.iter().map(|w| w.to_string()).collect() }
    }

    pub fn insert(&mut self, word: &str) {
        let word = word.trim();
        if !word.is_empty() {
            self.words.insert(word.to_lowercase());
        }
    }

    pub fn contains(&self, term: &str) -> bool { self.words.contains(term) }

    pub fn len(&self) -> usize { self.words.len() }

    pub fn is_empty(&self) -> bool { self.words.is_empty() }
}

impl<S: AsRef<str>> FromIterator<S> for StopWords {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = StopWords::empty();
        for word in iter {
            set.insert(word.as_ref());
        }
        set
    }
}

/// Lowercasing, whitespace-splitting, stopword-filtering normalizer shared by
/// ingestion and querying.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    stopwords: StopWords,
}

impl Tokenizer {
    pub fn new(stopwords: StopWords) -> Self { Self { stopwords } }

    pub fn stopwords(&self) -> &StopWords { &self.stopwords }

    /// Normalize a single content token; `None` when it is a stopword.
    pub fn normalize(&self, token: &str) -> Option<String> {
        let term = token.to_lowercase();
        if term.is_empty() || self.stopwords.contains(&term) {
            return None;
        }
        Some(term)
    }

    /// Terms of a query in order of appearance, duplicates kept.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace().filter_map(|t| self.normalize(t)).collect()
    }
}

/// A record token: either a piece of the document identifier or content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordToken<'a> {
    UrlFragment(&'a str),
    Content(&'a str),
}

/// Classify the whitespace tokens of one corpus record.
pub fn record_tokens(line: &str) -> impl Iterator<Item = RecordToken<'_>> {
    line.split_whitespace().map(|tok| {
        if tok.ends_with(URL_MARKER) {
            RecordToken::UrlFragment(tok)
        } else {
            RecordToken::Content(tok)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let tok = Tokenizer::new(["the"].into_iter().collect());
        assert_eq!(tok.tokenize("The Dog  WALKS the dog"), vec!["dog", "walks", "dog"]);
    }

    #[test]
    fn marker_alone_is_a_fragment() {
        let kinds: Vec<_> = record_tokens("|| a||b x|").collect();
        assert_eq!(
            kinds,
            vec![RecordToken::UrlFragment("||"), RecordToken::Content("a||b"), RecordToken::Content("x|")]
        );
    }
}
