use crate::tokenizer::{record_tokens, RecordToken, StopWords, Tokenizer};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub type DocId = String;

/// How a posting's frequency is filled in during ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    /// Frequency stays at 1: a posting only records that the term occurs.
    #[default]
    Presence,
    /// Frequency counts every occurrence of the term in the document.
    TermFrequency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub frequency: u32,
}

/// Term -> postings, in the order documents were ingested. Read-only once built.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InvertedIndex {
    pub postings: HashMap<String, Vec<Posting>>,
    /// Distinct document identifiers in first-seen order.
    pub docs: Vec<DocId>,
    /// Stopwords the index was built with; queries must drop the same set.
    pub stopwords: StopWords,
    pub weighting: Weighting,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Build from corpus records with the default presence weighting.
    pub fn build<I, S>(tokenizer: &Tokenizer, records: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = IndexBuilder::new(tokenizer, Weighting::Presence);
        for record in records {
            builder.add_record(record.as_ref());
        }
        builder.finish()
    }

    pub fn lookup(&self, term: &str) -> &[Posting] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn num_terms(&self) -> usize { self.postings.len() }

    pub fn num_docs(&self) -> usize { self.docs.len() }

    pub fn contains_term(&self, term: &str) -> bool { self.postings.contains_key(term) }

    /// Query normalizer matching the one used at ingestion.
    pub fn tokenizer(&self) -> Tokenizer { Tokenizer::new(self.stopwords.clone()) }
}

/// Accumulates records into an [`InvertedIndex`].
pub struct IndexBuilder<'t> {
    tokenizer: &'t Tokenizer,
    weighting: Weighting,
    index: InvertedIndex,
    // term -> doc -> position of its posting in `index.postings[term]`
    slots: HashMap<String, HashMap<DocId, usize>>,
    seen_docs: HashSet<DocId>,
    skipped_tokens: usize,
}

impl<'t> IndexBuilder<'t> {
    pub fn new(tokenizer: &'t Tokenizer, weighting: Weighting) -> Self {
        let index = InvertedIndex { stopwords: tokenizer.stopwords().clone(), weighting, ..InvertedIndex::new() };
        Self {
            tokenizer,
            weighting,
            index,
            slots: HashMap::new(),
            seen_docs: HashSet::new(),
            skipped_tokens: 0,
        }
    }

    /// Ingest one record. URL fragments extend the identifier; content tokens go
    /// to whatever identifier has been accumulated so far on this record.
    pub fn add_record(&mut self, line: &str) {
        let mut url = String::new();
        for token in record_tokens(line) {
            match token {
                RecordToken::UrlFragment(fragment) => url.push_str(fragment),
                RecordToken::Content(_) if url.is_empty() => self.skipped_tokens += 1,
                RecordToken::Content(word) => {
                    if let Some(term) = self.tokenizer.normalize(word) {
                        self.add_posting(term, &url);
                    }
                }
            }
        }
    }

    fn add_posting(&mut self, term: String, doc: &str) {
        if !self.seen_docs.contains(doc) {
            self.seen_docs.insert(doc.to_string());
            self.index.docs.push(doc.to_string());
        }
        let list = self.index.postings.entry(term.clone()).or_default();
        let slots = self.slots.entry(term).or_default();
        match slots.get(doc) {
            Some(&pos) => {
                if self.weighting == Weighting::TermFrequency {
                    list[pos].frequency += 1;
                }
            }
            None => {
                slots.insert(doc.to_string(), list.len());
                list.push(Posting { doc_id: doc.to_string(), frequency: 1 });
            }
        }
    }

    pub fn finish(self) -> InvertedIndex {
        if self.skipped_tokens > 0 {
            tracing::warn!(skipped = self.skipped_tokens, "content tokens without a document identifier were skipped");
        }
        tracing::info!(num_docs = self.index.num_docs(), num_terms = self.index.num_terms(), "inverted index built");
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::StopWords;

    fn tokenizer(stop: &[&str]) -> Tokenizer {
        Tokenizer::new(stop.iter().copied().collect::<StopWords>())
    }

    #[test]
    fn url_fragments_concatenate_into_identifier() {
        let index = InvertedIndex::build(&tokenizer(&[]), ["http:|| example.com|| news"]);
        assert_eq!(index.lookup("news")[0].doc_id, "http:||example.com||");
    }

    #[test]
    fn content_before_any_fragment_is_skipped() {
        let index = InvertedIndex::build(&tokenizer(&[]), ["orphan a|| kept"]);
        assert!(index.lookup("orphan").is_empty());
        assert_eq!(index.lookup("kept").len(), 1);
    }

    #[test]
    fn late_fragment_extends_identifier_for_following_content() {
        let index = InvertedIndex::build(&tokenizer(&[]), ["a|| one b|| two"]);
        assert_eq!(index.lookup("one")[0].doc_id, "a||");
        assert_eq!(index.lookup("two")[0].doc_id, "a||b||");
    }

    #[test]
    fn presence_weighting_keeps_frequency_at_one() {
        let index = InvertedIndex::build(&tokenizer(&[]), ["d|| dog dog Dog"]);
        assert_eq!(index.lookup("dog"), &[Posting { doc_id: "d||".into(), frequency: 1 }]);
    }

    #[test]
    fn term_frequency_weighting_counts_occurrences() {
        let tok = tokenizer(&[]);
        let mut builder = IndexBuilder::new(&tok, Weighting::TermFrequency);
        builder.add_record("d|| dog dog Dog");
        let index = builder.finish();
        assert_eq!(index.lookup("dog")[0].frequency, 3);
    }

    #[test]
    fn postings_keep_insertion_order() {
        let index = InvertedIndex::build(&tokenizer(&[]), ["z|| x", "a|| x", "m|| x"]);
        let ids: Vec<_> = index.lookup("x").iter().map(|p| p.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["z||", "a||", "m||"]);
        assert_eq!(index.docs, vec!["z||", "a||", "m||"]);
    }

    #[test]
    fn index_remembers_its_normalizer() {
        let tok = tokenizer(&["the"]);
        let mut builder = IndexBuilder::new(&tok, Weighting::TermFrequency);
        builder.add_record("a|| the dog");
        let index = builder.finish();
        assert_eq!(index.weighting, Weighting::TermFrequency);
        assert!(index.stopwords.contains("the"));
        assert!(index.tokenizer().tokenize("The").is_empty());
    }
}
