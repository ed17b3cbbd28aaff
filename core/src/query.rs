use crate::graph::TOP_K;
use crate::index::{DocId, InvertedIndex};
use crate::tokenizer::Tokenizer;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

pub const NO_VALID_TERMS: &str = "No valid terms in query.\n";
pub const NO_DOCUMENTS: &str = "No documents found for the query terms.\n";
pub const RESULTS_HEADER: &str = "Documents found:\n";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerKind {
    NoValidTerms,
    NoDocuments,
    Ranked,
}

#[derive(Debug, Clone)]
pub struct Answer {
    pub kind: AnswerKind,
    pub text: String,
    pub top_docs: Vec<ScoredDoc>,
}

impl Answer {
    /// Sentinel answers are never stored in the cache.
    pub fn is_cacheable(&self) -> bool { self.kind == AnswerKind::Ranked }

    pub fn top_doc_ids(&self) -> Vec<&str> {
        self.top_docs.iter().map(|d| d.doc_id.as_str()).collect()
    }
}

/// Scores queries against a shared, immutable index.
#[derive(Debug, Clone)]
pub struct QueryProcessor {
    index: Arc<InvertedIndex>,
    tokenizer: Arc<Tokenizer>,
}

impl QueryProcessor {
    pub fn new(index: Arc<InvertedIndex>, tokenizer: Arc<Tokenizer>) -> Self {
        Self { index, tokenizer }
    }

    pub fn index(&self) -> &InvertedIndex { &self.index }

    pub fn tokenizer(&self) -> &Tokenizer { &self.tokenizer }

    /// Top [`TOP_K`] documents by summed posting frequency, ties by identifier.
    /// `None` when no query term survives normalization.
    pub fn rank(&self, raw_query: &str) -> Option<Vec<ScoredDoc>> {
        let terms = self.tokenizer.tokenize(raw_query);
        if terms.is_empty() {
            return None;
        }
        let mut scores: HashMap<&str, u64> = HashMap::new();
        for term in &terms {
            for posting in self.index.lookup(term) {
                let score = scores.entry(posting.doc_id.as_str()).or_insert(0);
                *score = score.saturating_add(u64::from(posting.frequency));
            }
        }
        let mut ranked: Vec<ScoredDoc> = scores
            .into_iter()
            .map(|(doc_id, score)| ScoredDoc { doc_id: doc_id.to_string(), score })
            .collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.doc_id.cmp(&b.doc_id)));
        ranked.truncate(TOP_K);
        Some(ranked)
    }

    pub fn answer(&self, raw_query: &str) -> Answer {
        match self.rank(raw_query) {
            None => Answer { kind: AnswerKind::NoValidTerms, text: NO_VALID_TERMS.to_string(), top_docs: Vec::new() },
            Some(top) if top.is_empty() => Answer { kind: AnswerKind::NoDocuments, text: NO_DOCUMENTS.to_string(), top_docs: top },
            Some(top) => Answer { kind: AnswerKind::Ranked, text: format_listing(&top), top_docs: top },
        }
    }
}

fn format_listing(top: &[ScoredDoc]) -> String {
    let mut out = String::from(RESULTS_HEADER);
    for doc in top {
        let _ = writeln!(out, " - {} - {}", doc.score, doc.doc_id);
    }
    out
}
