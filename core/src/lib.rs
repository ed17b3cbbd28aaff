//! Inverted-index search with a recency-bounded result cache and a
//! co-relevance graph ranked by PageRank.

pub mod config;
pub mod graph;
pub mod index;
pub mod input;
pub mod lru;
pub mod pagerank;
pub mod persist;
pub mod pipeline;
pub mod query;
pub mod session;
pub mod stats;
pub mod tokenizer;

pub use config::EngineConfig;
pub use graph::{CoRelevanceGraph, TOP_K};
pub use index::{DocId, IndexBuilder, InvertedIndex, Posting, Weighting};
pub use lru::LruCache;
pub use pagerank::{PageRank, PageRankConfig};
pub use query::{Answer, AnswerKind, QueryProcessor, ScoredDoc};
pub use session::{CacheEntry, CacheSnapshot, ReplyOrigin, SearchReply, SearchSession};
pub use stats::CacheStats;
pub use tokenizer::{StopWords, Tokenizer};
