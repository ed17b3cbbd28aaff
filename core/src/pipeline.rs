//! Whole-run orchestration: index build, query-log pass, PageRank.

use crate::config::EngineConfig;
use crate::graph::CoRelevanceGraph;
use crate::index::{IndexBuilder, InvertedIndex, Weighting};
use crate::input::{read_corpus, read_query_log};
use crate::pagerank::{PageRank, PageRankConfig};
use crate::persist::{load_index, save_adjacency, save_cache, save_pagerank, IndexPaths, OutputPaths};
use crate::query::QueryProcessor;
use crate::session::SearchSession;
use crate::tokenizer::{StopWords, Tokenizer};
use anyhow::Result;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub fn build_index<S: AsRef<str>>(tokenizer: &Tokenizer, records: &[S], weighting: Weighting) -> InvertedIndex {
    let start = Instant::now();
    let mut builder = IndexBuilder::new(tokenizer, weighting);
    for record in records {
        builder.add_record(record.as_ref());
    }
    let index = builder.finish();
    tracing::info!(elapsed_ms = start.elapsed().as_millis() as u64, "index build complete");
    index
}

pub struct BatchReport {
    pub queries: usize,
    pub graph: CoRelevanceGraph,
    pub elapsed: Duration,
}

/// Answer every query in order through the session, write a
/// `Consulta #N: <query>` record per query to `sink`, and link the top
/// documents of each query in a fresh co-relevance graph.
pub fn run_query_log<I, S, W>(session: &mut SearchSession, queries: I, mut sink: W) -> Result<BatchReport>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    W: Write,
{
    let start = Instant::now();
    let mut graph = CoRelevanceGraph::new();
    let mut count = 0;

    for (i, query) in queries.into_iter().enumerate() {
        let query = query.as_ref();
        let reply = session.search(query);
        // Hits carry no ranking, so recompute it for the graph.
        let top = match reply.top_docs {
            Some(top) => top,
            None => session.processor().rank(query).unwrap_or_default(),
        };
        let ids: Vec<&str> = top.iter().map(|d| d.doc_id.as_str()).collect();
        graph.build_from_top_results(&ids);

        write!(sink, "Consulta #{}: {}\n{}\n", i + 1, query, reply.text)?;
        count += 1;
    }
    sink.flush()?;

    let elapsed = start.elapsed();
    let stats = session.stats();
    tracing::info!(
        queries = count,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        hits = stats.hits,
        misses = stats.misses,
        elapsed_ms = elapsed.as_millis() as u64,
        "query log processed"
    );
    Ok(BatchReport { queries: count, graph, elapsed })
}

pub fn rank(graph: &CoRelevanceGraph, config: &PageRankConfig) -> PageRank {
    let start = Instant::now();
    let pr = PageRank::compute(graph, config);
    tracing::info!(
        nodes = pr.len(),
        iterations = pr.iterations(),
        damping = config.damping,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "pagerank computed"
    );
    pr
}

/// Where the index comes from.
#[derive(Debug, Clone)]
pub enum IndexSource {
    /// Build from a corpus file or directory.
    Corpus(PathBuf),
    /// Load a directory written by the indexer.
    Saved(PathBuf),
}

/// Everything a host needs after the batch pass.
pub struct Prepared {
    pub session: SearchSession,
    pub graph: CoRelevanceGraph,
    pub pagerank: PageRank,
}

/// Load or build the index, run the query log (if any) through a fresh
/// session, rank the resulting graph and write the run files into `outputs`.
pub fn prepare(
    source: &IndexSource,
    stopwords: StopWords,
    config: &EngineConfig,
    query_log: Option<&Path>,
    outputs: &OutputPaths,
) -> Result<Prepared> {
    config.validate()?;
    let (index, tokenizer) = match source {
        IndexSource::Corpus(path) => {
            let tokenizer = Tokenizer::new(stopwords);
            (build_index(&tokenizer, &read_corpus(path)?, config.weighting), tokenizer)
        }
        IndexSource::Saved(path) => {
            let index = load_index(&IndexPaths::new(path))?;
            // Queries must be normalized exactly like the stored postings.
            if !stopwords.is_empty() && stopwords != index.stopwords {
                tracing::warn!(
                    given = stopwords.len(),
                    stored = index.stopwords.len(),
                    "ignoring stopwords that differ from the saved index"
                );
            }
            let tokenizer = index.tokenizer();
            (index, tokenizer)
        }
    };
    let processor = QueryProcessor::new(Arc::new(index), Arc::new(tokenizer));
    let mut session = SearchSession::new(processor, config.capacity());

    let Some(log) = query_log else {
        return Ok(Prepared { session, graph: CoRelevanceGraph::new(), pagerank: PageRank::default() });
    };

    let queries = read_query_log(log)?;
    let report = run_query_log(&mut session, &queries, outputs.results_writer()?)?;
    save_adjacency(outputs, &report.graph)?;
    let pagerank = rank(&report.graph, &config.pagerank);
    save_pagerank(outputs, &pagerank)?;
    save_cache(outputs, &session.snapshot())?;
    tracing::info!(output = %outputs.root.display(), "run files written");
    Ok(Prepared { session, graph: report.graph, pagerank })
}
