//! Line-oriented command surface over a prepared search run.

use searchcore::pipeline::Prepared;
use searchcore::{CoRelevanceGraph, PageRank, ReplyOrigin, SearchSession};
use std::fmt::Write as _;

pub const DEFAULT_TOP: usize = 10;
const GRAPH_LISTING_LIMIT: usize = 10;
const CACHE_PREVIEW_LINES: usize = 3;
const SHOW_CACHE_PREVIEW_LINES: usize = 2;

pub const HELP: &str = "\
Available commands:
  graph <id>          - show the co-relevance neighbors of a document
  pagerank <id>       - show the PageRank of a document
  cache <query>       - check whether a query is cached (no promotion)
  search <query>      - run a query through the cache (text after the
                        first space is the cache key, verbatim)
  top-pagerank <n>    - show the top N documents by PageRank
  show-cache          - list every cached query, most recent first
  clear-cache         - empty the cache and reset its counters
  stats               - show graph, ranking and cache statistics
  quit                - leave the shell
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Graph(String),
    PageRank(String),
    Cache(String),
    Search(String),
    TopPageRank(String),
    ShowCache,
    ClearCache,
    Stats,
    Quit,
    Unknown(String),
}

impl Command {
    /// First word selects the command. Query arguments keep everything after
    /// the single separating space, so they match the cache key verbatim;
    /// identifiers and counts are trimmed.
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\n', '\r']).trim_start();
        let (action, raw) = match line.split_once(char::is_whitespace) {
            Some((action, rest)) => (action, rest),
            None => (line, ""),
        };
        let trimmed = raw.trim().to_string();
        match action {
            "graph" => Command::Graph(trimmed),
            "pagerank" => Command::PageRank(trimmed),
            "cache" => Command::Cache(raw.to_string()),
            "search" => Command::Search(raw.to_string()),
            "top-pagerank" => Command::TopPageRank(trimmed),
            "show-cache" => Command::ShowCache,
            "clear-cache" => Command::ClearCache,
            "stats" => Command::Stats,
            "quit" | "exit" => Command::Quit,
            _ => Command::Unknown(action.to_string()),
        }
    }
}

pub enum Outcome {
    Continue(String),
    Quit,
}

pub struct Shell {
    session: SearchSession,
    graph: CoRelevanceGraph,
    pagerank: PageRank,
}

impl Shell {
    pub fn new(prepared: Prepared) -> Self {
        Self { session: prepared.session, graph: prepared.graph, pagerank: prepared.pagerank }
    }

    pub fn session(&self) -> &SearchSession { &self.session }

    pub fn execute(&mut self, command: Command) -> Outcome {
        let text = match command {
            Command::Quit => return Outcome::Quit,
            Command::Graph(id) => self.graph_cmd(&id),
            Command::PageRank(id) => self.pagerank_cmd(&id),
            Command::Cache(q) => self.cache_cmd(&q),
            Command::Search(q) => self.search_cmd(&q),
            Command::TopPageRank(arg) => self.top_cmd(&arg),
            Command::ShowCache => self.show_cache_cmd(),
            Command::ClearCache => self.clear_cmd(),
            Command::Stats => self.stats_cmd(),
            Command::Unknown(action) => format!("Unknown command '{action}'. Use 'quit' to leave.\n{HELP}"),
        };
        Outcome::Continue(text)
    }

    fn graph_cmd(&self, id: &str) -> String {
        if id.is_empty() {
            return "Specify a document. Example: graph <id>\n".to_string();
        }
        if !self.graph.contains(id) {
            return format!("Document '{id}' not found in the graph\n");
        }
        let neighbors = self.graph.neighbors(id);
        let mut out = format!("Document '{id}' found in the graph\nConnections ({} related documents):\n", neighbors.len());
        for (i, (to, w)) in neighbors.iter().take(GRAPH_LISTING_LIMIT).enumerate() {
            let _ = writeln!(out, "  {}. {} (weight: {})", i + 1, to, w);
        }
        if neighbors.len() > GRAPH_LISTING_LIMIT {
            let _ = writeln!(out, "  ... and {} more", neighbors.len() - GRAPH_LISTING_LIMIT);
        }
        out
    }

    fn pagerank_cmd(&self, id: &str) -> String {
        if id.is_empty() {
            return "Specify a document. Example: pagerank <id>\n".to_string();
        }
        match (self.pagerank.score(id), self.pagerank.position(id)) {
            (Some(score), Some(pos)) => format!(
                "PageRank of '{id}': {score}\nRank: #{pos} of {} documents\n",
                self.pagerank.len()
            ),
            _ => format!("Document '{id}' has no PageRank\n"),
        }
    }

    fn cache_cmd(&self, query: &str) -> String {
        if query.trim().is_empty() {
            return "Specify a query. Example: cache <query>\n".to_string();
        }
        match self.session.peek(query) {
            Some(result) => format!("Query '{query}' is cached\nCached result:\n{}", preview(result, CACHE_PREVIEW_LINES, "  ")),
            None => format!("Query '{query}' is not cached\n"),
        }
    }

    fn search_cmd(&mut self, query: &str) -> String {
        if query.trim().is_empty() {
            return "Specify a query. Example: search government policy\n".to_string();
        }
        let reply = self.session.search(query);
        let banner = match reply.origin {
            ReplyOrigin::Hit => "[CACHE HIT] Result found in cache:",
            ReplyOrigin::Stored => "[CACHE MISS] Result computed and cached:",
            ReplyOrigin::Uncached => "[CACHE MISS] Result computed (not cached - no results):",
        };
        format!("Searching: '{query}'\n{banner}\n{}", reply.text)
    }

    fn top_cmd(&self, arg: &str) -> String {
        let mut out = String::new();
        let n = if arg.is_empty() {
            DEFAULT_TOP
        } else {
            arg.parse::<usize>().unwrap_or_else(|_| {
                let _ = writeln!(out, "Invalid number. Using {DEFAULT_TOP} by default.");
                DEFAULT_TOP
            })
        };
        let _ = writeln!(out, "Top {n} documents by PageRank:");
        for (i, (id, score)) in self.pagerank.top(n).into_iter().enumerate() {
            let _ = writeln!(out, "  {}. {} - {}", i + 1, score, id);
        }
        out
    }

    fn show_cache_cmd(&mut self) -> String {
        let mut out = format!(
            "Cache contents: {}/{} entries\n",
            self.session.cache_len(),
            self.session.cache_capacity()
        );
        let entries = self.session.cache_entries();
        if entries.is_empty() {
            out.push_str("  The cache is empty\n");
            return out;
        }
        for (i, entry) in entries.iter().enumerate() {
            let _ = writeln!(out, "  [{}] Query: \"{}\"", i + 1, entry.query);
            out.push_str("      Result:\n");
            out.push_str(&preview(&entry.result, SHOW_CACHE_PREVIEW_LINES, "        "));
        }
        out
    }

    fn clear_cmd(&mut self) -> String {
        let removed = self.session.clear_cache();
        format!(
            "Cache and statistics cleared\n  Entries removed: {removed}\n  Current state: {}/{} entries\n",
            self.session.cache_len(),
            self.session.cache_capacity()
        )
    }

    fn stats_cmd(&self) -> String {
        let s = self.session.stats();
        let mut out = String::from("System statistics:\n");
        let _ = writeln!(out, "  -> Graph nodes: {}", self.graph.node_count());
        let _ = writeln!(out, "  -> Graph edges: {}", self.graph.edge_count());
        let _ = writeln!(out, "  -> Documents with PageRank: {}", self.pagerank.len());
        out.push_str("\n  === CACHE METRICS ===\n");
        let _ = writeln!(out, "  -> Total queries: {}", s.total_queries);
        let _ = writeln!(out, "  -> Hits: {}", s.hits);
        let _ = writeln!(out, "  -> Misses: {}", s.misses);
        let _ = writeln!(out, "  -> Hit rate: {:.2}%", s.hit_rate());
        let _ = writeln!(out, "  -> Miss rate: {:.2}%", s.miss_rate());
        let _ = writeln!(out, "  -> Evictions: {}", s.evictions);
        let _ = writeln!(out, "  -> Insertions: {}", s.insertions);
        let _ = writeln!(
            out,
            "  -> Entries in cache: {}/{}",
            self.session.cache_len(),
            self.session.cache_capacity()
        );
        if let (Some((max_id, max)), Some((min_id, min))) = (self.pagerank.max(), self.pagerank.min()) {
            let _ = writeln!(out, "\n  -> Max PageRank: {max} ({max_id})");
            let _ = writeln!(out, "  -> Min PageRank: {min} ({min_id})");
        }
        out
    }
}

/// First `limit` lines, indented, with an ellipsis if anything was cut.
fn preview(text: &str, limit: usize, indent: &str) -> String {
    let mut out = String::new();
    for line in text.lines().take(limit) {
        let _ = writeln!(out, "{indent}{line}");
    }
    if text.lines().count() > limit {
        let _ = writeln!(out, "{indent}...");
    }
    out
}
