use anyhow::Result;
use clap::Parser;
use searchcore::input::load_stopwords;
use searchcore::persist::OutputPaths;
use searchcore::pipeline::{prepare, IndexSource};
use searchcore::{EngineConfig, StopWords};
use shell::{Command, Outcome, Shell, HELP};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "shell")]
#[command(about = "Run a query log through the cache, rank the co-relevance graph and explore the result")]
struct Args {
    /// Corpus file or directory to index
    #[arg(long, conflicts_with = "index", required_unless_present = "index")]
    corpus: Option<PathBuf>,
    /// Prebuilt index directory
    #[arg(long)]
    index: Option<PathBuf>,
    /// Stopword file, one word per line
    #[arg(long)]
    stopwords: Option<PathBuf>,
    /// Use the built-in English stopwords when no file is given
    #[arg(long, default_value_t = false)]
    default_stopwords: bool,
    /// Query log, one query per line
    #[arg(long)]
    queries: PathBuf,
    /// Directory for ResultQueries.txt, ListaAdyacencia.txt and the JSON snapshots
    #[arg(long, default_value = ".")]
    output: PathBuf,
    /// JSON engine configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the cache capacity
    #[arg(long)]
    cache_capacity: Option<usize>,
    /// Override the PageRank iteration count
    #[arg(long)]
    iterations: Option<usize>,
    /// Override the PageRank damping factor
    #[arg(long)]
    damping: Option<f64>,
    /// Read commands from stdin after the batch pass
    #[arg(long, default_value_t = false)]
    interactive: bool,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(c) = args.cache_capacity { config.cache_capacity = c; }
    if let Some(i) = args.iterations { config.pagerank.iterations = i; }
    if let Some(d) = args.damping { config.pagerank.damping = d; }
    config.validate()?;

    let stopwords = match &args.stopwords {
        Some(p) => load_stopwords(p),
        None if args.default_stopwords => StopWords::english(),
        None => StopWords::empty(),
    };
    let source = match (args.corpus, args.index) {
        (Some(corpus), _) => IndexSource::Corpus(corpus),
        (None, Some(index)) => IndexSource::Saved(index),
        (None, None) => anyhow::bail!("either --corpus or --index is required"),
    };

    let outputs = OutputPaths::new(&args.output);
    let prepared = prepare(&source, stopwords, &config, Some(args.queries.as_path()), &outputs)?;
    println!(
        "Graph: {} nodes, {} edges. PageRank over {} documents ({} iterations).",
        prepared.graph.node_count(),
        prepared.graph.edge_count(),
        prepared.pagerank.len(),
        prepared.pagerank.iterations()
    );

    if args.interactive {
        repl(Shell::new(prepared))?;
    }
    Ok(())
}

fn repl(mut shell: Shell) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    print!("{HELP}");
    loop {
        print!("> ");
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match shell.execute(Command::parse(&line)) {
            Outcome::Continue(text) => print!("{text}"),
            Outcome::Quit => break,
        }
    }
    tracing::info!(stats = ?shell.session().stats(), "leaving shell");
    Ok(())
}
