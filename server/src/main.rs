use anyhow::Result;
use axum::Router;
use clap::Parser;
use searchcore::input::load_stopwords;
use searchcore::persist::OutputPaths;
use searchcore::pipeline::{prepare, IndexSource};
use searchcore::{EngineConfig, StopWords};
use server::{build_app, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Index directory written by the indexer
    #[arg(long, default_value = "./index")]
    index: PathBuf,
    /// Build from this corpus instead of loading --index
    #[arg(long)]
    corpus: Option<PathBuf>,
    /// Stopword file, one word per line
    #[arg(long)]
    stopwords: Option<PathBuf>,
    /// Use the built-in English stopwords when no file is given
    #[arg(long, default_value_t = false)]
    default_stopwords: bool,
    /// Query log replayed at startup to build the co-relevance graph
    #[arg(long)]
    queries: Option<PathBuf>,
    /// Directory for the run files of the startup replay
    #[arg(long, default_value = ".")]
    output: PathBuf,
    /// JSON engine configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    let stopwords = match &args.stopwords {
        Some(p) => load_stopwords(p),
        None if args.default_stopwords => StopWords::english(),
        None => StopWords::empty(),
    };
    let source = match args.corpus {
        Some(corpus) => IndexSource::Corpus(corpus),
        None => IndexSource::Saved(args.index),
    };
    let prepared = prepare(&source, stopwords, &config, args.queries.as_deref(), &OutputPaths::new(&args.output))?;

    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let app: Router = build_app(AppState::new(prepared, admin_token));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
