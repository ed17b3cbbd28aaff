use anyhow::Result;
use clap::{Parser, Subcommand};
use searchcore::input::{load_stopwords, read_corpus};
use searchcore::persist::{load_index, load_meta, meta_for, save_index, save_meta, IndexPaths};
use searchcore::pipeline::build_index;
use searchcore::{StopWords, Tokenizer, Weighting};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and inspect the inverted index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a corpus file or directory
    Build {
        /// Corpus path (file or directory of record files)
        #[arg(long)]
        input: PathBuf,
        /// Output index directory
        #[arg(long)]
        output: PathBuf,
        /// Stopword file, one word per line
        #[arg(long)]
        stopwords: Option<PathBuf>,
        /// Use the built-in English stopwords when no file is given
        #[arg(long, default_value_t = false)]
        default_stopwords: bool,
        /// Count every occurrence instead of recording presence only
        #[arg(long, default_value_t = false)]
        term_frequency: bool,
    },
    /// Print the postings stored for a term
    Lookup {
        /// Index directory
        #[arg(long, default_value = "./index")]
        index: PathBuf,
        #[arg(long)]
        term: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, stopwords, default_stopwords, term_frequency } => {
            let stopwords = resolve_stopwords(stopwords.as_deref(), default_stopwords);
            let weighting = if term_frequency { Weighting::TermFrequency } else { Weighting::Presence };
            build(&input, &output, stopwords, weighting)
        }
        Commands::Lookup { index, term } => lookup(&index, &term),
    }
}

fn resolve_stopwords(path: Option<&Path>, default_stopwords: bool) -> StopWords {
    match path {
        Some(p) => load_stopwords(p),
        None if default_stopwords => StopWords::english(),
        None => StopWords::empty(),
    }
}

fn build(input: &Path, output: &Path, stopwords: StopWords, weighting: Weighting) -> Result<()> {
    let records = read_corpus(input)?;
    let tokenizer = Tokenizer::new(stopwords);
    let index = build_index(&tokenizer, &records, weighting);

    let paths = IndexPaths::new(output);
    save_index(&paths, &index)?;
    save_meta(&paths, &meta_for(&index))?;
    tracing::info!(output = %output.display(), num_docs = index.num_docs(), num_terms = index.num_terms(), "index written");
    Ok(())
}

fn lookup(dir: &Path, term: &str) -> Result<()> {
    let paths = IndexPaths::new(dir);
    let meta = load_meta(&paths)?;
    let index = load_index(&paths)?;
    let term = term.to_lowercase();
    let postings = index.lookup(&term);
    println!("{} ({} documents indexed {})", term, meta.num_docs, meta.created_at);
    if postings.is_empty() {
        println!("  no postings");
    }
    for p in postings {
        println!("  {} - {}", p.frequency, p.doc_id);
    }
    Ok(())
}
