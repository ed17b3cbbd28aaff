use crate::graph::CoRelevanceGraph;
use crate::index::InvertedIndex;
use crate::pagerank::PageRank;
use crate::session::CacheSnapshot;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: usize,
    pub num_terms: usize,
    pub created_at: String,
}

/// Layout of a persisted index directory.
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn index(&self) -> PathBuf { self.root.join("index.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

pub fn save_index(paths: &IndexPaths, index: &InvertedIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.index())?;
    let bytes = bincode::serialize(index)?;
    f.write_all(&bytes)?;
    Ok(())
}

pub fn load_index(paths: &IndexPaths) -> Result<InvertedIndex> {
    let file = paths.index();
    let mut f = File::open(&file).with_context(|| format!("opening {}", file.display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let index = bincode::deserialize(&buf)?;
    Ok(index)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

pub fn meta_for(index: &InvertedIndex) -> MetaFile {
    let created_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default();
    MetaFile { num_docs: index.num_docs(), num_terms: index.num_terms(), created_at }
}

/// Files written by a query-log run.
pub struct OutputPaths {
    pub root: PathBuf,
}

impl OutputPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn results(&self) -> PathBuf { self.root.join("ResultQueries.txt") }
    pub fn adjacency(&self) -> PathBuf { self.root.join("ListaAdyacencia.txt") }
    pub fn pagerank(&self) -> PathBuf { self.root.join("pagerank.json") }
    pub fn cache(&self) -> PathBuf { self.root.join("cache.json") }

    /// Buffered writer for the per-query result records.
    pub fn results_writer(&self) -> Result<BufWriter<File>> {
        create_dir_all(&self.root)?;
        let path = self.results();
        let f = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        Ok(BufWriter::new(f))
    }
}

pub fn save_adjacency(paths: &OutputPaths, graph: &CoRelevanceGraph) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.adjacency())?;
    f.write_all(graph.serialize().as_bytes())?;
    Ok(())
}

#[derive(Serialize)]
struct RankedDoc<'a> {
    doc_id: &'a str,
    score: f64,
}

#[derive(Serialize)]
struct PageRankFile<'a> {
    iterations: usize,
    scores: Vec<RankedDoc<'a>>,
}

/// Scores highest first.
pub fn save_pagerank(paths: &OutputPaths, pagerank: &PageRank) -> Result<()> {
    create_dir_all(&paths.root)?;
    let scores = pagerank
        .top(pagerank.len())
        .into_iter()
        .map(|(doc_id, score)| RankedDoc { doc_id, score })
        .collect();
    let file = PageRankFile { iterations: pagerank.iterations(), scores };
    let mut f = File::create(paths.pagerank())?;
    let json = serde_json::to_string_pretty(&file)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn save_cache(paths: &OutputPaths, snapshot: &CacheSnapshot) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.cache())?;
    let json = serde_json::to_string_pretty(snapshot)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}
