use crate::index::Weighting;
use crate::pagerank::PageRankConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::num::NonZeroUsize;
use std::path::Path;

pub const DEFAULT_CACHE_CAPACITY: usize = 50;

/// Tunables shared by every host. Missing JSON fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub cache_capacity: usize,
    pub weighting: Weighting,
    pub pagerank: PageRankConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { cache_capacity: DEFAULT_CACHE_CAPACITY, weighting: Weighting::Presence, pagerank: PageRankConfig::default() }
    }
}

impl EngineConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("opening config {}", path.display()))?;
        let cfg: EngineConfig = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.validate().with_context(|| format!("invalid config {}", path.display()))?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.pagerank.validate()
    }

    /// Capacity clamped to at least one entry.
    pub fn capacity(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.cache_capacity).unwrap_or(NonZeroUsize::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"cache_capacity": 3, "pagerank": {"iterations": 20}}"#).unwrap();
        assert_eq!(cfg.cache_capacity, 3);
        assert_eq!(cfg.pagerank.iterations, 20);
        assert_eq!(cfg.pagerank.damping, 0.85);
        assert_eq!(cfg.weighting, Weighting::Presence);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let cfg = EngineConfig { cache_capacity: 0, ..EngineConfig::default() };
        assert_eq!(cfg.capacity().get(), 1);
    }

    #[test]
    fn loader_rejects_bad_damping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{"pagerank": {"damping": 1.7}}"#).unwrap();
        let err = EngineConfig::from_json_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("damping"));

        std::fs::write(&path, r#"{"pagerank": {"damping": 0.5}}"#).unwrap();
        assert_eq!(EngineConfig::from_json_file(&path).unwrap().pagerank.damping, 0.5);
    }

    #[test]
    fn weighting_uses_snake_case() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"weighting": "term_frequency"}"#).unwrap();
        assert_eq!(cfg.weighting, Weighting::TermFrequency);
    }
}
