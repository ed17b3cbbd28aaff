//! PageRank over the co-relevance graph.
//!
//! Ranks are updated Jacobi-style: each iteration reads only the previous
//! vector. Nodes without edges spread their damped mass evenly over every node.
//! By default exactly `iterations` rounds run and the result is whatever the
//! vector is then; it is not guaranteed to be a stationary distribution.

use crate::graph::CoRelevanceGraph;
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRankConfig {
    pub damping: f64,
    pub iterations: usize,
    /// Opt-in early exit: stop once the L1 change of an iteration falls below
    /// this value. `None` always runs the full iteration budget.
    pub tolerance: Option<f64>,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self { damping: 0.85, iterations: 100, tolerance: None }
    }
}

impl PageRankConfig {
    /// Damping must lie strictly between 0 and 1; anything else makes the
    /// iteration diverge or ignore the graph.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.damping > 0.0 && self.damping < 1.0,
            "pagerank damping must be in (0, 1), got {}",
            self.damping
        );
        if let Some(tol) = self.tolerance {
            ensure!(tol.is_finite() && tol >= 0.0, "pagerank tolerance must be a non-negative number, got {tol}");
        }
        Ok(())
    }
}

/// Immutable snapshot of the computed scores.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageRank {
    scores: BTreeMap<String, f64>,
    iterations: usize,
}

impl PageRank {
    pub fn compute(graph: &CoRelevanceGraph, config: &PageRankConfig) -> Self {
        let nodes: Vec<&str> = graph.nodes().collect();
        let n = nodes.len();
        if n == 0 {
            return Self::default();
        }

        let index: HashMap<&str, usize> = nodes.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        let out: Vec<Vec<usize>> = nodes
            .iter()
            .map(|&id| graph.neighbors(id).iter().filter_map(|(to, _)| index.get(to.as_str()).copied()).collect())
            .collect();

        let d = config.damping;
        let nf = n as f64;
        let mut rank = vec![1.0 / nf; n];
        let mut next = vec![0.0; n];
        let mut iterations = 0;

        for _ in 0..config.iterations {
            // Dangling mass goes to every node, so fold it into the base term.
            let dangling: f64 = (0..n).filter(|&u| out[u].is_empty()).map(|u| rank[u]).sum();
            let base = (1.0 - d) / nf + d * dangling / nf;
            next.iter_mut().for_each(|v| *v = base);
            for u in 0..n {
                let deg = out[u].len();
                if deg == 0 {
                    continue;
                }
                let share = d * rank[u] / deg as f64;
                for &v in &out[u] {
                    next[v] += share;
                }
            }
            std::mem::swap(&mut rank, &mut next);
            iterations += 1;

            if let Some(tol) = config.tolerance {
                let delta: f64 = rank.iter().zip(&next).map(|(a, b)| (a - b).abs()).sum();
                if delta < tol {
                    break;
                }
            }
        }

        let scores = nodes.into_iter().map(String::from).zip(rank).collect();
        Self { scores, iterations }
    }

    pub fn score(&self, id: &str) -> Option<f64> { self.scores.get(id).copied() }

    /// 1-based position: one plus the number of documents scoring strictly higher.
    pub fn position(&self, id: &str) -> Option<usize> {
        let s = self.score(id)?;
        Some(1 + self.scores.values().filter(|&&v| v > s).count())
    }

    /// Highest scores first, ties by identifier.
    pub fn top(&self, n: usize) -> Vec<(&str, f64)> {
        let mut all: Vec<(&str, f64)> = self.scores.iter().map(|(k, &v)| (k.as_str(), v)).collect();
        all.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(b.0)));
        all.truncate(n);
        all
    }

    pub fn max(&self) -> Option<(&str, f64)> { self.top(1).into_iter().next() }

    pub fn min(&self) -> Option<(&str, f64)> {
        self.scores
            .iter()
            .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(Ordering::Equal))
            .map(|(k, &v)| (k.as_str(), v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.scores.iter().map(|(k, &v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize { self.scores.len() }

    pub fn is_empty(&self) -> bool { self.scores.is_empty() }

    /// Iterations actually run.
    pub fn iterations(&self) -> usize { self.iterations }

    pub fn total(&self) -> f64 { self.scores.values().sum() }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn fixed(iterations: usize) -> PageRankConfig {
        PageRankConfig { iterations, ..PageRankConfig::default() }
    }

    #[test]
    fn empty_graph_has_no_scores() {
        let pr = PageRank::compute(&CoRelevanceGraph::new(), &PageRankConfig::default());
        assert!(pr.is_empty());
        assert_eq!(pr.max(), None);
    }

    #[test]
    fn zero_iterations_is_uniform() {
        let mut g = CoRelevanceGraph::new();
        g.build_from_top_results(&["a", "b", "c"]);
        g.add_undirected_edge("c", "d");
        let pr = PageRank::compute(&g, &fixed(0));
        for (_, s) in pr.iter() {
            assert!((s - 0.25).abs() < EPS);
        }
    }

    #[test]
    fn one_iteration_on_star() {
        let mut g = CoRelevanceGraph::new();
        g.add_undirected_edge("hub", "x");
        g.add_undirected_edge("hub", "y");
        let pr = PageRank::compute(&g, &fixed(1));
        let third = 1.0 / 3.0;
        let base = 0.15 / 3.0;
        // hub receives everything from x and y, each leaf half of hub.
        assert!((pr.score("hub").unwrap() - (base + 0.85 * 2.0 * third)).abs() < EPS);
        assert!((pr.score("x").unwrap() - (base + 0.85 * third / 2.0)).abs() < EPS);
        assert_eq!(pr.position("hub"), Some(1));
        assert_eq!(pr.position("x"), Some(2));
        assert_eq!(pr.position("y"), Some(2));
    }

    #[test]
    fn dangling_node_spreads_mass_to_everyone() {
        let mut g = CoRelevanceGraph::new();
        g.add_undirected_edge("a", "b");
        g.add_node("c");
        let pr = PageRank::compute(&g, &fixed(1));
        let r = 1.0 / 3.0;
        let base = 0.15 / 3.0;
        let from_c = 0.85 * r / 3.0;
        assert!((pr.score("a").unwrap() - (base + 0.85 * r + from_c)).abs() < EPS);
        assert!((pr.score("c").unwrap() - (base + from_c)).abs() < EPS);
        assert!((pr.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn mass_is_conserved_without_dangling_nodes() {
        let mut g = CoRelevanceGraph::new();
        g.build_from_top_results(&["a", "b", "c"]);
        g.build_from_top_results(&["c", "d"]);
        g.build_from_top_results(&["e", "f"]);
        for iterations in [1, 2, 7, 50] {
            let pr = PageRank::compute(&g, &fixed(iterations));
            assert!((pr.total() - 1.0).abs() < 1e-9, "iterations={iterations}");
        }
    }

    #[test]
    fn tolerance_stops_early() {
        let mut g = CoRelevanceGraph::new();
        g.build_from_top_results(&["a", "b", "c"]);
        let cfg = PageRankConfig { tolerance: Some(1e-6), ..PageRankConfig::default() };
        let pr = PageRank::compute(&g, &cfg);
        // A symmetric triangle is already stationary after the first round.
        assert_eq!(pr.iterations(), 1);
        assert_eq!(PageRank::compute(&g, &PageRankConfig::default()).iterations(), 100);
    }

    #[test]
    fn damping_outside_unit_interval_is_invalid() {
        for damping in [1.7, 0.0, 1.0, -0.2, f64::NAN] {
            let cfg = PageRankConfig { damping, ..PageRankConfig::default() };
            assert!(cfg.validate().is_err(), "damping={damping}");
        }
        assert!(PageRankConfig::default().validate().is_ok());
        assert!(PageRankConfig { tolerance: Some(-1.0), ..PageRankConfig::default() }.validate().is_err());
    }

    #[test]
    fn top_breaks_ties_by_identifier() {
        let mut g = CoRelevanceGraph::new();
        g.add_undirected_edge("b", "a");
        let pr = PageRank::compute(&g, &fixed(3));
        let top: Vec<&str> = pr.top(5).into_iter().map(|(id, _)| id).collect();
        assert_eq!(top, vec!["a", "b"]);
    }
}
