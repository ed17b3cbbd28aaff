use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

/// Number of leading query results that take part in co-relevance edges.
pub const TOP_K: usize = 10;

#[derive(Debug, Default, Clone)]
struct Adjacency {
    edges: Vec<(String, u32)>,
    slot: HashMap<String, usize>,
}

impl Adjacency {
    fn bump(&mut self, to: &str) {
        match self.slot.get(to) {
            Some(&i) => self.edges[i].1 += 1,
            None => {
                self.slot.insert(to.to_string(), self.edges.len());
                self.edges.push((to.to_string(), 1));
            }
        }
    }
}

/// Undirected weighted graph over document identifiers. Every edge is stored
/// as two half-edges that are always updated together. Nodes are kept in
/// identifier order; neighbors in the order their edge was first created.
#[derive(Debug, Default, Clone)]
pub struct CoRelevanceGraph {
    adj: BTreeMap<String, Adjacency>,
}

impl CoRelevanceGraph {
    pub fn new() -> Self { Self::default() }

    /// Ensure `node` exists, with no edges if it is new.
    pub fn add_node(&mut self, node: &str) {
        if !self.adj.contains_key(node) {
            self.adj.insert(node.to_string(), Adjacency::default());
        }
    }

    pub fn add_undirected_edge(&mut self, a: &str, b: &str) {
        if a == b {
            return;
        }
        self.half_edge(a, b);
        self.half_edge(b, a);
    }

    fn half_edge(&mut self, from: &str, to: &str) {
        if let Some(adj) = self.adj.get_mut(from) {
            adj.bump(to);
        } else {
            let mut adj = Adjacency::default();
            adj.bump(to);
            self.adj.insert(from.to_string(), adj);
        }
    }

    /// Link every pair among the first [`TOP_K`] documents of one query.
    pub fn build_from_top_results<S: AsRef<str>>(&mut self, top_docs: &[S]) {
        let top = &top_docs[..top_docs.len().min(TOP_K)];
        for i in 0..top.len() {
            for j in (i + 1)..top.len() {
                self.add_undirected_edge(top[i].as_ref(), top[j].as_ref());
            }
        }
    }

    pub fn neighbors(&self, node: &str) -> &[(String, u32)] {
        self.adj.get(node).map(|a| a.edges.as_slice()).unwrap_or(&[])
    }

    pub fn contains(&self, node: &str) -> bool { self.adj.contains_key(node) }

    pub fn weight(&self, a: &str, b: &str) -> Option<u32> {
        let adj = self.adj.get(a)?;
        adj.slot.get(b).map(|&i| adj.edges[i].1)
    }

    pub fn out_degree(&self, node: &str) -> usize { self.neighbors(node).len() }

    pub fn node_count(&self) -> usize { self.adj.len() }

    /// Undirected edges, i.e. half-edges divided by two.
    pub fn edge_count(&self) -> usize {
        self.adj.values().map(|a| a.edges.len()).sum::<usize>() / 2
    }

    /// Node identifiers in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.adj.keys().map(String::as_str)
    }

    /// Adjacency listing, one line per node, every outgoing half-edge spelled out.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for (node, adj) in &self.adj {
            let _ = write!(out, "[{node}] -> ");
            for (to, w) in &adj.edges {
                let _ = write!(out, "[{to}~> peso: {w}] ");
            }
            out.push('\n');
        }
        out
    }
}
