//! Simple undirected graphs
//!
//! Adjacency is kept in ordered sets so that iteration order, and therefore every random
//! choice made while walking the graph, is reproducible.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Undirected, loop-free graph over `0..node_count()` with optional edge weights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    adjacency: Vec<BTreeSet<usize>>,
    weights: Option<BTreeMap<(usize, usize), u32>>,
    edge_count: usize,
}

fn key(u: usize, v: usize) -> (usize, usize) {
    if u < v {
        (u, v)
    } else {
        (v, u)
    }
}

impl Graph {
    /// Create an edgeless graph on `nodes` vertices
    pub fn new(nodes: usize) -> Self {
        Self {
            adjacency: vec![BTreeSet::new(); nodes],
            weights: None,
            edge_count: 0,
        }
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_weighted(&self) -> bool {
        self.weights.is_some()
    }

    /// Insert edge `{u, v}`. Returns false for self-loops, duplicates and unknown vertices.
    pub fn add_edge(&mut self, u: usize, v: usize) -> bool {
        if u == v || u >= self.node_count() || v >= self.node_count() || self.has_edge(u, v) {
            return false;
        }
        self.adjacency[u].insert(v);
        self.adjacency[v].insert(u);
        self.edge_count += 1;
        true
    }

    /// Remove edge `{u, v}` and its weight, if present
    pub fn remove_edge(&mut self, u: usize, v: usize) -> bool {
        if !self.has_edge(u, v) {
            return false;
        }
        self.adjacency[u].remove(&v);
        self.adjacency[v].remove(&u);
        if let Some(weights) = self.weights.as_mut() {
            weights.remove(&key(u, v));
        }
        self.edge_count -= 1;
        true
    }

    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.adjacency
            .get(u)
            .map(|neighbors| neighbors.contains(&v))
            .unwrap_or(false)
    }

    pub fn degree(&self, u: usize) -> usize {
        self.adjacency.get(u).map(BTreeSet::len).unwrap_or(0)
    }

    pub fn degrees(&self) -> Vec<usize> {
        self.adjacency.iter().map(BTreeSet::len).collect()
    }

    pub fn neighbors(&self, u: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency.get(u).into_iter().flatten().copied()
    }

    /// Every edge once as `(u, v)` with `u < v`, in ascending order
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(u, neighbors)| neighbors.range(u + 1..).map(move |&v| (u, v)))
    }

    /// Attach weights to every edge, replacing any existing ones
    pub fn set_weights(&mut self, weights: BTreeMap<(usize, usize), u32>) {
        self.weights = Some(weights);
    }

    pub fn weight(&self, u: usize, v: usize) -> Option<u32> {
        self.weights.as_ref()?.get(&key(u, v)).copied()
    }

    /// Matrix cell for `(u, v)`: the weight if weighted, else 1 for an edge and 0 otherwise
    pub fn cell(&self, u: usize, v: usize) -> u32 {
        if !self.has_edge(u, v) {
            return 0;
        }
        self.weight(u, v).unwrap_or(1)
    }

    /// Breadth-first reachability from vertex 0
    pub fn is_connected(&self) -> bool {
        let n = self.node_count();
        if n <= 1 {
            return true;
        }
        let mut seen = vec![false; n];
        let mut queue = VecDeque::from([0usize]);
        seen[0] = true;
        let mut reached = 1;
        while let Some(u) = queue.pop_front() {
            for v in self.neighbors(u) {
                if !seen[v] {
                    seen[v] = true;
                    reached += 1;
                    queue.push_back(v);
                }
            }
        }
        reached == n
    }

    /// Unweighted complement on the same vertex set
    pub fn complement(&self) -> Graph {
        let n = self.node_count();
        let mut result = Graph::new(n);
        for u in 0..n {
            for v in (u + 1)..n {
                if !self.has_edge(u, v) {
                    result.add_edge(u, v);
                }
            }
        }
        result
    }

    /// Check symmetry, absence of self-loops and weight coverage
    pub fn check_invariants(&self) -> Result<(), String> {
        for (u, neighbors) in self.adjacency.iter().enumerate() {
            if neighbors.contains(&u) {
                return Err(format!("self-loop at node {}", u));
            }
            if let Some(&v) = neighbors.iter().find(|&&v| !self.has_edge(v, u)) {
                return Err(format!("edge {}-{} is not symmetric", u, v));
            }
        }
        if let Some(weights) = &self.weights {
            if weights.len() != self.edge_count {
                return Err(format!(
                    "{} weights for {} edges",
                    weights.len(),
                    self.edge_count
                ));
            }
            if weights.values().any(|&w| w == 0) {
                return Err("zero edge weight".to_string());
            }
        }
        Ok(())
    }
}
