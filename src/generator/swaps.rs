//! Degree-preserving edge swaps.
//!
//! Both operations replace two edges `(a, b)` and `(c, d)` with `(a, d)` and `(c, b)` or
//! `(a, c)` and `(b, d)`, so every node keeps its degree.

use super::{uniform_index, Graph};
use crate::error::GenerationError;
use rand::Rng;
use std::collections::VecDeque;

const UNSEEN: usize = usize::MAX;

/// Try `attempts` random double-edge swaps. Returns the number that were applied.
///
/// Swaps that would create a self-loop or a duplicate edge are skipped. The edge list is
/// updated in place so each attempt picks its edges in constant time.
pub fn randomize<R: Rng>(graph: &mut Graph, attempts: usize, rng: &mut R) -> usize {
    let mut edges: Vec<(usize, usize)> = graph.edges().collect();
    if edges.len() < 2 {
        return 0;
    }

    let mut applied = 0;
    for _ in 0..attempts {
        let i = uniform_index(rng, edges.len());
        let j = uniform_index(rng, edges.len());
        if i == j {
            continue;
        }
        let (a, b) = edges[i];
        let (mut c, mut d) = edges[j];
        if rng.gen::<bool>() {
            std::mem::swap(&mut c, &mut d);
        }
        if a == c || a == d || b == c || b == d || graph.has_edge(a, d) || graph.has_edge(c, b) {
            continue;
        }

        graph.remove_edge(a, b);
        graph.remove_edge(c, d);
        graph.add_edge(a, d);
        graph.add_edge(c, b);
        edges[i] = (a, d);
        edges[j] = (c, b);
        applied += 1;
    }
    applied
}

/// Merge the components of `graph` into one. Returns the number of merges.
///
/// Each merge takes an edge `(a, b)` that lies on a cycle and any edge `(c, d)` of another
/// component, and replaces them with `(a, c)` and `(b, d)`. `(a, b)` is not a bridge, so
/// both halves of the other component end up attached. While there is more than one
/// component and at least `n - 1` edges some component holds a cycle. Every node needs
/// degree 1 or more for the other component to have an edge.
pub fn connect<R: Rng>(graph: &mut Graph, rng: &mut R) -> Result<usize, GenerationError> {
    let mut merges = 0;
    loop {
        let forest = SpanningForest::of(graph);
        if forest.components <= 1 {
            return Ok(merges);
        }

        let cycle_edges: Vec<(usize, usize)> = graph
            .edges()
            .filter(|&(u, v)| !forest.is_tree_edge(u, v))
            .collect();
        if cycle_edges.is_empty() {
            return Err(GenerationError::Verification(format!(
                "{} components and no cycle to break",
                forest.components
            )));
        }
        let (a, b) = cycle_edges[uniform_index(rng, cycle_edges.len())];

        let home = forest.label[a];
        let foreign: Vec<(usize, usize)> = graph
            .edges()
            .filter(|&(u, _)| forest.label[u] != home)
            .collect();
        if foreign.is_empty() {
            return Err(GenerationError::Verification(
                "isolated node cannot be connected".to_string(),
            ));
        }
        let (c, d) = foreign[uniform_index(rng, foreign.len())];

        graph.remove_edge(a, b);
        graph.remove_edge(c, d);
        graph.add_edge(a, c);
        graph.add_edge(b, d);
        merges += 1;
    }
}

/// Breadth-first spanning forest
struct SpanningForest {
    label: Vec<usize>,
    parent: Vec<usize>,
    components: usize,
}

impl SpanningForest {
    fn of(graph: &Graph) -> Self {
        let n = graph.node_count();
        let mut label = vec![UNSEEN; n];
        let mut parent = vec![UNSEEN; n];
        let mut components = 0;
        let mut queue = VecDeque::new();

        for root in 0..n {
            if label[root] != UNSEEN {
                continue;
            }
            label[root] = components;
            queue.push_back(root);
            while let Some(u) = queue.pop_front() {
                for v in graph.neighbors(u) {
                    if label[v] == UNSEEN {
                        label[v] = components;
                        parent[v] = u;
                        queue.push_back(v);
                    }
                }
            }
            components += 1;
        }

        Self {
            label,
            parent,
            components,
        }
    }

    fn is_tree_edge(&self, u: usize, v: usize) -> bool {
        self.parent[v] == u || self.parent[u] == v
    }
}
