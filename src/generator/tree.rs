//! Random spanning trees with per-node degree caps.

use super::{uniform_index, Graph};
use crate::error::GenerationError;
use rand::Rng;

/// Build a random spanning tree in which node `i` has degree at most `caps[i]`.
///
/// Nodes able to carry two or more edges join first, in shuffled order, each attaching to
/// a uniformly chosen already-attached node with spare capacity. Leaves (cap 1) join last.
/// A tree exists whenever every cap is at least 1 and the caps sum to `2(n-1)` or more.
pub fn spanning_tree<R: Rng>(caps: &[usize], rng: &mut R) -> Result<Graph, GenerationError> {
    let n = caps.len();
    let mut graph = Graph::new(n);
    if n <= 1 {
        return Ok(graph);
    }

    let mut order: Vec<usize> = (0..n).collect();
    shuffle(&mut order, rng);
    // Stable partition keeps the shuffled order inside each group.
    let (mut attach_order, leaves): (Vec<usize>, Vec<usize>) =
        order.into_iter().partition(|&u| caps[u] >= 2);
    attach_order.extend(leaves);

    let mut spare = vec![0usize; n];
    let mut open: Vec<usize> = Vec::with_capacity(n);
    let root = attach_order[0];
    spare[root] = caps[root];
    if spare[root] > 0 {
        open.push(root);
    }

    for &node in &attach_order[1..] {
        if caps[node] == 0 || open.is_empty() {
            return Err(GenerationError::SpanningTree);
        }
        let slot = uniform_index(rng, open.len());
        let parent = open[slot];
        graph.add_edge(parent, node);

        spare[parent] -= 1;
        if spare[parent] == 0 {
            open.swap_remove(slot);
        }
        spare[node] = caps[node] - 1;
        if spare[node] > 0 {
            open.push(node);
        }
    }

    Ok(graph)
}

/// Fisher-Yates shuffle driven by [`uniform_index`] so the draw sequence is fixed.
pub fn shuffle<T, R: Rng>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = uniform_index(rng, i + 1);
        items.swap(i, j);
    }
}
