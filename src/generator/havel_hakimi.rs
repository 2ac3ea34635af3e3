//! Havel-Hakimi construction for graphical degree sequences.

use super::{shuffle, Graph};
use crate::error::GenerationError;
use rand::Rng;

/// Build a graph in which node `i` has degree `degrees[i]`.
///
/// Nodes are laid off in shuffled order. Each one is joined to the nodes with the most
/// remaining degree, ties going to the node that comes first in the shuffle. By the
/// Kleitman-Wang theorem any node may be laid off this way while the residual sequence
/// stays graphical, so a graphical input never gets stuck.
pub fn havel_hakimi<R: Rng>(degrees: &[usize], rng: &mut R) -> Result<Graph, GenerationError> {
    let n = degrees.len();
    let mut graph = Graph::new(n);
    let mut remaining = degrees.to_vec();

    let mut order: Vec<usize> = (0..n).collect();
    shuffle(&mut order, rng);
    let mut rank = vec![0usize; n];
    for (position, &node) in order.iter().enumerate() {
        rank[node] = position;
    }

    let mut candidates = Vec::with_capacity(n);
    for &node in &order {
        let need = remaining[node];
        if need == 0 {
            continue;
        }
        remaining[node] = 0;

        candidates.clear();
        candidates.extend((0..n).filter(|&v| remaining[v] > 0));
        if candidates.len() < need {
            return Err(GenerationError::Verification(format!(
                "degree sequence is not graphical: node {} needs {} partners, {} left",
                node,
                need,
                candidates.len()
            )));
        }

        candidates.select_nth_unstable_by(need - 1, |&a, &b| {
            remaining[b].cmp(&remaining[a]).then(rank[a].cmp(&rank[b]))
        });
        for &partner in &candidates[..need] {
            graph.add_edge(node, partner);
            remaining[partner] -= 1;
        }
    }

    Ok(graph)
}
