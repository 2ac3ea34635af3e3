//! Configuration-model stub matching.

use super::{uniform_index, Graph};
use crate::error::GenerationError;
use rand::Rng;
use tracing::trace;

/// Add edges to `graph` until every node `i` has degree `targets[i]`.
///
/// Each node starts with `targets[i] - degree(i)` free stubs. Pairs of stubs are drawn
/// uniformly and joined unless that would create a self-loop or a duplicate edge. After
/// `stall_limit` consecutive rejected draws the matching gives up with
/// [`GenerationError::Stalled`], leaving `graph` partially matched.
pub fn match_stubs<R: Rng>(
    graph: &mut Graph,
    targets: &[usize],
    stall_limit: usize,
    rng: &mut R,
) -> Result<(), GenerationError> {
    let mut stubs = Vec::new();
    for (node, &target) in targets.iter().enumerate() {
        let current = graph.degree(node);
        if current > target {
            return Err(GenerationError::Verification(format!(
                "node {} already has degree {} above its target {}",
                node, current, target
            )));
        }
        stubs.extend(std::iter::repeat(node).take(target - current));
    }
    if stubs.len() % 2 == 1 {
        return Err(GenerationError::Verification(
            "odd number of free stubs".to_string(),
        ));
    }

    let mut rejected = 0usize;
    while !stubs.is_empty() {
        let a = uniform_index(rng, stubs.len());
        let b = uniform_index(rng, stubs.len());
        if a != b && graph.add_edge(stubs[a], stubs[b]) {
            remove_pair(&mut stubs, a, b);
            rejected = 0;
            continue;
        }

        rejected += 1;
        if rejected >= stall_limit {
            trace!(free_stubs = stubs.len(), rejected, "Stub matching stalled");
            return Err(GenerationError::Stalled { rejected });
        }
    }
    Ok(())
}

fn remove_pair(stubs: &mut Vec<usize>, a: usize, b: usize) {
    let (high, low) = if a > b { (a, b) } else { (b, a) };
    stubs.swap_remove(high);
    stubs.swap_remove(low);
}
