//! Edge weights and edge-budget filling.

use super::{uniform_index, Graph};
use crate::error::GenerationError;
use crate::spec::WeightRange;
use rand::Rng;
use std::collections::BTreeMap;

/// Draw one weight per edge, uniform in `range`, visiting edges in ascending `(u, v)` order.
pub fn assign_weights<R: Rng>(graph: &mut Graph, range: WeightRange, rng: &mut R) {
    let weights: BTreeMap<(usize, usize), u32> = graph
        .edges()
        .map(|edge| (edge, rng.gen_range(range.min..=range.max)))
        .collect();
    graph.set_weights(weights);
}

/// Add uniformly chosen absent edges until the graph has exactly `target` edges.
///
/// Absent pairs are listed in ascending order and a partial Fisher-Yates shuffle picks
/// the ones to add, so no pair is drawn twice.
pub fn fill_edges<R: Rng>(graph: &mut Graph, target: usize, rng: &mut R) -> Result<(), GenerationError> {
    let present = graph.edge_count();
    if present > target {
        return Err(GenerationError::Verification(format!(
            "{} edges already placed for a budget of {}",
            present, target
        )));
    }
    let needed = target - present;
    if needed == 0 {
        return Ok(());
    }

    let n = graph.node_count();
    let mut absent: Vec<(usize, usize)> = (0..n)
        .flat_map(|u| (u + 1..n).map(move |v| (u, v)))
        .filter(|&(u, v)| !graph.has_edge(u, v))
        .collect();
    if absent.len() < needed {
        return Err(GenerationError::Verification(format!(
            "only {} free pairs for {} more edges",
            absent.len(),
            needed
        )));
    }

    for i in 0..needed {
        let j = i + uniform_index(rng, absent.len() - i);
        absent.swap(i, j);
        let (u, v) = absent[i];
        graph.add_edge(u, v);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::seeded_rng;

    #[test]
    fn test_weights_within_range() {
        let mut graph = Graph::new(6);
        for u in 1..6 {
            graph.add_edge(0, u);
        }
        let mut rng = seeded_rng(9);
        assign_weights(&mut graph, WeightRange { min: 3, max: 7 }, &mut rng);
        for (u, v) in graph.edges() {
            let w = graph.weight(u, v).unwrap();
            assert!((3..=7).contains(&w));
        }
        assert!(graph.check_invariants().is_ok());
    }

    #[test]
    fn test_fill_reaches_budget() {
        let mut graph = Graph::new(10);
        graph.add_edge(0, 1);
        let mut rng = seeded_rng(2);
        fill_edges(&mut graph, 20, &mut rng).unwrap();
        assert_eq!(graph.edge_count(), 20);
        assert!(graph.has_edge(0, 1));
    }

    #[test]
    fn test_fill_complete_graph() {
        let mut graph = Graph::new(5);
        let mut rng = seeded_rng(2);
        fill_edges(&mut graph, 10, &mut rng).unwrap();
        assert!(graph.degrees().iter().all(|&d| d == 4));
        assert!(fill_edges(&mut graph, 11, &mut rng).is_err());
    }
}
