//! Graph Generator
//!
//! Builds simple undirected graphs that meet a planned degree target. Every random choice
//! is drawn from one seeded stream in a fixed order (planner, spanning tree, stub
//! matching, swaps, weights), so a seed always reproduces the same graph.
//!
//! Degree sequences are first tried by stub matching on top of a spanning tree. When the
//! matching stalls the sequence is rebuilt by Havel-Hakimi, shuffled with double-edge
//! swaps, and joined into one component by merging swaps if it must be connected.

mod graph;
mod havel_hakimi;
mod stubs;
mod swaps;
mod tree;
mod weights;

pub use graph::Graph;
pub use havel_hakimi::havel_hakimi;
pub use stubs::match_stubs;
pub use swaps::{connect, randomize};
pub use tree::{shuffle, spanning_tree};
pub use weights::{assign_weights, fill_edges};

use crate::error::GenerationError;
use crate::planner::{self, DegreeTarget};
use crate::spec::{GraphSpec, WeightDefaults, WeightRange};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Generation tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Lower weight bound used when a weighted request omits `weight_min`
    #[serde(default = "default_weight_min")]
    pub weight_min: u32,

    /// Upper weight bound used when a weighted request omits `weight_max`
    #[serde(default = "default_weight_max")]
    pub weight_max: u32,

    /// Consecutive rejected stub draws before stub matching gives way to Havel-Hakimi
    #[serde(default = "default_stall_limit")]
    pub stall_limit: usize,

    /// Double-edge swap attempts per edge when shuffling a Havel-Hakimi graph
    #[serde(default = "default_swaps_per_edge")]
    pub swaps_per_edge: usize,

    /// Between-degree sequences drawn before the request is declared infeasible
    #[serde(default = "default_max_sequence_draws")]
    pub max_sequence_draws: usize,
}

fn default_weight_min() -> u32 {
    1
}

fn default_weight_max() -> u32 {
    100
}

fn default_stall_limit() -> usize {
    64
}

fn default_swaps_per_edge() -> usize {
    4
}

fn default_max_sequence_draws() -> usize {
    32
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            weight_min: default_weight_min(),
            weight_max: default_weight_max(),
            stall_limit: default_stall_limit(),
            swaps_per_edge: default_swaps_per_edge(),
            max_sequence_draws: default_max_sequence_draws(),
        }
    }
}

impl GenerationConfig {
    pub fn weight_defaults(&self) -> WeightDefaults {
        WeightDefaults {
            min: self.weight_min,
            max: self.weight_max,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.weight_min == 0 {
            return Err("generation.weight_min must be positive".to_string());
        }
        if self.weight_min > self.weight_max {
            return Err(format!(
                "generation.weight_min ({}) exceeds generation.weight_max ({})",
                self.weight_min, self.weight_max
            ));
        }
        if self.stall_limit == 0 {
            return Err("generation.stall_limit must be positive".to_string());
        }
        if self.max_sequence_draws == 0 {
            return Err("generation.max_sequence_draws must be positive".to_string());
        }
        Ok(())
    }
}

/// The random stream for a job. Negative seeds are reinterpreted bit for bit.
pub fn seeded_rng(seed: i64) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(seed as u64)
}

/// Uniform index in `0..len`. `len` must be positive.
///
/// Sampling goes through `u64` so the draw sequence does not depend on the platform's
/// pointer width.
pub fn uniform_index<R: Rng>(rng: &mut R, len: usize) -> usize {
    rng.gen_range(0..len as u64) as usize
}

/// Plan and generate the graph for `spec` from `seed`.
pub fn build(spec: &GraphSpec, seed: i64, config: &GenerationConfig) -> Result<Graph, GenerationError> {
    let mut rng = seeded_rng(seed);
    let target = planner::plan(spec, &mut rng, config)?;
    generate(
        spec.nodes as usize,
        &target,
        spec.connected,
        spec.weights,
        config,
        &mut rng,
    )
}

/// Generate a graph meeting `target`, then verify it.
pub fn generate<R: Rng>(
    nodes: usize,
    target: &DegreeTarget,
    connected: bool,
    weights: Option<WeightRange>,
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<Graph, GenerationError> {
    let mut graph = match target {
        DegreeTarget::Sequence(degrees) => {
            if degrees.len() != nodes {
                return Err(GenerationError::Verification(format!(
                    "{} degrees planned for {} nodes",
                    degrees.len(),
                    nodes
                )));
            }
            realize_sequence(degrees, connected, config, rng)?
        }
        DegreeTarget::EdgeCount(edges) => realize_edge_count(nodes, *edges, connected, rng)?,
    };

    if let Some(range) = weights {
        assign_weights(&mut graph, range, rng);
    }

    verify(&graph, target, connected)?;
    debug!(
        nodes,
        edges = graph.edge_count(),
        connected,
        weighted = graph.is_weighted(),
        "Graph generated"
    );
    Ok(graph)
}

fn realize_sequence<R: Rng>(
    degrees: &[usize],
    connected: bool,
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<Graph, GenerationError> {
    let n = degrees.len();
    if let Some(degree) = dense_regular_degree(degrees, connected) {
        let sparse = realize_degrees(&vec![n - 1 - degree; n], false, config, rng)?;
        return Ok(sparse.complement());
    }
    realize_degrees(degrees, connected, config, rng)
}

fn realize_degrees<R: Rng>(
    degrees: &[usize],
    connected: bool,
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<Graph, GenerationError> {
    let n = degrees.len();
    let spanning = connected && n > 1;
    let mut graph = if spanning {
        spanning_tree(degrees, rng)?
    } else {
        Graph::new(n)
    };

    match match_stubs(&mut graph, degrees, config.stall_limit, rng) {
        Ok(()) => return Ok(graph),
        Err(GenerationError::Stalled { rejected }) => {
            debug!(
                nodes = n,
                rejected,
                matched = graph.edge_count(),
                "Stub matching stalled, rebuilding by Havel-Hakimi"
            );
        }
        Err(err) => return Err(err),
    }

    let mut graph = havel_hakimi(degrees, rng)?;
    let attempts = config.swaps_per_edge.saturating_mul(graph.edge_count());
    let swaps = randomize(&mut graph, attempts, rng);
    let merges = if spanning { connect(&mut graph, rng)? } else { 0 };
    debug!(nodes = n, swaps, merges, "Degree sequence realized by edge swaps");
    Ok(graph)
}

/// Degree of a regular, non-connected target dense enough to build through its complement
fn dense_regular_degree(degrees: &[usize], connected: bool) -> Option<usize> {
    let &first = degrees.first()?;
    let n = degrees.len();
    if connected || n < 2 || degrees.iter().any(|&d| d != first) {
        return None;
    }
    (2 * first > n - 1).then_some(first)
}

fn realize_edge_count<R: Rng>(
    nodes: usize,
    edges: usize,
    connected: bool,
    rng: &mut R,
) -> Result<Graph, GenerationError> {
    let mut graph = if connected && nodes > 1 {
        spanning_tree(&vec![nodes - 1; nodes], rng)?
    } else {
        Graph::new(nodes)
    };
    fill_edges(&mut graph, edges, rng)?;
    Ok(graph)
}

fn verify(graph: &Graph, target: &DegreeTarget, connected: bool) -> Result<(), GenerationError> {
    graph
        .check_invariants()
        .map_err(GenerationError::Verification)?;

    match target {
        DegreeTarget::Sequence(degrees) => {
            if let Some((node, (&actual, &wanted))) = graph
                .degrees()
                .iter()
                .zip(degrees.iter())
                .enumerate()
                .find(|(_, (actual, wanted))| actual != wanted)
            {
                return Err(GenerationError::Verification(format!(
                    "node {} has degree {} instead of {}",
                    node, actual, wanted
                )));
            }
        }
        DegreeTarget::EdgeCount(edges) => {
            if graph.edge_count() != *edges {
                return Err(GenerationError::Verification(format!(
                    "{} edges instead of {}",
                    graph.edge_count(),
                    edges
                )));
            }
        }
    }

    if connected && !graph.is_connected() {
        return Err(GenerationError::Verification(
            "graph is not connected".to_string(),
        ));
    }
    Ok(())
}
