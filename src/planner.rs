//! Degree-Sequence Planner
//!
//! Turns a validated [`GraphSpec`] into a concrete degree target and decides whether a
//! simple graph meeting it can exist. Infeasible requests are reported, never clamped.

use crate::error::InfeasibleError;
use crate::generator::{uniform_index, GenerationConfig};
use crate::spec::{DegreeConstraint, GraphSpec};
use rand::Rng;
use tracing::trace;

/// What the generator has to realize
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DegreeTarget {
    /// Exact degree of every node
    Sequence(Vec<usize>),
    /// Total number of edges
    EdgeCount(usize),
}

/// Static feasibility check, run at submission before any random draw.
pub fn check(spec: &GraphSpec) -> Result<(), InfeasibleError> {
    let nodes = spec.nodes;
    match spec.constraint {
        DegreeConstraint::Exact { degree } => check_exact(nodes, degree, spec.connected),
        DegreeConstraint::Between { min, max } => check_between(nodes, min, max, spec.connected),
        DegreeConstraint::Average { average } => {
            average_edges(nodes, average, spec.connected).map(|_| ())
        }
    }
}

/// Derive the degree target for `spec`, drawing from `rng` when the mode is randomized.
pub fn plan<R: Rng>(
    spec: &GraphSpec,
    rng: &mut R,
    config: &GenerationConfig,
) -> Result<DegreeTarget, InfeasibleError> {
    check(spec)?;
    let nodes = spec.nodes as usize;
    match spec.constraint {
        DegreeConstraint::Exact { degree } => {
            Ok(DegreeTarget::Sequence(vec![degree as usize; nodes]))
        }
        DegreeConstraint::Average { average } => {
            let edges = average_edges(spec.nodes, average, spec.connected)?;
            Ok(DegreeTarget::EdgeCount(edges as usize))
        }
        DegreeConstraint::Between { min, max } => draw_between(
            nodes,
            min as usize,
            max as usize,
            spec.connected,
            config.max_sequence_draws,
            rng,
        )
        .map(DegreeTarget::Sequence),
    }
}

fn check_exact(nodes: u64, degree: u64, connected: bool) -> Result<(), InfeasibleError> {
    if degree >= nodes {
        return Err(InfeasibleError::DegreeTooLarge { degree, nodes });
    }
    if (nodes * degree) % 2 == 1 {
        return Err(InfeasibleError::OddDegreeSum { nodes, degree });
    }
    // A perfect matching on more than two nodes is never connected.
    if connected && nodes > 1 && (degree == 0 || (degree == 1 && nodes > 2)) {
        return Err(InfeasibleError::NotConnectable { nodes, degree });
    }
    Ok(())
}

fn check_between(nodes: u64, min: u64, max: u64, connected: bool) -> Result<(), InfeasibleError> {
    if min > max {
        return Err(InfeasibleError::EmptyDegreeRange { min, max });
    }
    if max >= nodes {
        return Err(InfeasibleError::DegreeTooLarge {
            degree: max,
            nodes,
        });
    }
    if connected && nodes > 1 && nodes * max < 2 * (nodes - 1) {
        return Err(InfeasibleError::NotConnectable {
            nodes,
            degree: max,
        });
    }
    Ok(())
}

/// Edge budget of an average-degree request: `round(average * nodes / 2)`.
pub fn average_edges(nodes: u64, average: f64, connected: bool) -> Result<u64, InfeasibleError> {
    let edges = (average * nodes as f64 / 2.0).round() as u64;
    let max_edges = nodes * nodes.saturating_sub(1) / 2;
    if edges > max_edges {
        return Err(InfeasibleError::TooManyEdges {
            edges,
            max_edges,
            nodes,
        });
    }
    if connected && nodes > 1 && edges < nodes - 1 {
        return Err(InfeasibleError::TooFewEdges { edges, nodes });
    }
    Ok(edges)
}

fn draw_between<R: Rng>(
    nodes: usize,
    min: usize,
    max: usize,
    connected: bool,
    max_draws: usize,
    rng: &mut R,
) -> Result<Vec<usize>, InfeasibleError> {
    let spanning = connected && nodes > 1;
    let low = if spanning { min.max(1) } else { min };
    let attempts = max_draws.max(1);

    for attempt in 1..=attempts {
        let mut degrees: Vec<usize> = (0..nodes)
            .map(|_| low + uniform_index(rng, max - low + 1))
            .collect();
        if spanning {
            top_up(&mut degrees, 2 * (nodes - 1), max, rng);
        }
        fix_parity(&mut degrees, low, max, rng)?;

        if is_graphical(&degrees) {
            return Ok(degrees);
        }
        trace!(attempt, "Drawn degree sequence is not graphical, redrawing");
    }

    Err(InfeasibleError::NoGraphicalSequence { attempts })
}

/// Raise random nodes below `max` by one until the degree sum reaches `floor`
fn top_up<R: Rng>(degrees: &mut [usize], floor: usize, max: usize, rng: &mut R) {
    let mut sum: usize = degrees.iter().sum();
    while sum < floor {
        let open: Vec<usize> = (0..degrees.len()).filter(|&i| degrees[i] < max).collect();
        if open.is_empty() {
            return;
        }
        degrees[open[uniform_index(rng, open.len())]] += 1;
        sum += 1;
    }
}

/// Make the degree sum even by moving one node's degree by one within `[low, max]`
fn fix_parity<R: Rng>(
    degrees: &mut [usize],
    low: usize,
    max: usize,
    rng: &mut R,
) -> Result<(), InfeasibleError> {
    if degrees.iter().sum::<usize>() % 2 == 0 {
        return Ok(());
    }
    let mut moves: Vec<(usize, bool)> = Vec::new();
    for (node, &degree) in degrees.iter().enumerate() {
        if degree < max {
            moves.push((node, true));
        }
        if degree > low {
            moves.push((node, false));
        }
    }
    if moves.is_empty() {
        return Err(InfeasibleError::ParityUnreachable);
    }
    let (node, up) = moves[uniform_index(rng, moves.len())];
    if up {
        degrees[node] += 1;
    } else {
        degrees[node] -= 1;
    }
    Ok(())
}

/// Erdős–Gallai test: can some simple graph have exactly these degrees?
pub fn is_graphical(degrees: &[usize]) -> bool {
    let mut sorted = degrees.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    let n = sorted.len();
    if sorted.iter().sum::<usize>() % 2 == 1 || sorted.first().map_or(false, |&d| d >= n.max(1)) {
        return false;
    }

    let mut prefix = 0usize;
    for k in 1..=n {
        prefix += sorted[k - 1];
        let tail: usize = sorted[k..].iter().map(|&d| d.min(k)).sum();
        if prefix > k * (k - 1) + tail {
            return false;
        }
    }
    true
}
