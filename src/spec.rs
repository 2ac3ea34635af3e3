//! Graph Specifications
//!
//! Canonical, validated form of a graph request. The mode-specific degree fields are a
//! tagged union so that a `GraphSpec` can only ever describe one generation mode.

use serde::{Deserialize, Serialize};
use std::fmt;

mod validate;

pub use validate::{validate, WeightDefaults};

/// Wire names of the supported generation modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GraphType {
    ExactDegree,
    AverageDegree,
    BetweenDegree,
}

impl GraphType {
    pub fn as_str(self) -> &'static str {
        match self {
            GraphType::ExactDegree => "exact-degree",
            GraphType::AverageDegree => "average-degree",
            GraphType::BetweenDegree => "between-degree",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "exact-degree" => Some(GraphType::ExactDegree),
            "average-degree" => Some(GraphType::AverageDegree),
            "between-degree" => Some(GraphType::BetweenDegree),
            _ => None,
        }
    }
}

impl fmt::Display for GraphType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mode-specific degree constraint
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DegreeConstraint {
    /// Every node has exactly this degree
    Exact { degree: u64 },
    /// Every node has a degree in `[min, max]`
    Between { min: u64, max: u64 },
    /// The mean degree over all nodes
    Average { average: f64 },
}

impl DegreeConstraint {
    pub fn graph_type(&self) -> GraphType {
        match self {
            DegreeConstraint::Exact { .. } => GraphType::ExactDegree,
            DegreeConstraint::Between { .. } => GraphType::BetweenDegree,
            DegreeConstraint::Average { .. } => GraphType::AverageDegree,
        }
    }
}

/// Inclusive edge weight range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightRange {
    pub min: u32,
    pub max: u32,
}

/// A validated graph request. Immutable once accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSpec {
    pub nodes: u64,
    pub constraint: DegreeConstraint,
    pub connected: bool,
    /// Present exactly when the graph is weighted
    pub weights: Option<WeightRange>,
    pub seed: Option<i64>,
}

impl GraphSpec {
    pub fn graph_type(&self) -> GraphType {
        self.constraint.graph_type()
    }

    pub fn weighted(&self) -> bool {
        self.weights.is_some()
    }
}

/// Flat wire form of a spec, as echoed in job representations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecView {
    #[serde(rename = "type")]
    pub graph_type: GraphType,
    pub nodes: u64,
    pub connected: bool,
    pub weighted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_degree: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_degree_max: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_degree_average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_max: Option<u32>,
}

impl From<&GraphSpec> for SpecView {
    fn from(spec: &GraphSpec) -> Self {
        let (node_degree, node_degree_max, node_degree_average) = match spec.constraint {
            DegreeConstraint::Exact { degree } => (Some(degree), None, None),
            DegreeConstraint::Between { min, max } => (Some(min), Some(max), None),
            DegreeConstraint::Average { average } => (None, None, Some(average)),
        };
        SpecView {
            graph_type: spec.graph_type(),
            nodes: spec.nodes,
            connected: spec.connected,
            weighted: spec.weighted(),
            node_degree,
            node_degree_max,
            node_degree_average,
            weight_min: spec.weights.map(|w| w.min),
            weight_max: spec.weights.map(|w| w.max),
        }
    }
}
