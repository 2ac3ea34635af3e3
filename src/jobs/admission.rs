//! Request admission: everything that must hold before a job is queued.

use crate::error::ApiError;
use crate::limits::Limits;
use crate::planner;
use crate::spec::{self, GraphSpec, WeightDefaults};
use serde_json::Value;

/// Validation policy applied to every submitted request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub limits: Limits,
    pub weight_defaults: WeightDefaults,
}

impl Admission {
    pub fn new(limits: Limits, weight_defaults: WeightDefaults) -> Self {
        Self {
            limits,
            weight_defaults,
        }
    }

    /// Validate `raw` and check static feasibility. No job exists until this succeeds.
    pub fn admit(&self, raw: &Value) -> Result<GraphSpec, ApiError> {
        let spec = spec::validate(raw, &self.limits, &self.weight_defaults)?;
        planner::check(&spec)?;
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_infeasible_rejected_at_admission() {
        let admission = Admission::new(Limits::default(), WeightDefaults::default());
        let err = admission
            .admit(&json!({"type": "exact-degree", "nodes": 12, "node_degree": 12, "connected": true}))
            .unwrap_err();
        assert_eq!(err.kind(), "infeasible");
        assert_eq!(err.status(), 400);

        let err = admission
            .admit(&json!({"type": "exact-degree", "nodes": 11, "node_degree": 3}))
            .unwrap_err();
        assert_eq!(err.kind(), "infeasible");

        assert!(admission
            .admit(&json!({"type": "exact-degree", "nodes": 12, "node_degree": 3}))
            .is_ok());
    }
}
