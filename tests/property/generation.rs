//! Every accepted request yields a simple graph that meets its constraints

use proptest::prelude::*;
use proptest::test_runner::{Config, TestRunner};
use rngr::generator::{build, GenerationConfig, Graph};
use rngr::planner;
use rngr::spec::{DegreeConstraint, GraphSpec, WeightRange};

fn runner() -> TestRunner {
    TestRunner::new(Config {
        cases: 64,
        ..Config::default()
    })
}

fn assert_simple(graph: &Graph, nodes: usize) {
    assert_eq!(graph.node_count(), nodes);
    graph.check_invariants().unwrap();
    for u in 0..nodes {
        assert!(!graph.has_edge(u, u));
        for v in 0..nodes {
            assert_eq!(graph.cell(u, v), graph.cell(v, u));
        }
    }
}

fn spec(nodes: u64, constraint: DegreeConstraint, connected: bool, weights: Option<WeightRange>) -> GraphSpec {
    GraphSpec {
        nodes,
        constraint,
        connected,
        weights,
        seed: None,
    }
}

#[test]
fn test_exact_degree_property() {
    let config = GenerationConfig::default();
    runner()
        .run(
            &(2u64..40, 0u64..40, any::<bool>(), any::<i64>()),
            |(nodes, degree, connected, seed)| {
                let spec = spec(nodes, DegreeConstraint::Exact { degree }, connected, None);
                prop_assume!(planner::check(&spec).is_ok());

                let graph = build(&spec, seed, &config).unwrap();
                assert_simple(&graph, nodes as usize);
                prop_assert!(graph.degrees().iter().all(|d| *d as u64 == degree));
                if connected {
                    prop_assert!(graph.is_connected());
                }
                Ok(())
            },
        )
        .unwrap();
}

#[test]
fn test_between_degree_property() {
    let config = GenerationConfig::default();
    runner()
        .run(
            &(2u64..40, 0u64..10, 1u64..10, any::<bool>(), any::<i64>()),
            |(nodes, min, spread, connected, seed)| {
                let max = min + spread;
                let spec = spec(nodes, DegreeConstraint::Between { min, max }, connected, None);
                prop_assume!(planner::check(&spec).is_ok());

                let graph = build(&spec, seed, &config).unwrap();
                assert_simple(&graph, nodes as usize);
                let floor = if connected { min.max(1) } else { min };
                for degree in graph.degrees() {
                    prop_assert!((floor..=max).contains(&(degree as u64)));
                }
                if connected {
                    prop_assert!(graph.is_connected());
                }
                Ok(())
            },
        )
        .unwrap();
}

#[test]
fn test_wide_between_degree_property() {
    let config = GenerationConfig::default();
    let strategy = (40u64..=200).prop_flat_map(|nodes| {
        (Just(nodes), 0..=nodes / 2).prop_flat_map(move |(nodes, min)| {
            (
                Just(nodes),
                Just(min),
                (min + 1)..nodes,
                any::<bool>(),
                any::<i64>(),
            )
        })
    });
    TestRunner::new(Config {
        cases: 24,
        ..Config::default()
    })
    .run(&strategy, |(nodes, min, max, connected, seed)| {
        let spec = spec(nodes, DegreeConstraint::Between { min, max }, connected, None);
        prop_assume!(planner::check(&spec).is_ok());

        let graph = build(&spec, seed, &config)
            .map_err(|e| TestCaseError::fail(format!("[{}, {}] on {}: {}", min, max, nodes, e)))?;
        assert_simple(&graph, nodes as usize);
        let floor = if connected { min.max(1) } else { min };
        for degree in graph.degrees() {
            prop_assert!((floor..=max).contains(&(degree as u64)));
        }
        if connected {
            prop_assert!(graph.is_connected());
        }
        Ok(())
    })
    .unwrap();
}

#[test]
fn test_average_degree_property() {
    let config = GenerationConfig::default();
    runner()
        .run(
            &(1u64..40, 0.0f64..12.0, any::<bool>(), 1u32..50, 0u32..50, any::<i64>()),
            |(nodes, average, connected, low, spread, seed)| {
                let weights = WeightRange {
                    min: low,
                    max: low + spread,
                };
                let spec = spec(nodes, DegreeConstraint::Average { average }, connected, Some(weights));
                prop_assume!(planner::check(&spec).is_ok());

                let graph = build(&spec, seed, &config).unwrap();
                assert_simple(&graph, nodes as usize);
                let expected = (average * nodes as f64 / 2.0).round() as usize;
                prop_assert_eq!(graph.edge_count(), expected);
                for (u, v) in graph.edges() {
                    let w = graph.weight(u, v).unwrap();
                    prop_assert!((weights.min..=weights.max).contains(&w));
                }
                if connected {
                    prop_assert!(graph.is_connected());
                }
                Ok(())
            },
        )
        .unwrap();
}

#[test]
fn test_seed_determines_graph_property() {
    let config = GenerationConfig::default();
    runner()
        .run(&(4u64..30, any::<i64>()), |(nodes, seed)| {
            let spec = spec(
                nodes,
                DegreeConstraint::Between { min: 1, max: 3 },
                true,
                Some(WeightRange { min: 1, max: 9 }),
            );
            let first = build(&spec, seed, &config).unwrap();
            let second = build(&spec, seed, &config).unwrap();
            prop_assert_eq!(first, second);
            Ok(())
        })
        .unwrap();
}
