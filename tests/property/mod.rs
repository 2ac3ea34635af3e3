//! Property-based tests for generated graphs

mod generation;
