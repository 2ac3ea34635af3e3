//! rngr: Constraint-Based Random Graph Generation
//!
//! Generates simple undirected graphs that meet degree and connectivity constraints,
//! reproducibly from a seed, behind an asynchronous job service: submit a request, poll
//! the job, download the graph.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod jobs;
pub mod limits;
pub mod logging;
pub mod planner;
pub mod render;
pub mod service;
pub mod spec;
