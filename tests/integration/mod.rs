//! Integration tests for the rngr graph generation service

mod api_routes;
mod batch;
mod config_integration;
mod determinism;
mod job_lifecycle;
mod test_utils;
