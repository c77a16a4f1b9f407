//! Integration test suite for bzljvm
//!
//! End-to-end tests over the public API and the `bzljvm` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **graph_queries**: graph building, roots/leaves, reachability, ordering, cycles
//! - **classpath_resolution**: project classpaths through `WorkspaceClasspath`
//! - **cache_behavior**: TTL expiry, invalidation and concurrent requests
//! - **cli**: the command-line front end

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cache_behavior;
mod classpath_resolution;
mod cli;
mod graph_queries;
