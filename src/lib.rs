//! bugpatch library crate
//!
//! Exposes the backend client, the session model and the workflow stages so
//! the binary, benchmarks and integration tests can drive them without going
//! through terminal startup.

pub mod api;
pub mod app;
pub mod config;
pub mod logging;
pub mod model;
pub mod session;
pub mod text;
pub mod ui;
pub mod util;
pub mod view;
pub mod workflow;
