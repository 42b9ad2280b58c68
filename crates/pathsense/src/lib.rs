// lib.rs — Exposes internal modules for integration tests.
//
// The binary entry point remains in main.rs.

pub mod backend;
pub mod candidates;
pub mod config;
pub mod directory_resolver;
pub mod line_scan;
pub mod lister;
pub mod path_mapping;
pub mod provider;
pub mod state;
pub mod utf16;
