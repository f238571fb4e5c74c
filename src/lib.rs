// File: ./src/lib.rs
// Crate root library declaration and module exports.
pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod enrich;
pub mod model;
pub mod planner;
pub mod storage;
