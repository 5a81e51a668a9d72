//! Poll and vote backend: polls with optional creator/voter anonymity,
//! at-most-one-vote-per-identity deduplication, and aggregated results.

pub mod controllers;
pub mod db;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;
