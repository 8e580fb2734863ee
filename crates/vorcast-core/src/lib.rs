// Library root: re-exports all modules so the binary and integration tests
// can reach the valuation engine.

pub mod config;
pub mod player;
pub mod projections;
pub mod validate;
pub mod valuation;
