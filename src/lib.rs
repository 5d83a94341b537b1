// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod calculator;
pub mod config;
pub mod frame;
pub mod loader;
pub mod statline;
pub mod vars;
