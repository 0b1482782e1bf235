pub mod config;
pub mod input;
pub mod runner;
pub mod sinks;
