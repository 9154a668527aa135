pub mod config;
pub mod runner;

pub use config::WorkerConfig;
pub use runner::Runner;
