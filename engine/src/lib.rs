pub mod config;
pub mod error;
pub mod runner;
pub mod service;
pub mod stub;

pub use config::EngineConfig;
pub use error::EngineError;
pub use runner::{BlockFailure, RunOptions, RunReport, run_script};
pub use service::ScriptService;
pub use stub::StubService;
