pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig, RunConfig};

pub use core::{
    dedup::{DuplicateScorer, MatchReason, Similarity},
    etl::DedupEngine,
    pipeline::DedupPipeline,
};
pub use domain::model::{ClientRecord, DuplicatePair, Gender};
pub use utils::error::{DedupError, Result};
