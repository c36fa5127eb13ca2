pub mod dedup;
pub mod etl;
pub mod fuzzy;
pub mod parser;
pub mod pipeline;
pub mod report;

pub use crate::domain::model::{ClientRecord, DedupResult, DuplicatePair};
pub use crate::domain::ports::{ConfigProvider, Pipeline, ReportFormat, Storage};
pub use crate::utils::error::Result;
