pub mod annotate;
pub mod classify;
pub mod config;
pub mod debug;
pub mod error;
pub mod geometry;
pub mod image_utils;
pub mod pipeline;
pub mod preprocess;
pub mod regions;
pub mod score;
pub mod store;
pub mod types;

pub use config::{PipelineConfig, Strategy};
pub use error::{OmrError, Result};
pub use pipeline::{run_pipeline, run_pipeline_with, PipelineOutput};
pub use score::compare;
pub use store::{CaptureKind, ResultStore};
pub use types::{AnswerLabel, AnswerList, ScoreTally};
