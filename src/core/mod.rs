// mod.rs - Core logic module

pub mod alignment;
pub mod cancel;
pub mod composition;
pub mod config;
pub mod distance;
pub mod engine;
pub mod result;
pub mod session;
pub mod statistics;

// Re-export main types for convenience
pub use alignment::{compute_alignment_stats, AlignmentConfig, AlignmentStats, DistanceMode};
pub use cancel::CancelToken;
pub use config::{AnalysisConfig, AnalysisConfigBuilder, DistanceMethod, Metric, Tier};
pub use distance::DistanceMatrix;
pub use engine::AnalysisEngine;
pub use result::{AnalysisResult, LabeledRow, Provenance, ResultValue, RunConfig};
pub use session::Session;
