// lib.rs - bioenv library root

//! # bioenv - Dataset validation, sequence/table analysis and epidemic simulation
//!
//! Computational core behind the Bioenv dashboards. A dataset (FASTA sequences
//! or a CSV/TSV table) is loaded, validated and cleaned once, then analysed with
//! a tiered set of metrics. Results carry their provenance and are packaged into
//! a presentation-neutral form for any shell to render.
//!
//! ## Features
//!
//! - **Validation**: findings with severities, record filters and optional repair
//! - **Basic tier**: length, composition, GC content, complexity, column summaries
//! - **Advanced tier**: windowed GC, alignment and k-mer distances, correlation,
//!   clustering and outlier scoring
//! - **Simulation**: deterministic SIR-V model and seeded network SIR
//! - **Output**: JSON, MessagePack, TSV, PHYLIP and NEXUS
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use bioenv::prelude::*;
//!
//! let bytes = std::fs::read("samples.fasta")?;
//! let mut session = Session::new();
//! session.upload(&bytes, &LoadOptions::default(), &ValidationPolicy::default())?;
//!
//! let config = AnalysisConfig::builder().tier(Tier::Advanced).k(3).build()?;
//! let result = session.analyze(&config, &CancelToken::new())?;
//! println!("mean GC: {:?}", result.scalar("gc_content.mean"));
//!
//! let packaged = session.package_last()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all main modules
pub mod cli;
pub mod core;
pub mod data;
pub mod error;
pub mod hashers;
pub mod output;
pub mod simulation;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::cli::{validate_args, Args, ValidationResult};
    pub use crate::core::{AlignmentConfig, DistanceMethod, DistanceMode, Metric, Tier};
    pub use crate::core::{AnalysisConfig, AnalysisEngine, AnalysisResult, CancelToken, Session};
    pub use crate::data::{Dataset, LoadOptions, ValidatedDataset, ValidationPolicy, ValidationReport};
    pub use crate::error::BioenvError;
    pub use crate::hashers::{DatasetHasher, Fingerprint, HasherRegistry};
    pub use crate::output::{package, OutputFormat, PackagedResult};
    pub use crate::simulation::{simulate_network, simulate_sirv, NetworkSirParams, SirvParams};
}

// Re-export main types at the root level for convenience
pub use crate::core::{AnalysisConfig, AnalysisEngine, AnalysisResult, Session};
pub use crate::data::{Dataset, ValidatedDataset};
pub use crate::error::{BioenvError, Result};
pub use crate::output::PackagedResult;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn get_info() -> String {
    format!(
        "bioenv v{} - Dataset validation, analysis and epidemic simulation",
        VERSION
    )
}
