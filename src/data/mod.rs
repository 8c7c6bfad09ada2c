// mod.rs - Data structures module

pub mod alphabet;
pub mod cleaning;
pub mod dataset;
pub mod loaders;
pub mod validation;

// Re-export main types for convenience
pub use alphabet::{Alphabet, SymbolClass};
pub use cleaning::clean;
pub use dataset::{CellValue, Dataset, DatasetKind, SequenceRecord, SequenceSet, Table, TableRow};
pub use loaders::{load, InputFormat, LoadOptions};
pub use validation::{
    validate, Finding, IssueKind, Location, Severity, ValidatedDataset, ValidationPolicy,
    ValidationReport,
};
