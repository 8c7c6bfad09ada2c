// mod.rs - Epidemic simulation models

pub mod network;
pub mod sirv;

// Re-export main types for convenience
pub use network::{simulate_network, NetworkSirParams};
pub use sirv::{simulate_sirv, SirvParams};

use crate::error::{BioenvError, Result};

/// Probabilities and fractions: finite and within [0, 1]
pub(crate) fn check_unit(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(BioenvError::Config(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

pub(crate) fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(BioenvError::Config(format!(
            "{} must be a non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}

pub(crate) fn check_finite(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(BioenvError::Config(format!("{} must be finite, got {}", name, value)));
    }
    Ok(())
}

/// Index labels "0", "1", ... for time series
pub(crate) fn time_labels(n: usize) -> Vec<String> {
    (0..n).map(|t| t.to_string()).collect()
}
