// session.rs - Per-user session state: current dataset and last result

use crate::core::cancel::CancelToken;
use crate::core::config::AnalysisConfig;
use crate::core::engine::AnalysisEngine;
use crate::core::result::AnalysisResult;
use crate::data::{load, LoadOptions, ValidatedDataset, ValidationPolicy, ValidationReport};
use crate::error::{BioenvError, Result};
use crate::output::package::{package, PackagedResult};
use crate::simulation::{simulate_network, simulate_sirv, NetworkSirParams, SirvParams};
use log::info;
use std::sync::Arc;

/// State owned by one interactive user. Sessions share nothing.
#[derive(Debug, Default)]
pub struct Session {
    engine: AnalysisEngine,
    dataset: Option<ValidatedDataset>,
    last_result: Option<Arc<AnalysisResult>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(engine: AnalysisEngine) -> Self {
        Self {
            engine,
            ..Self::default()
        }
    }

    /// Load and validate an upload. On success the dataset replaces the
    /// current one and the previous result is dropped; on failure the
    /// session is left as it was.
    pub fn upload(
        &mut self,
        bytes: &[u8],
        options: &LoadOptions,
        policy: &ValidationPolicy,
    ) -> Result<&ValidationReport> {
        let dataset = load(bytes, options)?;
        let validated = ValidatedDataset::new(dataset, policy)?;
        info!(
            "Session dataset replaced: {} usable records",
            validated.dataset().len()
        );
        self.last_result = None;
        let validated = self.dataset.insert(validated);
        Ok(validated.report())
    }

    pub fn dataset(&self) -> Option<&ValidatedDataset> {
        self.dataset.as_ref()
    }

    pub fn last_result(&self) -> Option<Arc<AnalysisResult>> {
        self.last_result.clone()
    }

    /// Analyze the current dataset; the result becomes the session's last result
    pub fn analyze(&mut self, config: &AnalysisConfig, cancel: &CancelToken) -> Result<Arc<AnalysisResult>> {
        let dataset = self.dataset.as_ref().ok_or(BioenvError::NoDataset)?;
        let result = Arc::new(self.engine.run(dataset, config, cancel)?);
        self.last_result = Some(Arc::clone(&result));
        Ok(result)
    }

    pub fn simulate_sirv(&mut self, params: &SirvParams, cancel: &CancelToken) -> Result<Arc<AnalysisResult>> {
        let result = Arc::new(simulate_sirv(params, cancel)?);
        self.last_result = Some(Arc::clone(&result));
        Ok(result)
    }

    pub fn simulate_network(
        &mut self,
        params: &NetworkSirParams,
        cancel: &CancelToken,
    ) -> Result<Arc<AnalysisResult>> {
        let result = Arc::new(simulate_network(params, cancel)?);
        self.last_result = Some(Arc::clone(&result));
        Ok(result)
    }

    /// Package the last result, if any
    pub fn package_last(&self) -> Result<Option<PackagedResult>> {
        self.last_result
            .as_deref()
            .map(package)
            .transpose()
    }

    /// Drop the dataset and the last result
    pub fn clear(&mut self) {
        self.dataset = None;
        self.last_result = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FASTA: &[u8] = b">a\nACGTACGT\n>b\nACGTACGA\n>c\nGGGGCCCC\n";

    #[test]
    fn test_analyze_without_dataset() {
        let mut session = Session::new();
        assert!(matches!(
            session.analyze(&AnalysisConfig::default(), &CancelToken::new()),
            Err(BioenvError::NoDataset)
        ));
    }

    #[test]
    fn test_upload_analyze_package() {
        let mut session = Session::new();
        let report = session
            .upload(FASTA, &LoadOptions::default(), &ValidationPolicy::default())
            .unwrap();
        assert!(report.is_usable());

        let result = session
            .analyze(&AnalysisConfig::default(), &CancelToken::new())
            .unwrap();
        assert!(result.get("length").is_some());

        let packaged = session.package_last().unwrap().unwrap();
        assert!(packaged.series("length").is_some());
    }

    #[test]
    fn test_failed_upload_keeps_state() {
        let mut session = Session::new();
        session
            .upload(FASTA, &LoadOptions::default(), &ValidationPolicy::default())
            .unwrap();
        session
            .analyze(&AnalysisConfig::default(), &CancelToken::new())
            .unwrap();

        assert!(session
            .upload(b"  \n", &LoadOptions::default(), &ValidationPolicy::default())
            .is_err());
        assert_eq!(session.dataset().map(|d| d.dataset().len()), Some(3));
        assert!(session.last_result().is_some());
    }

    #[test]
    fn test_reupload_drops_result_and_clear() {
        let mut session = Session::new();
        session
            .upload(FASTA, &LoadOptions::default(), &ValidationPolicy::default())
            .unwrap();
        session
            .simulate_sirv(&SirvParams::default(), &CancelToken::new())
            .unwrap();
        assert!(session.last_result().is_some());

        session
            .upload(b">x\nACGT\n", &LoadOptions::default(), &ValidationPolicy::default())
            .unwrap();
        assert!(session.last_result().is_none());

        session.clear();
        assert!(session.dataset().is_none());
        assert!(session.package_last().unwrap().is_none());
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut first = Session::new();
        let second = Session::new();
        first
            .upload(FASTA, &LoadOptions::default(), &ValidationPolicy::default())
            .unwrap();
        assert!(first.dataset().is_some());
        assert!(second.dataset().is_none());
    }
}
