// validation.rs - Input validation utilities

use crate::cli::args::Args;
use crate::cli::config::Config;
use crate::core::{AlignmentConfig, AnalysisConfig, DistanceMethod, DistanceMode, Metric, Tier};
use crate::data::{Alphabet, InputFormat, LoadOptions, ValidationPolicy};
use crate::hashers::HasherRegistry;
use crate::output::OutputFormat;
use crate::simulation::{NetworkSirParams, SirvParams};
use regex::Regex;
use std::path::Path;
use std::str::FromStr;

/// What the invocation will do once arguments are resolved
#[derive(Debug, Clone, PartialEq)]
pub enum RunMode {
    Analyze,
    Sirv(SirvParams),
    Network(NetworkSirParams),
}

pub struct ValidationResult {
    pub mode: RunMode,
    pub load_options: LoadOptions,
    pub policy: ValidationPolicy,
    pub analysis: AnalysisConfig,
    pub output_format: OutputFormat,
}

/// Validate all command line arguments. `config` supplies the optional
/// `[sirv]` / `[network]` parameter sections.
pub fn validate_args(args: &Args, config: Option<&Config>) -> Result<ValidationResult, String> {
    // Validate hasher type
    let registry = HasherRegistry::new();
    if !registry.has_hasher(&args.hasher) {
        return Err(format!(
            "Invalid hasher '{}'. Available: {}",
            args.hasher,
            registry.get_hasher_names().join(", ")
        ));
    }

    let output_format = OutputFormat::from_str(&args.output_format)?;

    let mode = match args.simulate.as_deref() {
        None => RunMode::Analyze,
        Some(kind) => simulation_mode(kind, args, config)?,
    };

    if mode == RunMode::Analyze && args.input.is_none() {
        return Err("--input is required unless --simulate is given".to_string());
    }
    if mode != RunMode::Analyze && output_format.needs_matrix() {
        return Err(format!(
            "Output format '{}' needs a distance matrix, which simulations do not produce",
            output_format
        ));
    }

    // Loader options
    let format = match &args.format {
        Some(name) => Some(InputFormat::from_str(name)?),
        None => args
            .input
            .as_deref()
            .and_then(|path| InputFormat::from_extension(Path::new(path))),
    };
    let alphabet = args.alphabet.as_deref().map(Alphabet::from_str).transpose()?;
    let load_options = LoadOptions {
        format,
        alphabet,
        missing_marker: args.missing_marker.clone(),
    };

    // Validate thresholds
    if !(0.0..=1.0).contains(&args.max_invalid_fraction) {
        return Err("Max invalid fraction must be between 0.0 and 1.0".to_string());
    }
    if !(0.0..=1.0).contains(&args.max_missing_fraction) {
        return Err("Max missing fraction must be between 0.0 and 1.0".to_string());
    }

    // Compile regex patterns
    let include_ids = compile(args.include_records.as_deref(), "include_records")?;
    let exclude_ids = compile(args.exclude_records.as_deref(), "exclude_records")?;

    let policy = ValidationPolicy {
        include_ids,
        exclude_ids,
        min_length: args.min_length,
        max_invalid_fraction: args.max_invalid_fraction,
        max_missing_fraction: args.max_missing_fraction,
        repair: args.repair,
    };

    let analysis = analysis_config(args, config)?;

    Ok(ValidationResult {
        mode,
        load_options,
        policy,
        analysis,
        output_format,
    })
}

fn compile(pattern: Option<&str>, name: &str) -> Result<Option<Regex>, String> {
    pattern
        .map(|p| Regex::new(p).map_err(|e| format!("Invalid {} regex: {}", name, e)))
        .transpose()
}

fn analysis_config(args: &Args, config: Option<&Config>) -> Result<AnalysisConfig, String> {
    let tier = Tier::from_str(&args.tier)?;
    let metrics = match &args.metrics {
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(Metric::from_str)
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    // Validate and create alignment config
    let alignment = if args.match_score.is_some()
        || args.mismatch_penalty.is_some()
        || args.gap_open.is_some()
        || args.gap_extend.is_some()
    {
        // Custom mode
        AlignmentConfig::custom(
            args.match_score.unwrap_or(2),
            args.mismatch_penalty.unwrap_or(-1),
            args.gap_open.unwrap_or(5),
            args.gap_extend.unwrap_or(2),
        )
    } else {
        // Preset mode
        AlignmentConfig::from_mode(&args.alignment_mode)?
    };

    let mut builder = AnalysisConfig::builder()
        .tier(tier)
        .metrics(metrics)
        .distance(DistanceMethod::from_str(&args.distance)?)
        .distance_mode(DistanceMode::from_str(&args.distance_mode)?)
        .alignment(alignment)
        .hasher(&args.hasher);
    if let Some(window) = args.window {
        builder = builder.window(window);
    }
    if let Some(step) = args.step {
        builder = builder.step(step);
    }
    if let Some(k) = args.k {
        builder = builder.k(k);
    }
    if let Some(threshold) = args.cluster_threshold {
        builder = builder.cluster_threshold(threshold);
    }
    if let Some(threshold) = args.z_threshold {
        builder = builder.z_threshold(threshold);
    }
    if let Some(sample_size) = args.sample_size {
        builder = builder.sample_size(sample_size);
    }
    if let Some(seed) = args.seed.or_else(|| config.and_then(|c| c.seed)) {
        builder = builder.seed(seed);
    }
    builder.build().map_err(|e| e.to_string())
}

fn simulation_mode(kind: &str, args: &Args, config: Option<&Config>) -> Result<RunMode, String> {
    match kind.to_lowercase().as_str() {
        "sirv" => {
            let mut params = config.and_then(|c| c.sirv.clone()).unwrap_or_default();
            if let Some(days) = args.days {
                params.days = days;
            }
            if let Some(temperature) = args.temperature {
                params.temperature = temperature;
            }
            if let Some(mobility) = args.mobility {
                params.mobility = mobility;
            }
            if let Some(fraction) = args.vaccinated_fraction {
                params.vaccinated_fraction = fraction;
            }
            params.validate().map_err(|e| e.to_string())?;
            Ok(RunMode::Sirv(params))
        }
        "network" => {
            let mut params = config.and_then(|c| c.network.clone()).unwrap_or_default();
            if let Some(nodes) = args.nodes {
                params.nodes = nodes;
            }
            if let Some(steps) = args.steps {
                params.steps = steps;
            }
            // Only an explicit --seed overrides the section
            if let Some(seed) = args.seed {
                params.seed = seed;
            }
            params.validate().map_err(|e| e.to_string())?;
            Ok(RunMode::Network(params))
        }
        _ => Err(format!("Invalid simulation: {}. Use: sirv, network", kind)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argh::FromArgs;

    fn parse(args: &[&str]) -> Args {
        Args::from_args(&["bioenv"], args).unwrap()
    }

    #[test]
    fn test_analysis_arguments() {
        let args = parse(&[
            "--input", "reads.fasta", "--tier", "advanced", "--metrics", "length, kmer-distance",
            "--k", "3", "--include-records", "^s",
        ]);
        let result = validate_args(&args, None).unwrap();

        assert_eq!(result.mode, RunMode::Analyze);
        assert_eq!(result.load_options.format, Some(InputFormat::Fasta));
        assert_eq!(result.analysis.tier, Tier::Advanced);
        assert_eq!(result.analysis.metrics, vec![Metric::Length, Metric::KmerDistance]);
        assert_eq!(result.analysis.k, 3);
        assert!(result.policy.include_ids.is_some());
        assert_eq!(result.output_format, OutputFormat::Json);
    }

    #[test]
    fn test_input_required_for_analysis() {
        assert!(validate_args(&parse(&[]), None).is_err());
    }

    #[test]
    fn test_non_positive_window_rejected() {
        let args = parse(&["--input", "t.csv", "--window", "0"]);
        assert!(validate_args(&args, None).is_err());
    }

    #[test]
    fn test_advanced_metric_needs_advanced_tier() {
        let args = parse(&["--input", "t.fa", "--metrics", "alignment"]);
        assert!(validate_args(&args, None).is_err());
    }

    #[test]
    fn test_bad_regex_and_fraction() {
        let args = parse(&["--input", "t.fa", "--exclude-records", "("]);
        assert!(validate_args(&args, None).is_err());
        let args = parse(&["--input", "t.fa", "--max-missing-fraction", "1.5"]);
        assert!(validate_args(&args, None).is_err());
    }

    #[test]
    fn test_simulation_uses_config_section() {
        let config = Config::from_toml("[sirv]\ndays = 30\n").unwrap();
        let args = parse(&["--simulate", "sirv", "--temperature", "4.5"]);
        let result = validate_args(&args, Some(&config)).unwrap();
        match result.mode {
            RunMode::Sirv(params) => {
                assert_eq!(params.days, 30);
                assert_eq!(params.temperature, 4.5);
            }
            other => panic!("unexpected mode {:?}", other),
        }
    }

    #[test]
    fn test_network_section_seed_kept() {
        let config = Config::from_toml("seed = 42\n[network]\nseed = 7\n").unwrap();
        let args = parse(&["--simulate", "network"]).merge_with_config(&config);
        let result = validate_args(&args, Some(&config)).unwrap();
        match result.mode {
            RunMode::Network(params) => assert_eq!(params.seed, 7),
            other => panic!("unexpected mode {:?}", other),
        }
        assert_eq!(result.analysis.seed, 42);

        let args = parse(&["--simulate", "network", "--seed", "3"]).merge_with_config(&config);
        match validate_args(&args, Some(&config)).unwrap().mode {
            RunMode::Network(params) => assert_eq!(params.seed, 3),
            other => panic!("unexpected mode {:?}", other),
        }
    }

    #[test]
    fn test_simulation_rejects_matrix_output() {
        let args = parse(&["--simulate", "network", "--output-format", "phylip"]);
        assert!(validate_args(&args, None).is_err());
    }
}
