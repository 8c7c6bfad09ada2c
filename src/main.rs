// main.rs - CLI entry point

use bioenv::cli::{Config, RunMode};
use bioenv::data::Severity;
use bioenv::output::write_result;
use bioenv::prelude::*;
use std::path::Path;
use std::time::Instant;

fn main() {
    if let Err(e) = run_main() {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), String> {
    let mut args: Args = argh::from_env();
    let command_line = std::env::args().collect::<Vec<String>>().join(" ");

    // Handle generate config first
    if args.generate_config {
        let sample_config = Config::generate_sample();
        println!("{}", sample_config);
        println!("\n💡 Save this content to a .toml file and use --config /path/to/config.toml");
        return Ok(());
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Load configuration file if specified
    let mut config: Option<Config> = None;
    if let Some(config_path) = args.config.clone() {
        let (merged, file_config) = args.with_config_file(&config_path)?;
        args = merged;
        config = Some(file_config);
    }

    // Validate all arguments
    let validation_result = validate_args(&args, config.as_ref())?;

    let output_path = if args.dry_run {
        None
    } else {
        Some(args.output.clone().ok_or("--output is required")?)
    };

    println!("🚀 {}", bioenv::get_info());

    // Configure thread pool
    if let Some(n) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .map_err(|e| format!("Failed to configure thread pool: {}", e))?;
        println!("🧵 Threads: {}", n);
    } else {
        let num_threads = rayon::current_num_threads();
        println!("🧵 Threads: {} (auto-detected)", num_threads);
    }

    let total_start = Instant::now();
    let cancel = CancelToken::new();
    let mut session = Session::with_engine(AnalysisEngine::new().with_progress(args.progress));

    match &validation_result.mode {
        RunMode::Analyze => {
            let input = args.input.as_deref().ok_or("--input is required")?;
            let bytes = std::fs::read(input)
                .map_err(|e| format!("Failed to read input '{}': {}", input, e))?;
            println!("📂 Input: {} ({} bytes)", input, bytes.len());

            let report = session
                .upload(&bytes, &validation_result.load_options, &validation_result.policy)
                .map_err(|e| e.to_string())?;
            print_report(report);

            let dataset = session.dataset().ok_or("no dataset after upload")?.dataset();
            println!(
                "📊 Dataset: {} {} record(s)",
                dataset.len(),
                dataset.kind()
            );

            if args.dry_run {
                println!("✅ Dry run completed successfully");
                return Ok(());
            }

            let analysis = &validation_result.analysis;
            println!("🎯 Tier: {}", analysis.tier);
            if !analysis.metrics.is_empty() {
                let names: Vec<&str> = analysis.metrics.iter().map(|m| m.name()).collect();
                println!("📏 Metrics: {}", names.join(", "));
            }
            println!(
                "📐 Distance: {} ({})",
                analysis.distance,
                analysis.distance.description()
            );

            println!("\n🔄 Running analysis...");
            let result = session.analyze(analysis, &cancel).map_err(|e| e.to_string())?;
            println!("✅ Computed {} result entries", result.len());
        }
        RunMode::Sirv(params) => {
            println!(
                "\n🦠 SIR-V simulation: {} days, R0 = {:.3}",
                params.days,
                params.basic_reproduction_number()
            );
            if args.dry_run {
                println!("✅ Dry run completed successfully");
                return Ok(());
            }
            session.simulate_sirv(params, &cancel).map_err(|e| e.to_string())?;
        }
        RunMode::Network(params) => {
            println!(
                "\n🕸️  Network SIR simulation: {} nodes, {} steps, seed {}",
                params.nodes, params.steps, params.seed
            );
            if args.dry_run {
                println!("✅ Dry run completed successfully");
                return Ok(());
            }
            session.simulate_network(params, &cancel).map_err(|e| e.to_string())?;
        }
    }

    let packaged = session
        .package_last()
        .map_err(|e| e.to_string())?
        .ok_or("no result to package")?;

    let output_path = output_path.ok_or("--output is required")?;
    write_result(
        Path::new(&output_path),
        validation_result.output_format,
        &packaged,
        &command_line,
    )
    .map_err(|e| format!("writing output: {}", e))?;

    println!("\n🎉 === BIOENV COMPLETED SUCCESSFULLY ===");
    println!(
        "📊 {} scalar(s), {} series, {} table(s)",
        packaged.scalars.len(),
        packaged.series.len(),
        packaged.tables.len()
    );
    println!(
        "⏱️  Total time: {:.2}s",
        total_start.elapsed().as_secs_f64()
    );
    println!("📁 Output written to: {}", output_path);
    println!("🔧 Command: {}", command_line);

    Ok(())
}

fn print_report(report: &ValidationReport) {
    println!(
        "🔍 Validation: {} record(s) checked, {} excluded, {} warning(s)",
        report.records_checked,
        report.excluded.len(),
        report.count(Severity::Warning)
    );
    for finding in report
        .findings
        .iter()
        .filter(|f| f.severity != Severity::Info)
        .take(20)
    {
        println!("   ⚠️  {}", finding);
    }
    let shown = report
        .findings
        .iter()
        .filter(|f| f.severity != Severity::Info)
        .count();
    if shown > 20 {
        println!("   ... and {} more", shown - 20);
    }
}
