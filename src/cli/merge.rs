// merge.rs - Merge configuration file with CLI arguments

use crate::cli::{Args, Config};

fn fill<T>(cli: &mut Option<T>, file: Option<T>) {
    if cli.is_none() {
        *cli = file;
    }
}

fn fill_default(cli: &mut String, default: &str, file: Option<String>) {
    if cli.as_str() == default {
        if let Some(value) = file {
            *cli = value;
        }
    }
}

impl Args {
    /// Merge with configuration from file
    /// CLI arguments take precedence over config file values
    pub fn merge_with_config(mut self, config: &Config) -> Self {
        let config = config.clone();

        // Input/Output
        fill(&mut self.input, config.input);
        fill(&mut self.format, config.format);
        fill(&mut self.alphabet, config.alphabet);
        fill(&mut self.output, config.output);
        fill_default(&mut self.missing_marker, "-", config.missing_marker);
        fill_default(&mut self.output_format, "json", config.output_format);

        // Analysis (string settings only override defaults, not explicit CLI values)
        fill_default(&mut self.tier, "basic", config.tier);
        if self.metrics.is_none() {
            self.metrics = config.metrics.map(|list| list.join(","));
        }
        fill(&mut self.window, config.window);
        fill(&mut self.step, config.step);
        fill(&mut self.k, config.k);
        fill_default(&mut self.distance, "identity", config.distance);
        fill_default(&mut self.distance_mode, "snps", config.distance_mode);
        fill(&mut self.cluster_threshold, config.cluster_threshold);
        fill(&mut self.z_threshold, config.z_threshold);
        fill(&mut self.sample_size, config.sample_size);
        // `seed` is not merged: the file's top-level seed is for analysis
        // sampling only, and must not override `[network].seed`
        fill_default(&mut self.hasher, "sha256", config.hasher);

        // Alignment settings
        fill_default(&mut self.alignment_mode, "dna", config.alignment_mode);
        fill(&mut self.match_score, config.match_score);
        fill(&mut self.mismatch_penalty, config.mismatch_penalty);
        fill(&mut self.gap_open, config.gap_open);
        fill(&mut self.gap_extend, config.gap_extend);

        // Validation filters
        fill(&mut self.include_records, config.include_records);
        fill(&mut self.exclude_records, config.exclude_records);
        if self.min_length == 0 {
            if let Some(min_length) = config.min_length {
                self.min_length = min_length;
            }
        }
        if self.max_invalid_fraction == 1.0 {
            if let Some(fraction) = config.max_invalid_fraction {
                self.max_invalid_fraction = fraction;
            }
        }
        if self.max_missing_fraction == 1.0 {
            if let Some(fraction) = config.max_missing_fraction {
                self.max_missing_fraction = fraction;
            }
        }

        // Performance
        fill(&mut self.threads, config.threads);

        // Flags (CLI flags take precedence, config only sets if not explicitly set)
        if !self.repair && config.repair.unwrap_or(false) {
            self.repair = true;
        }
        if !self.dry_run && config.dry_run.unwrap_or(false) {
            self.dry_run = true;
        }
        if !self.progress && config.progress.unwrap_or(false) {
            self.progress = true;
        }

        // Simulation selection; parameter sections are read during validation
        fill(&mut self.simulate, config.simulate);

        self
    }

    /// Load configuration and merge with CLI args; the parsed file is
    /// returned too so its simulation sections can seed the parameters
    pub fn with_config_file(self, config_path: &str) -> Result<(Self, Config), String> {
        let config = Config::from_file(config_path)?;
        Ok((self.merge_with_config(&config), config))
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
    fn test_cli_wins_over_file() {
        let config = Config::from_toml(
            "input = \"file.fa\"\ntier = \"advanced\"\nwindow = 20\ndistance = \"kmer\"\nrepair = true\n",
        )
        .unwrap();
        let args = parse(&["--input", "cli.fa", "--window", "10"]).merge_with_config(&config);

        assert_eq!(args.input.as_deref(), Some("cli.fa"));
        assert_eq!(args.window, Some(10));
        assert_eq!(args.tier, "advanced");
        assert_eq!(args.distance, "kmer");
        assert!(args.repair);
    }

    #[test]
    fn test_explicit_string_flag_kept() {
        let config = Config::from_toml("output_format = \"tsv\"\nmetrics = [\"length\", \"gc-content\"]\n").unwrap();
        let args = parse(&["--output-format", "nexus"]).merge_with_config(&config);
        assert_eq!(args.output_format, "nexus");
        assert_eq!(args.metrics.as_deref(), Some("length,gc-content"));
    }

    #[test]
    fn test_file_seed_left_unmerged() {
        let config = Config::from_toml("seed = 42\n").unwrap();
        let args = parse(&[]).merge_with_config(&config);
        assert_eq!(args.seed, None);
    }
}
