// args.rs - Command line arguments definition

use argh::FromArgs;

#[derive(FromArgs)]
/// bioenv - Dataset validation, sequence/table analysis and epidemic simulation
pub struct Args {
    /// input dataset (FASTA, CSV or TSV)
    #[argh(option)]
    pub input: Option<String>,

    /// input format: fasta, csv, tsv (default: inferred from extension, then content)
    #[argh(option)]
    pub format: Option<String>,

    /// sequence alphabet: dna, rna, protein (default: majority-inferred)
    #[argh(option)]
    pub alphabet: Option<String>,

    /// extra table cell value treated as missing (default: -)
    #[argh(option, default = "String::from(\"-\")")]
    pub missing_marker: String,

    /// analysis tier: basic, advanced (default: basic)
    #[argh(option, default = "String::from(\"basic\")")]
    pub tier: String,

    /// comma-separated metrics to run (default: every metric of the tier that fits the dataset)
    #[argh(option)]
    pub metrics: Option<String>,

    /// sliding window length for windowed GC (default: 100)
    #[argh(option)]
    pub window: Option<i64>,

    /// sliding window step (default: 50)
    #[argh(option)]
    pub step: Option<i64>,

    /// k-mer length for k-mer distance (default: 4)
    #[argh(option)]
    pub k: Option<i64>,

    /// distance feeding clusters and outliers: identity, alignment, kmer (default: identity)
    #[argh(option, default = "String::from(\"identity\")")]
    pub distance: String,

    /// alignment distance mode: snps, snps-indel-events, snps-indel-bases, hamming (default: snps)
    #[argh(option, default = "String::from(\"snps\")")]
    pub distance_mode: String,

    /// alignment mode: dna, dna-strict, dna-permissive, protein (default: dna)
    #[argh(option, default = "String::from(\"dna\")")]
    pub alignment_mode: String,

    /// custom match score (overrides preset mode, enables custom mode)
    #[argh(option)]
    pub match_score: Option<i32>,

    /// custom mismatch penalty (overrides preset mode, enables custom mode)
    #[argh(option)]
    pub mismatch_penalty: Option<i32>,

    /// custom gap open penalty (overrides preset mode, enables custom mode)
    #[argh(option)]
    pub gap_open: Option<i32>,

    /// custom gap extend penalty (overrides preset mode, enables custom mode)
    #[argh(option)]
    pub gap_extend: Option<i32>,

    /// maximum distance joining two records into one cluster (default: 0.1)
    #[argh(option)]
    pub cluster_threshold: Option<f64>,

    /// z-score above which a record is flagged as outlier (default: 2.0)
    #[argh(option)]
    pub z_threshold: Option<f64>,

    /// compare only a seeded random sample of this many records
    #[argh(option)]
    pub sample_size: Option<i64>,

    /// random seed for sampling and network simulation (default: 42)
    #[argh(option)]
    pub seed: Option<u64>,

    /// dataset fingerprint hasher: crc32, sha256, md5 (default: sha256)
    #[argh(option, default = "String::from(\"sha256\")")]
    pub hasher: String,

    /// keep only records whose id matches this regex
    #[argh(option)]
    pub include_records: Option<String>,

    /// drop records whose id matches this regex
    #[argh(option)]
    pub exclude_records: Option<String>,

    /// drop sequences shorter than this (default: 0)
    #[argh(option, default = "0")]
    pub min_length: usize,

    /// drop sequences whose invalid-symbol fraction exceeds this (0.0-1.0, default: 1.0)
    #[argh(option, default = "1.0")]
    pub max_invalid_fraction: f64,

    /// drop rows whose missing-cell fraction exceeds this (0.0-1.0, default: 1.0)
    #[argh(option, default = "1.0")]
    pub max_missing_fraction: f64,

    /// repair invalid symbols and stray text cells instead of keeping them
    #[argh(switch)]
    pub repair: bool,

    /// run a simulation instead of an analysis: sirv, network
    #[argh(option)]
    pub simulate: Option<String>,

    /// simulated days for sirv
    #[argh(option)]
    pub days: Option<usize>,

    /// ambient temperature in °C for sirv
    #[argh(option)]
    pub temperature: Option<f64>,

    /// contact multiplier for sirv
    #[argh(option)]
    pub mobility: Option<f64>,

    /// vaccinated population fraction for sirv
    #[argh(option)]
    pub vaccinated_fraction: Option<f64>,

    /// network size for network simulation
    #[argh(option)]
    pub nodes: Option<usize>,

    /// simulated steps for network simulation
    #[argh(option)]
    pub steps: Option<usize>,

    /// output file for the packaged result
    #[argh(option)]
    pub output: Option<String>,

    /// output format: json, msgpack, tsv, phylip, nexus (default: json)
    #[argh(option, default = "String::from(\"json\")")]
    pub output_format: String,

    /// number of threads (default: auto-detect)
    #[argh(option)]
    pub threads: Option<usize>,

    /// validate inputs without computation (dry run)
    #[argh(switch)]
    pub dry_run: bool,

    /// show progress bars for pairwise computations
    #[argh(switch)]
    pub progress: bool,

    /// path to TOML configuration file
    #[argh(option)]
    pub config: Option<String>,

    /// generate sample configuration file and exit
    #[argh(switch)]
    pub generate_config: bool,
}
