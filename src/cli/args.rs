use clap::Parser;
use std::path::PathBuf;

/// The five classic query subsequences, reported when no --query is given.
pub const DEFAULT_QUERIES: [&str; 5] = [
    "GGT",
    "GGTA",
    "GGTATT",
    "GGTATTTTAATT",
    "GGTATTTTAATTTATAGT",
];

#[derive(Parser)]
#[command(
    name = "nucfreq",
    version,
    about = "Parallel k-nucleotide frequency counter for FASTA input"
)]
pub struct Cli {
    /// FASTA input path, or `-` for stdin.
    #[arg(default_value = "-")]
    pub input: PathBuf,

    #[arg(long, default_value_t = num_cpus::get())]
    pub threads: usize,

    /// Header prefix of the sequence block to analyze.
    #[arg(long, default_value = "THREE")]
    pub block: String,

    /// Literal subsequence to report an exact count for (repeatable).
    #[arg(long = "query", value_name = "SEQ")]
    pub queries: Vec<String>,
}
