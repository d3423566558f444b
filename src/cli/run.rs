use crate::cli::args::{Cli, DEFAULT_QUERIES};
use crate::core::engine::{self, RunConfig};
use crate::core::io;
use crate::core::kmer;
use crate::core::model::Profile;
use crate::report::freq;
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::env;
use std::io::{BufWriter, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub fn entry() -> Result<()> {
    run(Cli::parse())
}

fn run(args: Cli) -> Result<()> {
    let stats = stats_enabled();
    let t0 = Instant::now();

    if args.threads == 0 {
        bail!("--threads must be >= 1");
    }
    if args.input.as_os_str() != "-" && !args.input.is_file() {
        bail!("input file not found: {}", args.input.display());
    }

    let profile = Profile::default();
    profile.validate()?;

    let queries: Vec<String> = if args.queries.is_empty() {
        DEFAULT_QUERIES.iter().map(|s| s.to_string()).collect()
    } else {
        args.queries.clone()
    };
    // Queries are validated up front; nothing fails once counting starts.
    for query in &queries {
        kmer::encode(query.as_bytes()).with_context(|| format!("invalid query {query:?}"))?;
        let n = query.len() as u32;
        if !profile.lengths.contains(&n) {
            bail!("query {query:?} has length {n}, which is not in the counting profile");
        }
    }

    let t_load = Instant::now();
    let block = io::load_block(&args.input, &args.block)?;
    stage_done(stats, "load", t_load);
    if block.is_empty() {
        bail!("sequence block >{} is empty", args.block);
    }
    if stats {
        eprintln!(
            "NUCFREQ_STATS input={} block={} symbols={}",
            args.input.display(),
            args.block,
            block.len()
        );
    }

    let t_count = Instant::now();
    let output = engine::run(
        Arc::new(block),
        RunConfig {
            threads: args.threads,
            profile,
        },
    )?;
    stage_done(stats, "count", t_count);

    let t_report = Instant::now();
    let stdout = std::io::stdout().lock();
    let mut w = BufWriter::new(stdout);
    for window in output.profile.report_lengths() {
        freq::write_frequency(&mut w, &output, window)?;
    }
    for query in &queries {
        freq::write_exact_count(&mut w, &output, query)?;
    }
    w.flush()?;
    stage_done(stats, "report", t_report);

    if stats {
        eprintln!("NUCFREQ_STATS total={}", fmt_dur(t0.elapsed()));
    }

    Ok(())
}

fn stats_enabled() -> bool {
    matches!(env::var("NUCFREQ_STATS").as_deref(), Ok("1"))
}

fn stage_done(stats: bool, name: &str, t: Instant) {
    if stats {
        eprintln!("NUCFREQ_STATS stage={} time={}", name, fmt_dur(t.elapsed()));
    }
}

fn fmt_dur(d: Duration) -> String {
    if d.as_secs_f64() < 1.0 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.3}s", d.as_secs_f64())
    }
}
