use crate::core::engine::RunOutput;
use crate::core::kmer;
use anyhow::{Context, Result};
use std::io::Write;

#[derive(Clone, Debug)]
pub struct FrequencyRow {
    pub sequence: String,
    pub count: u64,
    pub percent: f64,
}

/// Merged frequency distribution for one window length, sorted by count
/// descending with ties broken by decoded sequence ascending.
pub fn frequency_rows(output: &RunOutput, window: u32) -> Result<Vec<FrequencyRow>> {
    let index = output
        .length_index(window)
        .with_context(|| format!("window length {window} is not in the counting profile"))?;
    let merged = output.merged(index);
    let total: u64 = merged.values().sum();
    let mut rows: Vec<FrequencyRow> = merged
        .into_iter()
        .map(|(key, count)| FrequencyRow {
            sequence: kmer::decode(key, window),
            count,
            percent: if total == 0 {
                0.0
            } else {
                100.0 * count as f64 / total as f64
            },
        })
        .collect();
    rows.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.sequence.cmp(&b.sequence))
    });
    Ok(rows)
}

/// `SEQ percentage` lines with three decimal digits, followed by a blank
/// separator line.
pub fn write_frequency(w: &mut impl Write, output: &RunOutput, window: u32) -> Result<()> {
    for row in frequency_rows(output, window)? {
        writeln!(w, "{} {:.3}", row.sequence, row.percent)?;
    }
    writeln!(w)?;
    Ok(())
}

/// `count<TAB>SEQ` line for one literal subsequence, in canonical display
/// casing. A subsequence that never occurs reports zero.
pub fn write_exact_count(w: &mut impl Write, output: &RunOutput, literal: &str) -> Result<()> {
    let window = literal.len() as u32;
    let index = output.length_index(window).with_context(|| {
        format!("no counts for window length {window} (query {literal:?})")
    })?;
    let key = kmer::encode(literal.as_bytes())
        .with_context(|| format!("invalid query {literal:?}"))?;
    let count = output.exact_count(index, key);
    writeln!(w, "{}\t{}", count, kmer::decode(key, window))?;
    Ok(())
}
