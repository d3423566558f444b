use nucfreq::core::engine::{self, CountTable, RunConfig, RunOutput};
use nucfreq::core::io::{self, SequenceBlock};
use nucfreq::core::kmer;
use nucfreq::core::model::Profile;
use nucfreq::report::freq;
use proptest::prelude::*;
use std::sync::Arc;

fn run_on(seq: &[u8], threads: usize) -> RunOutput {
    engine::run(
        Arc::new(SequenceBlock::from_bytes(seq.to_vec())),
        RunConfig {
            threads,
            profile: Profile::default(),
        },
    )
    .unwrap()
}

/// Single-threaded stride-1 baseline over every window position.
fn naive_counts(seq: &[u8], window: usize) -> CountTable {
    let mut counts = CountTable::new();
    if seq.len() < window {
        return counts;
    }
    for start in 0..=seq.len() - window {
        let key = kmer::encode(&seq[start..start + window]).unwrap();
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

fn naive_occurrences(seq: &[u8], literal: &str) -> u64 {
    let window = literal.len();
    if seq.len() < window {
        return 0;
    }
    (0..=seq.len() - window)
        .filter(|&i| seq[i..i + window].eq_ignore_ascii_case(literal.as_bytes()))
        .count() as u64
}

#[test]
fn pipeline_reproduces_the_reference_output() {
    let fasta = b">ONE unrelated\nGATTACA\n>THREE the block under test\nacacacacac\n";
    let block = io::extract_block(fasta, "THREE").unwrap();
    let output = engine::run(
        Arc::new(block),
        RunConfig {
            threads: 4,
            profile: Profile::default(),
        },
    )
    .unwrap();

    let mut out = Vec::new();
    for window in output.profile.report_lengths() {
        freq::write_frequency(&mut out, &output, window).unwrap();
    }
    freq::write_exact_count(&mut out, &output, "GGT").unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "A 50.000\nC 50.000\n\nAC 55.556\nCA 44.444\n\n0\tGGT\n"
    );
}

#[test]
fn thread_count_does_not_change_counts() {
    let seq: Vec<u8> = b"GGTATTTTAATTTATAGTACGTTGCAACGTAAGGCCTTACGATC"
        .iter()
        .cycle()
        .take(1100)
        .copied()
        .collect();
    let baseline = run_on(&seq, 1);
    let parallel = run_on(&seq, 8);
    for index in 0..baseline.profile.lengths.len() {
        assert_eq!(baseline.merged(index), parallel.merged(index));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn parallel_decomposition_is_count_equivalent(
        seq in prop::collection::vec(prop::sample::select(b"ACGTacgt".to_vec()), 18..300),
        threads in 1usize..=6,
    ) {
        let output = run_on(&seq, threads);
        for (index, &window) in output.profile.lengths.clone().iter().enumerate() {
            prop_assert_eq!(
                output.merged(index),
                naive_counts(&seq, window as usize),
                "window length {}", window
            );
        }
    }

    #[test]
    fn exact_count_matches_naive_occurrences(
        seq in prop::collection::vec(prop::sample::select(b"ACGTacgt".to_vec()), 18..200),
        at in 0usize..180,
    ) {
        let output = run_on(&seq, 3);
        // Query a window actually present plus one that may not be.
        let window = 6usize;
        let start = at.min(seq.len() - window);
        let literal = String::from_utf8(seq[start..start + window].to_vec()).unwrap();
        let index = output.length_index(window as u32).unwrap();
        let key = kmer::encode(literal.as_bytes()).unwrap();
        prop_assert_eq!(output.exact_count(index, key), naive_occurrences(&seq, &literal));

        let absent = kmer::encode(b"GGTATTTTAATT").unwrap();
        let index12 = output.length_index(12).unwrap();
        prop_assert_eq!(
            output.exact_count(index12, absent),
            naive_occurrences(&seq, "GGTATTTTAATT")
        );
    }

    #[test]
    fn report_rows_are_sorted_and_sum_to_100(
        seq in prop::collection::vec(prop::sample::select(b"ACGT".to_vec()), 20..200),
    ) {
        let output = run_on(&seq, 4);
        for window in [1u32, 2] {
            let rows = freq::frequency_rows(&output, window).unwrap();
            for pair in rows.windows(2) {
                let ordered = pair[0].count > pair[1].count
                    || (pair[0].count == pair[1].count && pair[0].sequence < pair[1].sequence);
                prop_assert!(ordered, "rows out of order for window {}", window);
            }
            let sum: f64 = rows.iter().map(|r| r.percent).sum();
            prop_assert!((sum - 100.0).abs() < 1e-6);
        }
    }
}
