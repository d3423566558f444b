use crate::core::io::SequenceBlock;
use crate::core::model::Profile;
use crate::core::queue::{Task, TaskQueue};
use crate::core::scanner::{Register, RegisterWidth, Scanner};
use ahash::AHashMap;
use anyhow::{Result, bail};
use crossbeam_channel as channel;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Occurrence counts for one window length, keyed by packed k-mer. Private
/// to one worker during counting; merged only after every worker has joined.
pub type CountTable = AHashMap<u64, u64>;

pub struct RunConfig {
    pub threads: usize,
    pub profile: Profile,
}

pub struct RunOutput {
    pub profile: Profile,
    /// `tables[worker][index]` is the worker's table for `profile.lengths[index]`.
    pub tables: Vec<Vec<CountTable>>,
}

#[derive(Clone, Copy, Debug, Default)]
struct WorkerStats {
    tasks: u64,
    windows: u64,
}

pub fn run(block: Arc<SequenceBlock>, cfg: RunConfig) -> Result<RunOutput> {
    cfg.profile.validate()?;
    if cfg.threads == 0 {
        bail!("thread count must be >= 1");
    }

    let stats = stats_enabled();
    let t_count = Instant::now();
    let queue = Arc::new(TaskQueue::new(cfg.profile.clone()));
    let (result_tx, result_rx) = channel::unbounded::<(usize, Vec<CountTable>)>();
    let (stats_tx, stats_rx) = channel::unbounded::<WorkerStats>();

    let mut workers = Vec::with_capacity(cfg.threads);
    for id in 0..cfg.threads {
        let block = Arc::clone(&block);
        let queue = Arc::clone(&queue);
        let tx = result_tx.clone();
        let stats_tx = stats_tx.clone();
        let stats_enabled = stats;
        workers.push(thread::spawn(move || {
            let (tables, wstats) = worker_loop(block.bytes(), &queue);
            let _ = tx.send((id, tables));
            if stats_enabled {
                let _ = stats_tx.send(wstats);
            }
        }));
    }
    drop(result_tx);
    drop(stats_tx);

    let mut parts: Vec<Option<Vec<CountTable>>> = (0..cfg.threads).map(|_| None).collect();
    for (id, tables) in result_rx.iter() {
        parts[id] = Some(tables);
    }
    for worker in workers {
        let _ = worker.join();
    }

    let tables: Vec<Vec<CountTable>> = parts.into_iter().flatten().collect();
    if tables.len() != cfg.threads {
        bail!("a worker thread exited without reporting results");
    }

    if stats {
        let mut total = WorkerStats::default();
        for ws in stats_rx.iter() {
            total.tasks += ws.tasks;
            total.windows += ws.windows;
        }
        eprintln!(
            "NUCFREQ_STATS workers={} tasks={} windows={} count={}",
            cfg.threads,
            total.tasks,
            total.windows,
            fmt_dur(t_count.elapsed())
        );
    }

    Ok(RunOutput {
        profile: cfg.profile,
        tables,
    })
}

/// Pull tasks until the queue is exhausted, counting into private tables,
/// one per configured window length.
fn worker_loop(data: &[u8], queue: &TaskQueue) -> (Vec<CountTable>, WorkerStats) {
    let profile = queue.profile();
    let mut tables: Vec<CountTable> = profile.lengths.iter().map(|_| CountTable::new()).collect();
    let mut stats = WorkerStats::default();
    while let Some(task) = queue.claim() {
        let stride = profile.stride(task.window);
        let table = &mut tables[task.index];
        stats.windows += match RegisterWidth::for_length(task.window) {
            RegisterWidth::W32 => scan_task::<u32>(data, task, stride, table),
            RegisterWidth::W64 => scan_task::<u64>(data, task, stride, table),
        };
        stats.tasks += 1;
    }
    (tables, stats)
}

/// Scan one task's sub-range: every window position for stride 1, or the
/// non-overlapping windows congruent to the task offset for stride N. Stops
/// while the scanner still has a full window of symbols ahead, which keeps
/// the extractor inside the buffer by construction.
fn scan_task<R: Register>(data: &[u8], task: Task, stride: u32, table: &mut CountTable) -> u64 {
    let mut scanner = Scanner::<R>::new(data, task.offset as usize, task.window);
    let window = task.window as usize;
    let mut remaining = data.len().saturating_sub(task.offset as usize);
    let mut windows = 0u64;
    while remaining >= window {
        let key = scanner.next(stride);
        *table.entry(key).or_insert(0) += 1;
        remaining -= stride as usize;
        windows += 1;
    }
    windows
}

impl RunOutput {
    pub fn length_index(&self, window: u32) -> Option<usize> {
        self.profile.lengths.iter().position(|&n| n == window)
    }

    /// Merge every worker's table for one window length by summing counts.
    pub fn merged(&self, index: usize) -> CountTable {
        let mut sum = CountTable::new();
        for worker in &self.tables {
            for (&key, &count) in &worker[index] {
                *sum.entry(key).or_insert(0) += count;
            }
        }
        sum
    }

    /// Sum one key across the per-worker tables directly; equivalent to a
    /// merge when only a single key is wanted.
    pub fn exact_count(&self, index: usize, key: u64) -> u64 {
        self.tables
            .iter()
            .map(|worker| worker[index].get(&key).copied().unwrap_or(0))
            .sum()
    }
}

fn stats_enabled() -> bool {
    matches!(std::env::var("NUCFREQ_STATS").as_deref(), Ok("1"))
}

fn fmt_dur(d: Duration) -> String {
    if d.as_secs_f64() < 1.0 {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.3}s", d.as_secs_f64())
    }
}
