use crate::core::scanner::MAX_WINDOW;
use anyhow::{Result, bail};

/// Window lengths counted by default, in task-consumption order.
pub const LENGTHS: [u32; 7] = [1, 2, 3, 4, 6, 12, 18];

/// Lengths up to this are scanned in one sequential stride-1 pass; longer
/// lengths fan out into one non-overlapping stride-N task per sub-offset.
pub const SEQUENTIAL_MAX: u32 = 8;

#[derive(Clone, Debug)]
pub struct Profile {
    pub lengths: Vec<u32>,
    pub sequential_max: u32,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            lengths: LENGTHS.to_vec(),
            sequential_max: SEQUENTIAL_MAX,
        }
    }
}

impl Profile {
    /// Rejects any configuration the counting phase cannot represent. Runs
    /// before the first worker thread starts; nothing past this can fail.
    pub fn validate(&self) -> Result<()> {
        if self.lengths.is_empty() {
            bail!("counting profile has no window lengths");
        }
        // The task cursor packs (length index, sub-offset) into 16 bits each.
        if self.lengths.len() > u16::MAX as usize {
            bail!("counting profile has too many window lengths");
        }
        for &n in &self.lengths {
            if n == 0 || n > MAX_WINDOW {
                bail!("invalid window length {n}: must be 1..={MAX_WINDOW}");
            }
        }
        Ok(())
    }

    pub fn stride(&self, window: u32) -> u32 {
        if window <= self.sequential_max { 1 } else { window }
    }

    /// Number of tasks the distributor will hand out for this profile.
    pub fn total_tasks(&self) -> u32 {
        self.lengths
            .iter()
            .map(|&n| if n <= self.sequential_max { 1 } else { n })
            .sum()
    }

    /// The window lengths reported as full frequency distributions.
    pub fn report_lengths(&self) -> Vec<u32> {
        let mut sorted = self.lengths.clone();
        sorted.sort_unstable();
        sorted.truncate(2);
        sorted
    }
}
