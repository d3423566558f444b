use crate::core::model::Profile;
use std::sync::atomic::{AtomicU32, Ordering};

/// One unit of work: scan the whole buffer for `window`-length k-mers
/// starting at byte `offset`. `index` is the window's position in the
/// profile, which is also the worker's table slot for it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Task {
    pub index: usize,
    pub window: u32,
    pub offset: u32,
}

/// Lock-free distributor over the ordered (window length, sub-offset) task
/// space. The cursor packs the length index into the high 16 bits and the
/// sub-offset into the low 16; claiming is a compare-exchange retry loop, so
/// every task is handed out exactly once and some caller always makes
/// progress under contention.
pub struct TaskQueue {
    profile: Profile,
    cursor: AtomicU32,
}

impl TaskQueue {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            cursor: AtomicU32::new(0),
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Claim the next task, or `None` once the task space is exhausted.
    pub fn claim(&self) -> Option<Task> {
        let mut cur = self.cursor.load(Ordering::Relaxed);
        loop {
            let index = (cur >> 16) as usize;
            if index >= self.profile.lengths.len() {
                return None;
            }
            match self.cursor.compare_exchange_weak(
                cur,
                self.successor(cur),
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    return Some(Task {
                        index,
                        window: self.profile.lengths[index],
                        offset: cur & 0xffff,
                    });
                }
                Err(seen) => cur = seen,
            }
        }
    }

    /// Sequential lengths take a single task; fanned-out lengths step through
    /// one sub-offset per window position before moving on.
    fn successor(&self, cur: u32) -> u32 {
        let mut offset = cur & 0xffff;
        let mut index = cur >> 16;
        let window = self.profile.lengths[index as usize];
        offset += 1;
        if window <= self.profile.sequential_max || offset == window {
            offset = 0;
            index += 1;
        }
        (index << 16) | offset
    }
}
