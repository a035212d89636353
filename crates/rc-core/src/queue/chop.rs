//! Adaptive chopping of old stack frames
//!
//! A long search that keeps growing while rarely backtracking holds on to
//! frames it will almost certainly never revisit. When pushes outpace pops
//! over a window of steps, a batch of the oldest frames is committed: their
//! data moves into a per-id store (still visible to `get` and to fit checks)
//! and the search can no longer backtrack into them.
//!
//! Only frames strictly below the low-water mark of the window, less a safety
//! margin, are ever chopped. Frames at or above that frontier were either
//! popped or had a branch advanced during the window.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::accessor::fold_into;
use super::entry::Frame;
use super::{Id, Merge};

/// Chopping parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChopConfig {
    /// Steps per measurement window
    pub window: u64,
    /// Pushes per pop within a window that trigger a chop
    pub growth_ratio: f64,
    /// Frames discarded per chop before scaling
    pub batch: usize,
    /// Frames kept below the backtrack frontier
    pub keep: usize,
    /// Upper bound for the adaptive batch multiplier
    pub max_multiplier: usize,
}

impl Default for ChopConfig {
    fn default() -> Self {
        Self {
            window: 256,
            growth_ratio: 4.0,
            batch: 64,
            keep: 32,
            max_multiplier: 16,
        }
    }
}

/// Data of chopped frames for one id
#[derive(Debug, Clone)]
pub(crate) struct Committed<D> {
    pub(crate) data: D,
    pub(crate) finished: bool,
}

/// Fold a chopped frame into the committed store
pub(crate) fn commit<D: Merge>(store: &mut BTreeMap<Id, Committed<D>>, frame: Frame<D>) {
    let finished = frame.finished;
    // a resolved frame already carries everything committed before it
    let (data, merge) = match frame.resolved {
        Some(resolved) => (resolved, false),
        None => (frame.data, frame.merge),
    };
    let entry = store.remove(&frame.id);
    let mut composite = entry.map(|c| c.data);
    fold_into(&mut composite, &data, merge);
    if let Some(data) = composite {
        store.insert(frame.id, Committed { data, finished });
    }
}

/// Windowed push/pop tracking
#[derive(Debug, Clone)]
pub(crate) struct Chopper {
    config: ChopConfig,
    steps: u64,
    pushes: u64,
    pops: u64,
    low_water: usize,
    multiplier: usize,
}

impl Chopper {
    pub(crate) fn new(config: ChopConfig) -> Self {
        Self {
            config,
            steps: 0,
            pushes: 0,
            pops: 0,
            low_water: 0,
            multiplier: 1,
        }
    }

    pub(crate) fn note_push(&mut self) {
        self.pushes += 1;
    }

    pub(crate) fn note_pop(&mut self, depth: usize) {
        self.pops += 1;
        self.low_water = self.low_water.min(depth);
    }

    /// Account one step at `depth`; at the end of a window, returns how many
    /// bottom frames to chop.
    ///
    /// `settled` is the length of the bottom run of frames with no untried
    /// alternative left. Nothing above that run is ever chopped.
    pub(crate) fn end_of_step(&mut self, depth: usize, settled: usize) -> Option<usize> {
        self.steps += 1;
        if self.steps < self.config.window {
            return None;
        }

        let growth = self.pushes as f64 / self.pops.max(1) as f64;
        let frontier = safe_prefix(self.low_water, self.config.keep).min(settled);
        let count = if growth >= self.config.growth_ratio && frontier > 0 {
            let want = self.config.batch.saturating_mul(self.multiplier);
            self.multiplier = (self.multiplier * 2).min(self.config.max_multiplier.max(1));
            Some(want.min(frontier))
        } else {
            self.multiplier = (self.multiplier / 2).max(1);
            None
        };

        self.restart(depth.saturating_sub(count.unwrap_or(0)));
        count.filter(|&n| n > 0)
    }

    /// Begin a new window at `depth`
    pub(crate) fn restart(&mut self, depth: usize) {
        self.steps = 0;
        self.pushes = 0;
        self.pops = 0;
        self.low_water = depth;
    }

    #[cfg(test)]
    pub(crate) fn multiplier(&self) -> usize {
        self.multiplier
    }
}

/// Number of bottom frames that lie below the backtrack frontier.
///
/// With a window low-water mark of `low_water`, the frame at
/// `low_water - 1` may have had its branch advanced, so only frames below it
/// are untouched; `keep` more are retained as margin.
pub(crate) fn safe_prefix(low_water: usize, keep: usize) -> usize {
    low_water.saturating_sub(1 + keep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::{Entry, Next};

    /// Every frame settled: only the window frontier limits a chop
    const ALL: usize = usize::MAX;

    fn config() -> ChopConfig {
        ChopConfig {
            window: 10,
            growth_ratio: 2.0,
            batch: 4,
            keep: 2,
            max_multiplier: 4,
        }
    }

    #[test]
    fn test_safe_prefix() {
        assert_eq!(safe_prefix(0, 0), 0);
        assert_eq!(safe_prefix(1, 0), 0);
        assert_eq!(safe_prefix(10, 2), 7);
        assert_eq!(safe_prefix(3, 5), 0);
    }

    #[test]
    fn test_no_chop_before_window_ends() {
        let mut chopper = Chopper::new(config());
        chopper.restart(0);
        for depth in 1..10 {
            chopper.note_push();
            assert_eq!(chopper.end_of_step(depth, ALL), None);
        }
    }

    #[test]
    fn test_chop_stays_below_frontier() {
        let mut chopper = Chopper::new(config());
        chopper.restart(20);
        // grow to 40, with one pop back to 25 along the way
        for _ in 0..9 {
            chopper.note_push();
            assert_eq!(chopper.end_of_step(30, ALL), None);
        }
        chopper.note_pop(25);
        let count = chopper.end_of_step(40, ALL).unwrap();
        assert_eq!(count, 4);
        assert!(count <= safe_prefix(20, 2));
        assert_eq!(chopper.multiplier(), 2);
    }

    #[test]
    fn test_chop_clamped_by_open_alternatives() {
        fn grow(settled: usize) -> Option<usize> {
            let mut chopper = Chopper::new(config());
            chopper.restart(20);
            let mut out = None;
            for _ in 0..10 {
                chopper.note_push();
                out = chopper.end_of_step(30, settled);
            }
            out
        }

        // the bottom frame still has an untried alternative
        assert_eq!(grow(0), None);
        // only three bottom frames sit on their last alternative
        assert_eq!(grow(3), Some(3));
        assert_eq!(grow(ALL), Some(4));
    }

    #[test]
    fn test_chop_clamped_by_recent_backtracking() {
        let mut chopper = Chopper::new(config());
        chopper.restart(50);
        for _ in 0..9 {
            chopper.note_push();
            chopper.end_of_step(50, ALL);
        }
        chopper.note_push();
        chopper.note_push();
        chopper.note_pop(3);
        // backtracked down to depth 3: frame 2 is the frontier and the
        // margin of 2 covers frames 0 and 1
        assert_eq!(chopper.end_of_step(30, ALL), None);
    }

    #[test]
    fn test_multiplier_adapts() {
        let mut chopper = Chopper::new(config());
        chopper.restart(100);
        fn run_window(chopper: &mut Chopper, pushes: usize, pops: usize) -> Option<usize> {
            let mut out = None;
            for i in 0..10 {
                if i < pushes {
                    chopper.note_push();
                }
                if i < pops {
                    chopper.note_pop(100);
                }
                out = chopper.end_of_step(100, ALL);
            }
            out
        }

        assert_eq!(run_window(&mut chopper, 10, 0), Some(4));
        assert_eq!(run_window(&mut chopper, 10, 0), Some(8));
        assert_eq!(run_window(&mut chopper, 10, 0), Some(16));
        // capped at max_multiplier
        assert_eq!(run_window(&mut chopper, 10, 0), Some(16));
        assert_eq!(chopper.multiplier(), 4);
        // balanced window shrinks it again
        assert_eq!(run_window(&mut chopper, 5, 5), None);
        assert_eq!(chopper.multiplier(), 2);
    }

    #[test]
    fn test_commit_merges_fragments() {
        let mut store = BTreeMap::new();
        commit(&mut store, Frame::new(3, Entry::new(vec![1], Next::Complete)));
        commit(&mut store, Frame::new(3, Entry::new(vec![2], Next::Complete).finished()));
        let committed = &store[&3];
        assert_eq!(committed.data, vec![1, 2]);
        assert!(committed.finished);
    }

    #[test]
    fn test_commit_resolved_frame_replaces() {
        let mut store = BTreeMap::new();
        commit(&mut store, Frame::new(1, Entry::new(vec![1], Next::Complete)));
        let mut frame = Frame::new(1, Entry::new(vec![2], Next::Complete).finished());
        frame.resolved = Some(vec![1, 2]);
        commit(&mut store, frame);
        assert_eq!(store[&1].data, vec![1, 2]);
    }
}
