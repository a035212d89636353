//! Build queue: iterative backtracking search
//!
//! The search walks a tree of [`Entry`] values depth-first on an explicit
//! stack. Each entry holds one data fragment for a slot id plus a
//! continuation; the continuation is called once per alternative
//! (`branch`) and either proposes a child entry or rejects the branch.
//! When every alternative of the top entry is used up it is popped and its
//! parent moves on to its next alternative.
//!
//! Several fragments may share an id (a slot built up over several steps,
//! possibly interleaved with other ids). [`Accessor::get`] merges them via
//! [`Merge`]; once the last fragment of an id is pushed the composite is
//! cached on it.

mod accessor;
mod chop;
mod entry;
mod merge;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::rng::GameRng;

pub use accessor::Accessor;
pub use chop::ChopConfig;
pub use entry::{Entry, Factory, FrameView, Generator, Next, generator};
pub use merge::{Merge, strategy};

use chop::{Chopper, Committed, commit};
use entry::Frame;

/// Slot identifier in an arrangement chain
pub type Id = u32;

/// Engine settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Give up after this many steps
    pub max_steps: Option<u64>,
    /// Enable adaptive chopping
    pub chop: Option<ChopConfig>,
}

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub steps: u64,
    pub pushes: u64,
    pub pops: u64,
    pub max_depth: usize,
    /// Number of chops performed
    pub chops: u64,
    /// Frames discarded by chopping
    pub chopped: u64,
    pub step_limit_hit: bool,
}

/// The search engine; owns the stack and everything the run accumulates
pub struct BuildQueue<D> {
    stack: Vec<Frame<D>>,
    committed: BTreeMap<Id, Committed<D>>,
    rng: GameRng,
    config: QueueConfig,
    stats: QueueStats,
    chopper: Option<Chopper>,
}

impl<D: Merge> BuildQueue<D> {
    pub fn new(rng: GameRng) -> Self {
        Self::with_config(rng, QueueConfig::default())
    }

    pub fn with_config(rng: GameRng, config: QueueConfig) -> Self {
        Self {
            stack: Vec::new(),
            committed: BTreeMap::new(),
            rng,
            config,
            stats: QueueStats::default(),
            chopper: None,
        }
    }

    /// Run the search from `root` until a complete chain is on top of the
    /// stack.
    ///
    /// Returns one merged record per id, or `None` when the search tree is
    /// exhausted (or the step limit is reached) without completing.
    pub fn begin(&mut self, root: Generator<D>) -> Option<BTreeMap<Id, D>> {
        self.reset();
        debug!(seed = self.rng.seed(), "build queue started");

        let first = {
            let accessor = Accessor::new(&self.stack, &self.committed, &self.stats);
            root(0, 0, &accessor, &mut self.rng)
        };
        let Some(entry) = first else {
            debug!("root generator rejected its only candidate");
            return None;
        };
        self.push(0, entry);

        while !self.top_is_complete() {
            if self.step_limit_reached() {
                warn!(steps = self.stats.steps, "build queue step limit reached");
                self.stats.step_limit_hit = true;
                return None;
            }
            if !self.step() {
                debug!(
                    steps = self.stats.steps,
                    pushes = self.stats.pushes,
                    "search exhausted"
                );
                return None;
            }
            self.chop_if_needed();
        }

        let accessor = self.accessor();
        let result: BTreeMap<Id, D> = accessor
            .ids()
            .into_iter()
            .map(|id| (id, accessor.get(id)))
            .collect();
        debug!(
            ids = result.len(),
            steps = self.stats.steps,
            pushes = self.stats.pushes,
            pops = self.stats.pops,
            "build queue finished"
        );
        Some(result)
    }

    /// Advance the search by one move.
    ///
    /// Pops the top entry if its alternatives are used up (advancing the
    /// parent), otherwise asks its continuation for the current alternative.
    /// Returns `false` once the stack is empty.
    pub fn step(&mut self) -> bool {
        self.stats.steps += 1;
        let Some(top) = self.stack.last() else {
            return false;
        };

        if top.exhausted() {
            self.pop();
            return match self.stack.last_mut() {
                Some(parent) => {
                    parent.branch += 1;
                    true
                }
                None => false,
            };
        }

        let id = top.next_id();
        let branch = top.branch;
        let candidate = {
            let generator = match &top.next {
                Next::Ready(generator) => generator,
                Next::Complete => panic!("stepped past the completed chain at id {}", top.id),
                Next::Deferred(_) => panic!("continuation of id {} was never resolved", top.id),
            };
            let accessor = Accessor::new(&self.stack, &self.committed, &self.stats);
            generator(id, branch, &accessor, &mut self.rng)
        };

        match candidate {
            Some(entry) => self.push(id, entry),
            None => {
                trace!(id, branch, "candidate rejected");
                if let Some(top) = self.stack.last_mut() {
                    top.branch += 1;
                }
            }
        }
        true
    }

    /// Merged data for `id`; see [`Accessor::get`]
    pub fn get(&self, id: Id) -> D {
        self.accessor().get(id)
    }

    pub fn accessor(&self) -> Accessor<'_, D> {
        Accessor::new(&self.stack, &self.committed, &self.stats)
    }

    pub fn stats(&self) -> QueueStats {
        self.stats
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn reset(&mut self) {
        self.stack.clear();
        self.committed.clear();
        self.stats = QueueStats::default();
        self.chopper = self.config.chop.clone().map(Chopper::new);
        if let Some(chopper) = &mut self.chopper {
            chopper.restart(0);
        }
    }

    fn top_is_complete(&self) -> bool {
        self.stack.last().is_some_and(|frame| frame.next.is_complete())
    }

    fn step_limit_reached(&self) -> bool {
        self.config
            .max_steps
            .is_some_and(|limit| self.stats.steps >= limit)
    }

    fn push(&mut self, id: Id, entry: Entry<D>) {
        trace!(id, finished = entry.finished, branches = entry.branch_count, "push");
        self.stack.push(Frame::new(id, entry));
        self.stats.pushes += 1;
        self.stats.max_depth = self.stats.max_depth.max(self.stack.len());
        if let Some(chopper) = &mut self.chopper {
            chopper.note_push();
        }
        self.post_step();
    }

    fn pop(&mut self) {
        if let Some(frame) = self.stack.pop() {
            trace!(id = frame.id, "pop");
        }
        self.stats.pops += 1;
        if let Some(chopper) = &mut self.chopper {
            chopper.note_pop(self.stack.len());
        }
    }

    /// Resolve the freshly pushed frame: cache the composite of a finished
    /// id and turn a deferred continuation into a ready one
    fn post_step(&mut self) {
        let Some(index) = self.stack.len().checked_sub(1) else {
            return;
        };
        let id = self.stack[index].id;

        if self.stack[index].finished && self.stack[index].merge {
            let composite = self.accessor().fold(id);
            self.stack[index].resolved = composite;
        }

        if matches!(self.stack[index].next, Next::Deferred(_)) {
            let snapshot = self.accessor().get(id);
            let next = std::mem::replace(&mut self.stack[index].next, Next::Complete);
            if let Next::Deferred(factory) = next {
                self.stack[index].next = Next::Ready(factory(&snapshot));
            }
        }
    }

    fn chop_if_needed(&mut self) {
        let depth = self.stack.len();
        let Some(chopper) = self.chopper.as_mut() else {
            return;
        };
        // frames that can still switch to another alternative must stay
        let settled = self
            .stack
            .iter()
            .take_while(|frame| frame.on_last_branch())
            .count();
        let Some(count) = chopper.end_of_step(depth, settled) else {
            return;
        };

        for frame in self.stack.drain(..count) {
            commit(&mut self.committed, frame);
        }
        self.stats.chops += 1;
        self.stats.chopped += count as u64;
        info!(count, depth = self.stack.len(), "chopped old frames");
    }
}
