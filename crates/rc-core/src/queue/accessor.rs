//! Read-only view of the search state handed to generators.

use std::collections::{BTreeMap, BTreeSet};

use super::chop::Committed;
use super::entry::{Frame, FrameView};
use super::{Id, Merge, QueueStats};

/// Read-only access to everything accepted so far
pub struct Accessor<'a, D> {
    stack: &'a [Frame<D>],
    committed: &'a BTreeMap<Id, Committed<D>>,
    stats: &'a QueueStats,
}

impl<'a, D: Merge> Accessor<'a, D> {
    pub(crate) fn new(
        stack: &'a [Frame<D>],
        committed: &'a BTreeMap<Id, Committed<D>>,
        stats: &'a QueueStats,
    ) -> Self {
        Self {
            stack,
            committed,
            stats,
        }
    }

    /// Merged data for `id`.
    ///
    /// Panics if `id` was never pushed: asking for it is a generator bug.
    pub fn get(&self, id: Id) -> D {
        match self.try_get(id) {
            Some(data) => data,
            None => panic!("no entry was ever pushed for id {id}"),
        }
    }

    /// Merged data for `id`, if anything was pushed for it.
    ///
    /// Once the latest fragment for `id` is finished its cached composite is
    /// returned; otherwise every fragment with that id is merged in stack
    /// order, wherever it sits, and nothing is cached.
    pub fn try_get(&self, id: Id) -> Option<D> {
        match self.stack.iter().rev().find(|frame| frame.id == id) {
            Some(frame) if frame.finished => {
                if let Some(resolved) = &frame.resolved {
                    return Some(resolved.clone());
                }
                if !frame.merge {
                    return Some(frame.data.clone());
                }
            }
            Some(_) => {}
            None => {
                if let Some(committed) = self.committed.get(&id) {
                    return Some(committed.data.clone());
                }
            }
        }
        self.fold(id)
    }

    /// Merge every fragment of `id`, committed ones first
    pub(crate) fn fold(&self, id: Id) -> Option<D> {
        let mut composite = self.committed.get(&id).map(|c| c.data.clone());
        for frame in self.stack.iter().filter(|frame| frame.id == id) {
            fold_into(&mut composite, &frame.data, frame.merge);
        }
        composite
    }

    /// Whether anything was pushed for `id`
    pub fn contains(&self, id: Id) -> bool {
        self.committed.contains_key(&id) || self.stack.iter().any(|frame| frame.id == id)
    }

    /// Whether the last fragment for `id` has been pushed
    pub fn is_finished(&self, id: Id) -> bool {
        match self.stack.iter().rev().find(|frame| frame.id == id) {
            Some(frame) => frame.finished,
            None => self.committed.get(&id).is_some_and(|c| c.finished),
        }
    }

    /// Every id with at least one fragment, ascending
    pub fn ids(&self) -> BTreeSet<Id> {
        self.committed
            .keys()
            .copied()
            .chain(self.stack.iter().map(|frame| frame.id))
            .collect()
    }

    /// Highest id seen so far
    pub fn max_id(&self) -> Option<Id> {
        let stacked = self.stack.iter().map(|frame| frame.id).max();
        let committed = self.committed.keys().next_back().copied();
        stacked.max(committed)
    }

    /// Raw fragments in acceptance order, committed ones first.
    ///
    /// Cheaper than [`Accessor::get`] when a caller only needs to scan, e.g.
    /// every placed rectangle.
    pub fn fragments(&self) -> impl Iterator<Item = (Id, &'a D)> + 'a {
        let committed = self.committed.iter().map(|(&id, c)| (id, &c.data));
        let stacked = self.stack.iter().map(|frame| (frame.id, &frame.data));
        committed.chain(stacked)
    }

    /// The stack, bottom first
    pub fn queue(&self) -> impl Iterator<Item = FrameView> + 'a {
        self.stack.iter().map(FrameView::from)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn pushes(&self) -> u64 {
        self.stats.pushes
    }

    pub fn pops(&self) -> u64 {
        self.stats.pops
    }
}

pub(crate) fn fold_into<D: Merge>(composite: &mut Option<D>, fragment: &D, merge: bool) {
    match composite {
        Some(existing) if merge => existing.merge_from(fragment),
        _ => *composite = Some(fragment.clone()),
    }
}
