//! Config-driven choice of the generator for each slot.
//!
//! The picker walks a [`Plan`]: a node with `count` n fills n consecutive
//! slots, then hands over to its `followed_by` node. A slot with nowhere to
//! go is terminal and closes its chain. For the main chain that completes
//! the whole search; for a branch sub-chain it returns control to the branch
//! slot, which opens its next exit.

mod config;

use std::rc::Rc;

use tracing::trace;

use crate::arrange::{self, Arrangement, Link};
use crate::geom::{Dir, Rect, Size, Tpr};
use crate::queue::{Entry, Generator, Id, Next};

pub use config::{NodeConfig, NodeId, NodeKind, Plan, PlanNode, Shape};

/// Position in the plan: which node, how far through its count, and which
/// branch slot (if any) the current sub-chain belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub node: NodeId,
    pub progress: u32,
    pub parent_branch: Option<Id>,
}

impl Slot {
    /// First slot of the root node
    pub const fn root() -> Self {
        Self {
            node: 0,
            progress: 0,
            parent_branch: None,
        }
    }
}

/// Maps slots to generators. Shared by every generator of a run.
#[derive(Debug)]
pub struct Picker {
    plan: Plan,
    shuffle: bool,
    bounds: Option<Rect>,
}

impl Picker {
    pub fn new(plan: Plan, shuffle: bool, bounds: Option<Rect>) -> Self {
        Self { plan, shuffle, bounds }
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn bounds(&self) -> Option<&Rect> {
        self.bounds.as_ref()
    }

    /// Generator for slot 0, entered through `start`
    pub fn root(self: &Rc<Self>, start: Tpr) -> Generator<Arrangement> {
        self.place(Slot::root(), Link { tpr: start, from: None })
    }

    /// Generator for `slot`, entered through `link`
    pub fn place(self: &Rc<Self>, slot: Slot, link: Link) -> Generator<Arrangement> {
        let node = self.plan.node(slot.node);
        trace!(node = slot.node, progress = slot.progress, ?link, "pick");
        match &node.shape {
            Shape::Simple { room } => arrange::simple(self.clone(), slot, link, *room),
            Shape::Tunnel { room, tunnel } => arrange::tunnel(self.clone(), slot, link, *room, *tunnel),
            Shape::Branch { room, tunnel, heads } => {
                arrange::branch(self.clone(), slot, link, *room, *tunnel, heads.len())
            }
        }
    }

    /// The slot after `slot` within its chain, if any
    pub fn successor(&self, slot: &Slot) -> Option<Slot> {
        let node = self.plan.node(slot.node);
        if slot.progress + 1 < node.count {
            return Some(Slot {
                progress: slot.progress + 1,
                ..*slot
            });
        }
        node.followed_by.map(|next| Slot {
            node: next,
            progress: 0,
            parent_branch: slot.parent_branch,
        })
    }

    pub fn is_terminal(&self, slot: &Slot) -> bool {
        self.successor(slot).is_none()
    }

    /// Exit direction forced on `slot`'s node, if any
    pub fn forced(&self, slot: &Slot) -> Option<Dir> {
        self.plan.node(slot.node).direction
    }

    /// Tunnel size and sub-chain heads of a branch node.
    ///
    /// Panics when `node` is not a branch.
    pub(crate) fn branch_parts(&self, node: NodeId) -> (Size, &[NodeId]) {
        match &self.plan.node(node).shape {
            Shape::Branch { tunnel, heads, .. } => (*tunnel, heads.as_slice()),
            other => panic!("node {node} is not a branch: {other:?}"),
        }
    }

    /// Continuation after an exit of `id` was chosen: the successor slot,
    /// built from the merged record once it is known
    pub(crate) fn after(self: &Rc<Self>, id: Id) -> Next<Arrangement> {
        let picker = self.clone();
        Next::deferred(move |done: &Arrangement| picker.continue_from(id, done))
    }

    fn continue_from(self: &Rc<Self>, id: Id, done: &Arrangement) -> Generator<Arrangement> {
        let slot = done.slot();
        let Some(next) = self.successor(&slot) else {
            panic!("slot {id} is terminal but left an exit");
        };
        let Some(exit) = done.exits.last() else {
            panic!("slot {id} finished without an exit");
        };
        self.place(
            next,
            Link {
                tpr: *exit,
                from: Some(id),
            },
        )
    }

    /// Finish the slot holding `record` as the end of its chain.
    ///
    /// Inside a branch sub-chain the search resumes on the branch slot;
    /// otherwise the whole arrangement is complete.
    pub(crate) fn close(self: &Rc<Self>, record: Arrangement, parent_branch: Option<Id>) -> Entry<Arrangement> {
        match parent_branch {
            Some(parent) => {
                let resume = arrange::next_branch(self.clone(), parent);
                Entry::new(record, Next::Ready(resume)).finished().rebase(parent)
            }
            None => Entry::new(record, Next::Complete).finished(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picker(chain: NodeConfig) -> Picker {
        Picker::new(Plan::from_config(&chain).unwrap(), true, None)
    }

    #[test]
    fn test_successor_walks_counts_and_followers() {
        let room = Size::new(2, 2);
        let picker = picker(NodeConfig::simple(room, 2).then(NodeConfig::simple(room, 1)));

        let first = Slot::root();
        let second = picker.successor(&first).unwrap();
        assert_eq!((second.node, second.progress), (0, 1));
        let third = picker.successor(&second).unwrap();
        assert_eq!((third.node, third.progress), (1, 0));
        assert!(picker.is_terminal(&third));
    }

    #[test]
    fn test_sub_chain_keeps_parent() {
        let room = Size::new(2, 2);
        let picker = picker(NodeConfig::branch(
            room,
            Size::new(1, 1),
            vec![NodeConfig::simple(room, 2)],
        ));
        let head = Slot {
            node: 1,
            progress: 0,
            parent_branch: Some(4),
        };
        let next = picker.successor(&head).unwrap();
        assert_eq!(next.parent_branch, Some(4));
        assert!(picker.is_terminal(&next));
        // the branch node itself is terminal in its own chain
        assert!(picker.is_terminal(&Slot::root()));
    }

    #[test]
    fn test_branch_parts() {
        let room = Size::new(2, 2);
        let picker = picker(NodeConfig::branch(
            room,
            Size::new(1, 3),
            vec![NodeConfig::simple(room, 1), NodeConfig::simple(room, 1)],
        ));
        let (tunnel, heads) = picker.branch_parts(0);
        assert_eq!(tunnel, Size::new(1, 3));
        assert_eq!(heads, &[1, 2]);
    }

    #[test]
    #[should_panic(expected = "not a branch")]
    fn test_branch_parts_on_simple_panics() {
        picker(NodeConfig::simple(Size::new(2, 2), 1)).branch_parts(0);
    }

    #[test]
    fn test_close() {
        let picker = Rc::new(picker(NodeConfig::simple(Size::new(2, 2), 1)));
        let entry = picker.close(Arrangement::default(), None);
        assert!(entry.finished);
        assert!(entry.next.is_complete());

        let entry = picker.close(Arrangement::default(), Some(2));
        assert_eq!(entry.rebase, Some(2));
        assert!(!entry.next.is_complete());
    }
}
