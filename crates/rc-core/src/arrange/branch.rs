//! Branch rooms: one entrance, several independent sub-chains.
//!
//! A branch slot goes through three kinds of generators, all on the same id:
//!
//! 1. [`branch`] places the entrance tunnel and the room, and offers one
//!    branch per combination of exit sides.
//! 2. `open` records the chosen combination as `pending_exits`.
//! 3. [`next_branch`] runs once per sub-chain. It places the next exit
//!    tunnel and hands off to a freshly allocated id. When that sub-chain
//!    finishes, its last slot rebases back here and the generator runs
//!    again. With nothing left pending it marks the slot `branch_done`
//!    and finishes.

use std::rc::Rc;

use super::{Arrangement, Link, RectKind, fits};
use crate::geom::{Dir, Rect, Size, Tpr};
use crate::picker::{Picker, Slot};
use crate::queue::{Accessor, Entry, Generator, Id, Next, generator};
use crate::rng::GameRng;

/// Branch room with `branches` sub-chains
pub fn branch(
    picker: Rc<Picker>,
    slot: Slot,
    link: Link,
    room: Size,
    tunnel: Size,
    branches: usize,
) -> Generator<Arrangement> {
    generator(move |id, _branch, acc, rng| {
        let dir = link.tpr.dir;
        let entry_tunnel = Rect::centered(tunnel.along(dir), &link.tpr);
        let room_rect = Rect::centered(room, &Tpr::leaving(&entry_tunnel, dir, None));
        if !fits(acc, id, &[entry_tunnel, room_rect], picker.bounds()) {
            return None;
        }

        let mut record = Arrangement::for_slot(&slot);
        record.entrances.push(link.entrance());
        record.place(entry_tunnel, RectKind::Tunnel, 0);
        record.place(room_rect, RectKind::Room, 1);

        let combos = side_combinations(dir.flip(), branches, picker.shuffle(), rng);
        if combos.is_empty() {
            return None;
        }
        let count = combos.len();
        Some(Entry::new(record, Next::Ready(open(picker.clone(), combos))).branches(count))
    })
}

fn open(picker: Rc<Picker>, combos: Vec<Vec<Dir>>) -> Generator<Arrangement> {
    generator(move |id, branch, _acc, _rng| {
        let fragment = Arrangement {
            pending_exits: Some(combos[branch as usize].clone()),
            ..Arrangement::default()
        };
        Some(Entry::new(fragment, Next::Ready(next_branch(picker.clone(), id))))
    })
}

/// Open the next pending exit of branch slot `parent`, or finish it
pub(crate) fn next_branch(picker: Rc<Picker>, parent: Id) -> Generator<Arrangement> {
    generator(move |id, _branch, acc: &Accessor<'_, Arrangement>, _rng| {
        debug_assert_eq!(id, parent, "branch continuation ran on the wrong id");
        let record = acc.get(parent);
        let slot = record.slot();
        let pending = record.pending_exits.as_deref().unwrap_or_default();
        let opened = record.exits.len();

        let Some(&dir) = pending.get(opened) else {
            let fragment = Arrangement {
                branch_done: Some(true),
                ..Arrangement::default()
            };
            return Some(picker.close(fragment, slot.parent_branch));
        };

        let Some(room) = record.room() else {
            panic!("branch slot {parent} has no room");
        };
        let (tunnel, heads) = picker.branch_parts(slot.node);
        let exit_tunnel = Rect::centered(tunnel.along(dir), &Tpr::leaving(&room, dir, None));
        if !fits(acc, id, &[exit_tunnel], picker.bounds()) {
            return None;
        }

        let fresh = acc.max_id().map_or(0, |max| max + 1);
        let exit = Tpr::leaving(&exit_tunnel, dir, Some(fresh));
        let mut fragment = Arrangement::default();
        fragment.place(exit_tunnel, RectKind::Tunnel, record.rects.len() as u32);
        fragment.exits.push(exit);

        let head = Slot {
            node: heads[opened],
            progress: 0,
            parent_branch: Some(parent),
        };
        let next = picker.place(
            head,
            Link {
                tpr: exit,
                from: Some(parent),
            },
        );
        Some(Entry::new(fragment, Next::Ready(next)).rebase(fresh))
    })
}

/// Every `k`-subset of the three sides other than `entrance`, each kept in
/// clockwise order; the list of subsets is optionally shuffled
pub(crate) fn side_combinations(entrance: Dir, k: usize, shuffle: bool, rng: &mut GameRng) -> Vec<Vec<Dir>> {
    let sides = Dir::others(entrance);
    let mut combos = Vec::new();
    let mut current = Vec::with_capacity(k);
    collect(&sides, k, 0, &mut current, &mut combos);
    if shuffle {
        rng.shuffle(&mut combos);
    }
    combos
}

fn collect(sides: &[Dir], k: usize, from: usize, current: &mut Vec<Dir>, out: &mut Vec<Vec<Dir>>) {
    if current.len() == k {
        out.push(current.clone());
        return;
    }
    for i in from..sides.len() {
        current.push(sides[i]);
        collect(sides, k, i + 1, current, out);
        current.pop();
    }
}
