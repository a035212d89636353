//! Arrangement records and placement generators
//!
//! An [`Arrangement`] is everything placed for one slot id: its rectangles
//! (room, tunnels), entrance and exit transfer points, and the bookkeeping
//! the picker needs to know which config node the slot belongs to.
//!
//! The generators here propose geometry and validate it with [`fits`]:
//! - [`simple`]: one room centred on the incoming point
//! - [`tunnel`]: entrance tunnel, room beyond it, exit tunnel per direction
//! - [`branch`]: tunnel and room that fan out into 1-3 sub-chains

mod branch;
mod simple;
mod tunnel;

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::geom::{Dir, Rect, Size, Tpr};
use crate::picker::{NodeId, Picker, Slot};
use crate::queue::{Accessor, Entry, Generator, Id, Merge, generator, strategy};
use crate::rng::GameRng;

pub use branch::branch;
pub(crate) use branch::next_branch;
pub use simple::simple;
pub use tunnel::tunnel;

/// What a placed rectangle is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RectKind {
    Room,
    Tunnel,
}

/// A rectangle accepted for a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacedRect {
    pub rect: Rect,
    pub kind: RectKind,
    /// Placement order within the slot
    pub order: u32,
}

/// Geometry and bookkeeping for one slot id
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Arrangement {
    pub rects: Vec<PlacedRect>,
    pub entrances: Vec<Tpr>,
    pub exits: Vec<Tpr>,
    /// Config node this slot was placed for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    /// How many earlier slots the same node already placed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_progress: Option<u32>,
    /// Branch slot this slot's sub-chain hangs from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_branch: Option<Id>,
    /// Exit sides a branch slot still has to open, in order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_exits: Option<Vec<Dir>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_done: Option<bool>,
}

impl Merge for Arrangement {
    fn merge_from(&mut self, later: &Self) {
        strategy::append(&mut self.rects, &later.rects);
        strategy::append(&mut self.entrances, &later.entrances);
        strategy::append(&mut self.exits, &later.exits);
        strategy::overwrite(&mut self.node_id, &later.node_id);
        strategy::overwrite(&mut self.node_progress, &later.node_progress);
        strategy::overwrite(&mut self.parent_branch, &later.parent_branch);
        strategy::overwrite(&mut self.pending_exits, &later.pending_exits);
        strategy::overwrite(&mut self.branch_done, &later.branch_done);
    }
}

impl Arrangement {
    /// First fragment of a slot
    pub(crate) fn for_slot(slot: &Slot) -> Self {
        Self {
            node_id: Some(slot.node),
            node_progress: Some(slot.progress),
            parent_branch: slot.parent_branch,
            ..Self::default()
        }
    }

    pub(crate) fn place(&mut self, rect: Rect, kind: RectKind, order: u32) {
        self.rects.push(PlacedRect { rect, kind, order });
    }

    /// The config position this slot was placed for.
    ///
    /// Panics on a fragment that never carried one.
    pub fn slot(&self) -> Slot {
        match (self.node_id, self.node_progress) {
            (Some(node), Some(progress)) => Slot {
                node,
                progress,
                parent_branch: self.parent_branch,
            },
            _ => panic!("arrangement has no config node: {self:?}"),
        }
    }

    /// The room rectangle, if one was placed
    pub fn room(&self) -> Option<Rect> {
        self.rects
            .iter()
            .find(|placed| placed.kind == RectKind::Room)
            .map(|placed| placed.rect)
    }

    pub fn tunnels(&self) -> impl Iterator<Item = &Rect> {
        self.rects
            .iter()
            .filter(|placed| placed.kind == RectKind::Tunnel)
            .map(|placed| &placed.rect)
    }

    /// Any rectangle of this slot overlaps any of `other`'s
    pub fn overlaps(&self, other: &Arrangement) -> bool {
        self.rects
            .iter()
            .any(|a| other.rects.iter().any(|b| a.rect.overlaps(&b.rect)))
    }

    /// Each transfer point with the room side it is nearest to
    pub fn door_sides(&self) -> Vec<(Tpr, Dir)> {
        let Some(room) = self.room() else {
            return Vec::new();
        };
        self.entrances
            .iter()
            .chain(&self.exits)
            .map(|tpr| (*tpr, room.closest_side(tpr.point()).dir))
            .collect()
    }
}

/// Incoming transfer point plus the id it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub tpr: Tpr,
    pub from: Option<Id>,
}

impl Link {
    /// The entrance as recorded on the new slot: pointing back at `from`
    pub fn entrance(&self) -> Tpr {
        Tpr {
            dest: self.from,
            ..self.tpr
        }
    }
}

/// Fit check: `candidates` are inside `bounds` (when given) and overlap no
/// rectangle accepted so far, for any id
pub fn fits(acc: &Accessor<'_, Arrangement>, id: Id, candidates: &[Rect], bounds: Option<&Rect>) -> bool {
    if let Some(bounds) = bounds {
        if let Some(outside) = candidates.iter().find(|rect| !bounds.contains(rect)) {
            trace!(id, ?outside, "candidate out of bounds");
            return false;
        }
    }
    for (other, record) in acc.fragments() {
        for placed in &record.rects {
            if candidates.iter().any(|rect| rect.overlaps(&placed.rect)) {
                trace!(id, other, "candidate overlaps");
                return false;
            }
        }
    }
    true
}

/// Exit directions to try from a room entered travelling `entering`: every
/// side but the one it came in through, or just the forced one
pub(crate) fn exit_dirs(entering: Dir, forced: Option<Dir>, shuffle: bool, rng: &mut GameRng) -> Vec<Dir> {
    if let Some(dir) = forced {
        return vec![dir];
    }
    let mut dirs: Vec<Dir> = Dir::all().filter(|&dir| dir != entering.flip()).collect();
    if shuffle {
        rng.shuffle(&mut dirs);
    }
    dirs
}

/// Continuation offering one exit per direction in `dirs`.
///
/// With a `tunnel` size, each exit first places a tunnel on that side of the
/// room (fit-checked, tagged `order`) and the transfer point moves to its far
/// end.
pub(crate) fn leave(
    picker: Rc<Picker>,
    room: Rect,
    dirs: Vec<Dir>,
    tunnel: Option<Size>,
    order: u32,
) -> Generator<Arrangement> {
    generator(move |id, branch, acc, _rng| {
        let dir = dirs[branch as usize];
        let mut fragment = Arrangement::default();
        let exit = match tunnel {
            Some(size) => {
                let rect = Rect::centered(size.along(dir), &Tpr::leaving(&room, dir, None));
                if !fits(acc, id, &[rect], picker.bounds()) {
                    return None;
                }
                fragment.place(rect, RectKind::Tunnel, order);
                Tpr::leaving(&rect, dir, Some(id + 1))
            }
            None => Tpr::leaving(&room, dir, Some(id + 1)),
        };
        fragment.exits.push(exit);
        Some(Entry::new(fragment, picker.after(id)).finished())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point;

    fn room_record() -> Arrangement {
        let mut record = Arrangement::for_slot(&Slot::root());
        record.place(Rect::new(0, 0, 4, 4), RectKind::Room, 0);
        record
    }

    #[test]
    fn test_merge_appends_and_overwrites() {
        let mut composite = room_record();
        let mut later = Arrangement::default();
        later.exits.push(Tpr::new(Point::new(2, 0), Dir::North, Some(1)));
        later.branch_done = Some(true);
        composite.merge_from(&later);

        assert_eq!(composite.rects.len(), 1);
        assert_eq!(composite.exits.len(), 1);
        assert_eq!(composite.node_id, Some(0));
        assert_eq!(composite.branch_done, Some(true));
    }

    #[test]
    fn test_slot_roundtrip() {
        let slot = Slot {
            node: 3,
            progress: 2,
            parent_branch: Some(7),
        };
        assert_eq!(Arrangement::for_slot(&slot).slot(), slot);
    }

    #[test]
    #[should_panic(expected = "no config node")]
    fn test_slot_missing_panics() {
        Arrangement::default().slot();
    }

    #[test]
    fn test_door_sides() {
        let mut record = room_record();
        record
            .entrances
            .push(Tpr::new(Point::new(2, 4), Dir::North, None));
        record
            .exits
            .push(Tpr::leaving(&Rect::new(0, 0, 4, 4), Dir::East, Some(1)));
        let sides: Vec<Dir> = record.door_sides().into_iter().map(|(_, dir)| dir).collect();
        assert_eq!(sides, vec![Dir::South, Dir::East]);
    }

    #[test]
    fn test_exit_dirs() {
        let mut rng = GameRng::new(5);
        assert_eq!(
            exit_dirs(Dir::North, None, false, &mut rng),
            vec![Dir::North, Dir::East, Dir::West]
        );
        assert_eq!(exit_dirs(Dir::North, Some(Dir::South), true, &mut rng), vec![Dir::South]);

        let mut shuffled = exit_dirs(Dir::East, None, true, &mut rng);
        shuffled.sort();
        assert_eq!(shuffled, vec![Dir::North, Dir::East, Dir::South]);
    }

    #[test]
    fn test_link_entrance_points_back() {
        let link = Link {
            tpr: Tpr::new(Point::new(1, 1), Dir::West, Some(4)),
            from: Some(3),
        };
        let entrance = link.entrance();
        assert_eq!(entrance.dest, Some(3));
        assert_eq!(entrance.dir, Dir::West);
    }
}
