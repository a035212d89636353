//! Tunnel-room-tunnel: a simple room with corridors on both ends.

use std::rc::Rc;

use super::{Arrangement, Link, RectKind, exit_dirs, fits, leave};
use crate::geom::{Rect, Size, Tpr};
use crate::picker::{Picker, Slot};
use crate::queue::{Entry, Generator, Next, generator};

/// Entrance tunnel along the incoming direction, a room on its far end, then
/// one branch per exit direction, each with its own exit tunnel.
///
/// `tunnel` is given as breadth by length for northward travel and is
/// rotated to match each direction.
pub fn tunnel(picker: Rc<Picker>, slot: Slot, link: Link, room: Size, tunnel: Size) -> Generator<Arrangement> {
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

        if picker.is_terminal(&slot) {
            return Some(picker.close(record, slot.parent_branch));
        }

        let dirs = exit_dirs(dir, picker.forced(&slot), picker.shuffle(), rng);
        let count = dirs.len();
        let exits = leave(picker.clone(), room_rect, dirs, Some(tunnel), 2);
        Some(Entry::new(record, Next::Ready(exits)).branches(count))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Dir;
    use crate::picker::{NodeConfig, Plan};
    use crate::queue::BuildQueue;
    use crate::rng::GameRng;

    fn run(chain: NodeConfig) -> Vec<Arrangement> {
        let plan = Plan::from_config(&chain).unwrap();
        let picker = Rc::new(Picker::new(plan, false, None));
        let mut queue = BuildQueue::new(GameRng::new(11));
        queue
            .begin(picker.root(Tpr::default()))
            .unwrap()
            .into_values()
            .collect()
    }

    #[test]
    fn test_tunnel_then_room() {
        let records = run(NodeConfig::tunnel(Size::new(4, 4), Size::new(2, 3), 1));
        let record = &records[0];
        assert_eq!(record.rects[0].rect, Rect::new(-1, -3, 2, 3));
        assert_eq!(record.rects[0].kind, RectKind::Tunnel);
        assert_eq!(record.room(), Some(Rect::new(-2, -7, 4, 4)));
        assert!(record.exits.is_empty());
    }

    #[test]
    fn test_exit_tunnel_rotates() {
        let chain = NodeConfig::tunnel(Size::new(4, 4), Size::new(2, 3), 2).toward(Dir::East);
        let records = run(chain);
        let first = &records[0];
        assert_eq!(first.rects.len(), 3);
        // room spans x -2..2, so the east exit tunnel runs from x 2 to 5
        assert_eq!(first.rects[2].rect, Rect::new(2, -6, 3, 2));
        assert_eq!(first.rects[2].order, 2);
        assert_eq!(first.exits[0], Tpr::new(crate::geom::Point::new(5, -5), Dir::East, Some(1)));

        let second = &records[1];
        assert_eq!(second.entrances[0].dest, Some(0));
        assert!(!first.overlaps(second));
    }
}
