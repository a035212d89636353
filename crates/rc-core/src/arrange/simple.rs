//! A single room on the incoming transfer point.

use std::rc::Rc;

use super::{Arrangement, Link, RectKind, exit_dirs, fits, leave};
use crate::geom::{Rect, Size};
use crate::picker::{Picker, Slot};
use crate::queue::{Entry, Generator, Next, generator};

/// Room of `room` size centred on `link`, then one branch per exit direction.
///
/// A terminal slot finishes without exits.
pub fn simple(picker: Rc<Picker>, slot: Slot, link: Link, room: Size) -> Generator<Arrangement> {
    generator(move |id, _branch, acc, rng| {
        let rect = Rect::centered(room, &link.tpr);
        if !fits(acc, id, &[rect], picker.bounds()) {
            return None;
        }

        let mut record = Arrangement::for_slot(&slot);
        record.entrances.push(link.entrance());
        record.place(rect, RectKind::Room, 0);

        if picker.is_terminal(&slot) {
            return Some(picker.close(record, slot.parent_branch));
        }

        let dirs = exit_dirs(link.tpr.dir, picker.forced(&slot), picker.shuffle(), rng);
        let count = dirs.len();
        let exits = leave(picker.clone(), rect, dirs, None, 1);
        Some(Entry::new(record, Next::Ready(exits)).branches(count))
    })
}
