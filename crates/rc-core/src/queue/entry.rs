//! Entries pushed by generators, and the stack frames they become.

use super::{Accessor, Id};
use crate::rng::GameRng;

/// Proposes one candidate for slot `id` on alternative `branch`.
///
/// Returning `None` rejects the branch; the engine moves on to the next one.
/// Generators read earlier state only through the accessor.
pub type Generator<D> = Box<dyn Fn(Id, u32, &Accessor<'_, D>, &mut GameRng) -> Option<Entry<D>>>;

/// Box a closure as a [`Generator`]
pub fn generator<D, F>(f: F) -> Generator<D>
where
    F: Fn(Id, u32, &Accessor<'_, D>, &mut GameRng) -> Option<Entry<D>> + 'static,
{
    Box::new(f)
}

/// Builds a continuation from the merged data of the entry's id. Invoked once,
/// right after the entry is pushed and merged.
pub type Factory<D> = Box<dyn FnOnce(&D) -> Generator<D>>;

/// What happens after an entry
pub enum Next<D> {
    /// The whole chain is complete; the search stops here.
    Complete,
    /// Continue with this generator.
    Ready(Generator<D>),
    /// Continue with the generator the factory builds once merged data exists.
    Deferred(Factory<D>),
}

impl<D> Next<D> {
    pub fn ready<F>(generator: F) -> Self
    where
        F: Fn(Id, u32, &Accessor<'_, D>, &mut GameRng) -> Option<Entry<D>> + 'static,
    {
        Next::Ready(self::generator(generator))
    }

    pub fn deferred<F>(factory: F) -> Self
    where
        F: FnOnce(&D) -> Generator<D> + 'static,
    {
        Next::Deferred(Box::new(factory))
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Next::Complete)
    }
}

impl<D> std::fmt::Debug for Next<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Next::Complete => f.write_str("Complete"),
            Next::Ready(_) => f.write_str("Ready(..)"),
            Next::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// One data fragment for an id plus search control
#[derive(Debug)]
pub struct Entry<D> {
    pub(crate) data: D,
    pub(crate) branch_count: u32,
    pub(crate) finished: bool,
    pub(crate) merge: bool,
    pub(crate) rebase: Option<Id>,
    pub(crate) next: Next<D>,
}

impl<D> Entry<D> {
    /// A partial fragment offering a single alternative to its continuation
    pub fn new(data: D, next: Next<D>) -> Self {
        Self {
            data,
            branch_count: 1,
            finished: false,
            merge: true,
            rebase: None,
            next,
        }
    }

    /// Number of alternatives the continuation will be asked for.
    ///
    /// Panics if `count` does not fit a branch index.
    pub fn branches(mut self, count: usize) -> Self {
        self.branch_count = match u32::try_from(count) {
            Ok(count) => count,
            Err(_) => panic!("branch count {count} exceeds u32"),
        };
        self
    }

    /// This is the last fragment for its id
    pub fn finished(mut self) -> Self {
        self.finished = true;
        self
    }

    /// The data is already the full composite for its id; do not merge it
    /// with earlier fragments
    pub fn no_merge(mut self) -> Self {
        self.merge = false;
        self
    }

    /// Call the continuation with `id` instead of the usual next id
    pub fn rebase(mut self, id: Id) -> Self {
        self.rebase = Some(id);
        self
    }

    pub fn data(&self) -> &D {
        &self.data
    }
}

/// An entry on the stack
#[derive(Debug)]
pub(crate) struct Frame<D> {
    pub(crate) id: Id,
    pub(crate) data: D,
    /// Alternative currently being explored
    pub(crate) branch: u32,
    pub(crate) branch_count: u32,
    pub(crate) finished: bool,
    pub(crate) merge: bool,
    pub(crate) rebase: Option<Id>,
    pub(crate) next: Next<D>,
    /// Composite for `id`, filled in when a finished frame is pushed
    pub(crate) resolved: Option<D>,
}

impl<D> Frame<D> {
    pub(crate) fn new(id: Id, entry: Entry<D>) -> Self {
        Self {
            id,
            data: entry.data,
            branch: 0,
            branch_count: entry.branch_count,
            finished: entry.finished,
            merge: entry.merge,
            rebase: entry.rebase,
            next: entry.next,
            resolved: None,
        }
    }

    /// Id the continuation is called with
    pub(crate) fn next_id(&self) -> Id {
        match self.rebase {
            Some(id) => id,
            None if self.finished => self.id + 1,
            None => self.id,
        }
    }

    pub(crate) fn exhausted(&self) -> bool {
        self.branch >= self.branch_count
    }

    /// No untried alternatives remain below the one being explored
    pub(crate) fn on_last_branch(&self) -> bool {
        self.branch + 1 >= self.branch_count
    }
}

/// Read-only view of a stack frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameView {
    pub id: Id,
    pub branch: u32,
    pub branch_count: u32,
    pub finished: bool,
    pub complete: bool,
}

impl<D> From<&Frame<D>> for FrameView {
    fn from(frame: &Frame<D>) -> Self {
        Self {
            id: frame.id,
            branch: frame.branch,
            branch_count: frame.branch_count,
            finished: frame.finished,
            complete: frame.next.is_complete(),
        }
    }
}
