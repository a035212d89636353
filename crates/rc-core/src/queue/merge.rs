//! Merging data fragments that share an id
//!
//! Each data type declares, field by field, how a later fragment combines
//! with the composite built so far. The helpers in [`strategy`] cover the
//! usual cases.

/// Combine a later fragment into this composite
pub trait Merge: Clone {
    fn merge_from(&mut self, later: &Self);
}

/// Per-field merge strategies
pub mod strategy {
    use std::collections::BTreeMap;

    use super::Merge;

    /// Later items are appended after earlier ones
    pub fn append<T: Clone>(into: &mut Vec<T>, later: &[T]) {
        into.extend_from_slice(later);
    }

    /// A value present in the later fragment replaces the earlier one
    pub fn overwrite<T: Clone>(into: &mut Option<T>, later: &Option<T>) {
        if later.is_some() {
            into.clone_from(later);
        }
    }

    /// Keys merge individually; keys only in the later fragment are added
    pub fn merge_map<K: Ord + Clone, V: Merge>(into: &mut BTreeMap<K, V>, later: &BTreeMap<K, V>) {
        for (key, value) in later {
            match into.get_mut(key) {
                Some(existing) => existing.merge_from(value),
                None => {
                    into.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

impl Merge for () {
    fn merge_from(&mut self, _later: &Self) {}
}

impl<T: Clone> Merge for Vec<T> {
    fn merge_from(&mut self, later: &Self) {
        strategy::append(self, later);
    }
}
