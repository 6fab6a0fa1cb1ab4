//! Supplier depth resolution over an id-indexed arena of parent links.
//!
//! The arena holds `id -> parent id` for every persisted supplier. Walks are
//! bounded by [`MAX_DEPTH`] and track visited ids, so hand-edited rows that
//! form a loop produce an error instead of spinning forever.

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use uuid::Uuid;

/// Longest chain a walk will follow before giving up.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("supplier {0} does not exist")]
    UnknownSupplier(Uuid),

    #[error("supplier chain loops back through {0}")]
    Cycle(Uuid),

    #[error("supplier chain is deeper than {MAX_DEPTH} levels")]
    TooDeep,
}

#[derive(Debug, Clone, Default)]
pub struct SupplierTree {
    parents: HashMap<Uuid, Option<Uuid>>,
}

impl SupplierTree {
    pub fn new(links: impl IntoIterator<Item = (Uuid, Option<Uuid>)>) -> Self {
        Self {
            parents: links.into_iter().collect(),
        }
    }

    /// Depth of a persisted supplier.
    pub fn level(&self, id: Uuid) -> Result<usize, HierarchyError> {
        let parent = *self
            .parents
            .get(&id)
            .ok_or(HierarchyError::UnknownSupplier(id))?;
        self.level_with_parent(id, parent)
    }

    /// Depth `id` would have if its parent link were `parent`. The stored link
    /// for `id`, if any, is ignored, so this works for unsaved candidates too.
    pub fn level_with_parent(
        &self,
        id: Uuid,
        parent: Option<Uuid>,
    ) -> Result<usize, HierarchyError> {
        let mut seen = HashSet::from([id]);
        let mut next = parent;
        let mut depth = 0;

        while let Some(current) = next {
            if !seen.insert(current) {
                return Err(HierarchyError::Cycle(current));
            }
            depth += 1;
            if depth > MAX_DEPTH {
                return Err(HierarchyError::TooDeep);
            }
            next = *self
                .parents
                .get(&current)
                .ok_or(HierarchyError::UnknownSupplier(current))?;
        }

        Ok(depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(len: usize) -> (Vec<Uuid>, SupplierTree) {
        let ids: Vec<Uuid> = (0..len).map(|_| Uuid::new_v4()).collect();
        let links = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i.checked_sub(1).map(|p| ids[p])));
        let tree = SupplierTree::new(links);
        (ids, tree)
    }

    #[test]
    fn root_is_level_zero() {
        let (ids, tree) = chain(1);
        assert_eq!(tree.level(ids[0]), Ok(0));
    }

    #[test]
    fn level_is_one_more_than_parent_level() {
        let (ids, tree) = chain(6);
        for pair in ids.windows(2) {
            assert_eq!(tree.level(pair[1]).unwrap(), tree.level(pair[0]).unwrap() + 1);
        }
        assert_eq!(tree.level(ids[5]), Ok(5));
    }

    #[test]
    fn candidate_level_uses_prospective_parent() {
        let (ids, tree) = chain(3);
        let candidate = Uuid::new_v4();
        assert_eq!(tree.level_with_parent(candidate, None), Ok(0));
        assert_eq!(tree.level_with_parent(candidate, Some(ids[2])), Ok(3));
        // re-parenting an existing node ignores its stored link
        assert_eq!(tree.level_with_parent(ids[2], Some(ids[0])), Ok(1));
        assert_eq!(tree.level_with_parent(ids[2], None), Ok(0));
    }

    #[test]
    fn unknown_parent_is_reported() {
        let tree = SupplierTree::default();
        let missing = Uuid::new_v4();
        assert_eq!(
            tree.level_with_parent(Uuid::new_v4(), Some(missing)),
            Err(HierarchyError::UnknownSupplier(missing))
        );
        assert_eq!(
            tree.level(missing),
            Err(HierarchyError::UnknownSupplier(missing))
        );
    }

    #[test]
    fn stored_cycle_terminates() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let tree = SupplierTree::new([(a, Some(b)), (b, Some(a))]);
        assert_eq!(tree.level(a), Err(HierarchyError::Cycle(a)));
        assert_eq!(tree.level(b), Err(HierarchyError::Cycle(b)));
    }

    #[test]
    fn reparenting_under_a_descendant_is_a_cycle() {
        let (ids, tree) = chain(4);
        assert_eq!(
            tree.level_with_parent(ids[1], Some(ids[3])),
            Err(HierarchyError::Cycle(ids[1]))
        );
    }

    #[test]
    fn self_link_is_a_cycle() {
        let id = Uuid::new_v4();
        let tree = SupplierTree::new([(id, Some(id))]);
        assert_eq!(tree.level(id), Err(HierarchyError::Cycle(id)));
    }

    #[test]
    fn walk_is_bounded() {
        let (ids, tree) = chain(MAX_DEPTH + 2);
        assert_eq!(tree.level(ids[MAX_DEPTH]), Ok(MAX_DEPTH));
        assert_eq!(tree.level(ids[MAX_DEPTH + 1]), Err(HierarchyError::TooDeep));
    }
}
