//! Tree nodes and their per-parent child sets.

use generational_arena::Index;

use crate::domain::error::{TreeError, TreeResult};

/// Child slots preallocated for every new node.
pub const CHILDREN_MIN: usize = 5;

/// Depth carried by the synthetic root.
pub const ROOT_DEPTH: i32 = -1;

/// One byte position along one or more stored keys.
///
/// `children` holds `(discriminator, index)` pairs sorted ascending by
/// discriminator, so the child set can be searched and kept ordered without
/// touching the arena. `parent`, `before` and `after` are non-owning links.
#[derive(Debug)]
pub struct Node<T> {
    pub(crate) depth: i32,
    pub(crate) layer_id: u64,
    pub(crate) discriminator: u8,
    pub(crate) payload: Option<T>,
    pub(crate) parent: Option<Index>,
    pub(crate) children: Vec<(u8, Index)>,
    pub(crate) child_capacity: usize,
    pub(crate) before: Option<Index>,
    pub(crate) after: Option<Index>,
}

impl<T> Node<T> {
    /// Create an unlinked node with room for [`CHILDREN_MIN`] children.
    ///
    /// Nothing is left behind when the child storage cannot be obtained.
    pub fn new(depth: i32, discriminator: u8) -> TreeResult<Self> {
        let mut children = Vec::new();
        children
            .try_reserve_exact(CHILDREN_MIN)
            .map_err(|e| TreeError::Allocation(format!("child storage for new node: {e}")))?;

        Ok(Self {
            depth,
            layer_id: 0,
            discriminator,
            payload: None,
            parent: None,
            children,
            child_capacity: CHILDREN_MIN,
            before: None,
            after: None,
        })
    }

    pub(crate) fn root() -> TreeResult<Self> {
        Self::new(ROOT_DEPTH, 0)
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn layer_id(&self) -> u64 {
        self.layer_id
    }

    pub fn discriminator(&self) -> u8 {
        self.discriminator
    }

    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    pub fn parent(&self) -> Option<Index> {
        self.parent
    }

    pub fn before(&self) -> Option<Index> {
        self.before
    }

    pub fn after(&self) -> Option<Index> {
        self.after
    }

    pub fn is_root(&self) -> bool {
        self.depth == ROOT_DEPTH
    }

    /// Child handles in ascending discriminator order.
    pub fn children(&self) -> impl DoubleEndedIterator<Item = Index> + '_ {
        self.children.iter().map(|&(_, idx)| idx)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Slots currently reserved for children. Starts at [`CHILDREN_MIN`],
    /// doubles on overflow, never shrinks.
    pub fn child_capacity(&self) -> usize {
        self.child_capacity
    }

    /// Insert `child` keeping the set sorted by discriminator.
    ///
    /// The child lands in front of the first occupant with a greater
    /// discriminator. Callers guarantee the discriminator is not present yet.
    pub fn add_child(&mut self, discriminator: u8, child: Index) -> TreeResult<()> {
        if self.children.len() == self.child_capacity {
            let grown = self.child_capacity * 2;
            self.children.try_reserve_exact(grown - self.children.len())?;
            self.child_capacity = grown;
        }

        let pos = self
            .children
            .iter()
            .position(|&(d, _)| d > discriminator)
            .unwrap_or(self.children.len());
        self.children.insert(pos, (discriminator, child));
        Ok(())
    }

    /// Remove the child registered under `discriminator`.
    ///
    /// Silent no-op when no such child exists.
    pub fn remove_child(&mut self, discriminator: u8) -> Option<Index> {
        let pos = self.children.iter().position(|&(d, _)| d == discriminator)?;
        Some(self.children.remove(pos).1)
    }

    pub fn find_child(&self, discriminator: u8) -> Option<Index> {
        self.children
            .iter()
            .find(|&&(d, _)| d == discriminator)
            .map(|&(_, idx)| idx)
    }
}
