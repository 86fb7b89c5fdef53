//! Explicit-stack traversals over the vertical structure.

use generational_arena::Index;

use crate::domain::tree::ChrisTree;

impl<T> ChrisTree<T> {
    /// Depth-first pre-order walk over the whole tree, root first.
    pub fn iter(&self) -> PreOrderIter<'_, T> {
        self.iter_from(self.root)
    }

    /// Depth-first pre-order walk over the subtree rooted at `start`.
    pub fn iter_from(&self, start: Index) -> PreOrderIter<'_, T> {
        PreOrderIter::new(self, start)
    }

    /// Depth-first post-order walk over the whole tree, root last.
    pub fn iter_postorder(&self) -> PostOrderIter<'_, T> {
        PostOrderIter::new(self, self.root)
    }

    /// Payloads of the subtree rooted at `start`, in pre-order.
    pub fn payloads_from(&self, start: Index) -> impl Iterator<Item = &T> + '_ {
        self.iter_from(start)
            .filter_map(move |idx| self.node(idx).payload.as_ref())
    }
}

pub struct PreOrderIter<'a, T> {
    tree: &'a ChrisTree<T>,
    stack: Vec<Index>,
}

impl<'a, T> PreOrderIter<'a, T> {
    fn new(tree: &'a ChrisTree<T>, start: Index) -> Self {
        let mut stack = Vec::new();
        if tree.get_node(start).is_some() {
            stack.push(start);
        }
        Self { tree, stack }
    }
}

impl<T> Iterator for PreOrderIter<'_, T> {
    type Item = Index;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Push children in reverse order for ascending traversal
        self.stack.extend(self.tree.node(current).children().rev());
        Some(current)
    }
}

pub struct PostOrderIter<'a, T> {
    tree: &'a ChrisTree<T>,
    stack: Vec<(Index, bool)>,
}

impl<'a, T> PostOrderIter<'a, T> {
    fn new(tree: &'a ChrisTree<T>, start: Index) -> Self {
        let mut stack = Vec::new();
        if tree.get_node(start).is_some() {
            stack.push((start, false));
        }
        Self { tree, stack }
    }
}

impl<T> Iterator for PostOrderIter<'_, T> {
    type Item = Index;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if visited {
                return Some(current);
            }
            self.stack.push((current, true));
            self.stack
                .extend(self.tree.node(current).children().rev().map(|c| (c, false)));
        }
        None
    }
}
