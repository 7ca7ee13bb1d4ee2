use super::node_arena::NodeId;
use super::symbol::Symbol;

/// A compact representation of the outgoing edges of a trie node that doesn't
/// allocate until there are at least three children.
///
/// Labels are unique within one node; their order is insertion order and carries
/// no meaning.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Children<C: Symbol> {
    /// No children.
    #[default]
    None,
    /// Exactly one child (label, node).
    One((C, NodeId)),
    /// Exactly two children (label1, node1, label2, node2).
    Two((C, NodeId, C, NodeId)),
    /// Three or more children stored in a vector.
    Many(Vec<(C, NodeId)>),
}

impl<C: Symbol> Children<C> {
    /// Gets the child at the specified index.
    ///
    /// Returns `None` if the index is out of bounds.
    #[inline]
    pub fn get_index(&self, index: usize) -> Option<(C, NodeId)> {
        match self {
            Children::None => None,
            Children::One(child) => match index {
                0 => Some(*child),
                _ => None,
            },
            Children::Two((c1, n1, c2, n2)) => match index {
                0 => Some((*c1, *n1)),
                1 => Some((*c2, *n2)),
                _ => None,
            },
            Children::Many(children) => children.get(index).copied(),
        }
    }

    /// Returns the node that `label`'s edge leads to, or None if no such edge exists.
    #[inline]
    pub fn get(&self, label: C) -> Option<NodeId> {
        match self {
            Children::None => None,
            Children::One((c, node)) => (*c == label).then_some(*node),
            Children::Two((c1, n1, c2, n2)) => {
                if label == *c1 {
                    Some(*n1)
                } else if label == *c2 {
                    Some(*n2)
                } else {
                    None
                }
            }
            Children::Many(children) => {
                // Unrolling by 2 exposes load-level parallelism and beats both
                // binary search and a scalar loop on the small fan-outs tries have.
                let chunks = children.chunks_exact(2);
                let remainder = chunks.remainder();
                for chunk in chunks {
                    if chunk[0].0 == label {
                        return Some(chunk[0].1);
                    }
                    if chunk[1].0 == label {
                        return Some(chunk[1].1);
                    }
                }
                remainder
                    .iter()
                    .find(|&&(c, _)| c == label)
                    .map(|&(_, node)| node)
            }
        }
    }

    /// Adds an edge. The label must not already be present.
    pub fn insert(&mut self, label: C, node: NodeId) {
        debug_assert!(self.get(label).is_none(), "insert: label already exists");
        let c = (label, node);
        match self {
            Children::None => *self = Children::One(c),
            Children::One((c1, n1)) => *self = Children::Two((*c1, *n1, c.0, c.1)),
            Children::Two((c1, n1, c2, n2)) => {
                *self = Children::Many(vec![(*c1, *n1), (*c2, *n2), c])
            }
            Children::Many(children) => children.push(c),
        }
    }

    /// Returns the number of children.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Children::None => 0,
            Children::One(_) => 1,
            Children::Two(_) => 2,
            Children::Many(children) => children.len(),
        }
    }

    /// True if there are no children.
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Children::None)
    }

    /// Returns an iterator over all `(label, node)` edges.
    #[inline]
    pub fn iter(&self) -> ChildIter<'_, C> {
        ChildIter {
            children: self,
            index: Some(0),
        }
    }
}

/// An iterator over the children of a trie node.
#[derive(Clone)]
pub struct ChildIter<'t, C: Symbol> {
    children: &'t Children<C>,
    index: Option<usize>,
}

impl<C: Symbol> Iterator for ChildIter<'_, C> {
    type Item = (C, NodeId);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let index = self.index?;
        let next_child = self.children.get_index(index);
        self.index = if next_child.is_some() {
            index.checked_add(1)
        } else {
            None
        };
        next_child
    }

    /// Since we know the exact size, we can do better than the default implementation.
    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.index {
            Some(i) => self.children.len().saturating_sub(i),
            None => 0,
        };
        (remaining, Some(remaining))
    }
}

impl<C: Symbol> ExactSizeIterator for ChildIter<'_, C> {}
