use crate::node::{NodeId, Nodes};

/// Iterator over a contiguous run of items, in sort order, from
/// [`RbTree::iter`] and [`RbTree::range`]. Stepping from either end is an
/// in-order successor or predecessor hop, O(1) amortized.
///
/// [`RbTree::iter`]: crate::RbTree::iter
/// [`RbTree::range`]: crate::RbTree::range
pub struct Iter<'a, T> {
    nodes: &'a Nodes<T>,
    front: Option<NodeId>,
    back: Option<NodeId>,
}

impl<'a, T> Iter<'a, T> {
    // `front` and `back` are either both None or both point into the
    // tree, with `front` not after `back`.
    pub(crate) fn new(nodes: &'a Nodes<T>, front: Option<NodeId>, back: Option<NodeId>) -> Self {
        Iter { nodes, front, back }
    }

    fn finish(&mut self) {
        self.front = None;
        self.back = None;
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let (nodes, id) = (self.nodes, self.front?);
        if self.front == self.back {
            self.finish();
        } else {
            self.front = nodes.next(id);
        }
        Some(&nodes[id].item)
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let (nodes, id) = (self.nodes, self.back?);
        if self.front == self.back {
            self.finish();
        } else {
            self.back = nodes.prev(id);
        }
        Some(&nodes[id].item)
    }
}
