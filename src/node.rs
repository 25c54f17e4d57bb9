use std::{
    cmp::Ordering,
    mem,
    ops::{Bound, Index, IndexMut},
};

use crate::item::{order, Item};

/// Handle to a node slot in [`Nodes`]. Handles are only meaningful for the
/// arena that issued them, and only until the node is released.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct NodeId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Color {
    Red,
    Black,
}

/// Node corresponds to a single item in the tree.
#[derive(Clone)]
pub(crate) struct Node<T> {
    pub(crate) item: T,
    pub(crate) color: Color,
    pub(crate) parent: Option<NodeId>, // navigation only, never owns
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
}

impl<T> Node<T> {
    // CREATE operation, new nodes are always red.
    pub(crate) fn new(item: T, parent: Option<NodeId>) -> Node<T> {
        Node {
            item,
            color: Color::Red,
            parent,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub(crate) fn is_black(&self) -> bool {
        self.color == Color::Black
    }
}

/// Slab of tree nodes. Released slots are recycled by later allocations.
#[derive(Clone)]
pub(crate) struct Nodes<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<NodeId>,
}

impl<T> Nodes<T> {
    pub(crate) fn new() -> Nodes<T> {
        Nodes {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Nodes<T> {
        Nodes {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Number of live nodes.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub(crate) fn alloc(&mut self, node: Node<T>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.slots[id.0] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Detach node from the arena and hand it back to the caller.
    pub(crate) fn release(&mut self, id: NodeId) -> Node<T> {
        match self.slots[id.0].take() {
            Some(node) => {
                self.free.push(id);
                node
            }
            None => panic!("release(): node {:?} already released", id),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    /// Exchange the items held by two live nodes, links and colors stay.
    pub(crate) fn swap_items(&mut self, a: NodeId, b: NodeId) {
        let (lo, hi) = match a.0.cmp(&b.0) {
            Ordering::Equal => return,
            Ordering::Less => (a, b),
            Ordering::Greater => (b, a),
        };
        let (head, tail) = self.slots.split_at_mut(hi.0);
        match (head[lo.0].as_mut(), tail[0].as_mut()) {
            (Some(x), Some(y)) => mem::swap(&mut x.item, &mut y.item),
            _ => panic!("swap_items(): released node {:?} {:?}", a, b),
        }
    }

    //--------- navigation ----------------

    #[inline]
    pub(crate) fn is_red(&self, id: Option<NodeId>) -> bool {
        id.map_or(false, |id| !self[id].is_black())
    }

    #[inline]
    pub(crate) fn is_black(&self, id: Option<NodeId>) -> bool {
        id.map_or(true, |id| self[id].is_black())
    }

    pub(crate) fn min(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self[id].left {
            id = left;
        }
        id
    }

    pub(crate) fn max(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self[id].right {
            id = right;
        }
        id
    }

    /// In-order successor.
    pub(crate) fn next(&self, mut id: NodeId) -> Option<NodeId> {
        if let Some(right) = self[id].right {
            return Some(self.min(right));
        }
        let mut parent = self[id].parent;
        while let Some(p) = parent {
            if self[p].right != Some(id) {
                break;
            }
            id = p;
            parent = self[p].parent;
        }
        parent
    }

    /// In-order predecessor.
    pub(crate) fn prev(&self, mut id: NodeId) -> Option<NodeId> {
        if let Some(left) = self[id].left {
            return Some(self.max(left));
        }
        let mut parent = self[id].parent;
        while let Some(p) = parent {
            if self[p].left != Some(id) {
                break;
            }
            id = p;
            parent = self[p].parent;
        }
        parent
    }

    /// The other child of `parent`, `id` may be an absent position.
    #[inline]
    pub(crate) fn sibling(&self, id: Option<NodeId>, parent: NodeId) -> Option<NodeId> {
        let node = &self[parent];
        if id == node.left {
            node.right
        } else {
            node.left
        }
    }
}

impl<T> Nodes<T>
where
    T: Item,
{
    pub(crate) fn find(&self, mut node: Option<NodeId>, item: &T) -> Option<NodeId> {
        while let Some(id) = node {
            node = match order(item, &self[id].item) {
                Ordering::Less => self[id].left,
                Ordering::Greater => self[id].right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    /// First node, in sort order, admitted by the `low` bound.
    pub(crate) fn lower_bound(&self, root: Option<NodeId>, low: Bound<&T>) -> Option<NodeId> {
        let (mut node, mut found) = (root, None);
        while let Some(id) = node {
            let item = &self[id].item;
            let ok = match low {
                Bound::Included(low) => order(item, low) != Ordering::Less,
                Bound::Excluded(low) => order(item, low) == Ordering::Greater,
                Bound::Unbounded => true,
            };
            node = if ok {
                found = Some(id);
                self[id].left
            } else {
                self[id].right
            };
        }
        found
    }

    /// Last node, in sort order, admitted by the `high` bound.
    pub(crate) fn upper_bound(&self, root: Option<NodeId>, high: Bound<&T>) -> Option<NodeId> {
        let (mut node, mut found) = (root, None);
        while let Some(id) = node {
            let item = &self[id].item;
            let ok = match high {
                Bound::Included(high) => order(item, high) != Ordering::Greater,
                Bound::Excluded(high) => order(item, high) == Ordering::Less,
                Bound::Unbounded => true,
            };
            node = if ok {
                found = Some(id);
                self[id].right
            } else {
                self[id].left
            };
        }
        found
    }
}

impl<T> Index<NodeId> for Nodes<T> {
    type Output = Node<T>;

    #[inline]
    fn index(&self, id: NodeId) -> &Node<T> {
        match &self.slots[id.0] {
            Some(node) => node,
            None => panic!("index(): node {:?} is released", id),
        }
    }
}

impl<T> IndexMut<NodeId> for Nodes<T> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Node<T> {
        match &mut self.slots[id.0] {
            Some(node) => node,
            None => panic!("index_mut(): node {:?} is released", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2 <- 4 -> 6, with 1 and 3 under 2.
    fn sample() -> (Nodes<i64>, NodeId) {
        let mut nodes = Nodes::new();
        let n4 = nodes.alloc(Node::new(4, None));
        let n2 = nodes.alloc(Node::new(2, Some(n4)));
        let n6 = nodes.alloc(Node::new(6, Some(n4)));
        let n1 = nodes.alloc(Node::new(1, Some(n2)));
        let n3 = nodes.alloc(Node::new(3, Some(n2)));
        nodes[n4].left = Some(n2);
        nodes[n4].right = Some(n6);
        nodes[n2].left = Some(n1);
        nodes[n2].right = Some(n3);
        (nodes, n4)
    }

    #[test]
    fn test_alloc_release() {
        let mut nodes: Nodes<i64> = Nodes::with_capacity(4);
        assert!(nodes.capacity() >= 4);
        let a = nodes.alloc(Node::new(10, None));
        let b = nodes.alloc(Node::new(20, None));
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes.release(a).item, 10);
        assert_eq!(nodes.len(), 1);
        // released slot is recycled.
        let c = nodes.alloc(Node::new(30, None));
        assert_eq!(c, a);
        assert_eq!(nodes[b].item, 20);
        assert_eq!(nodes[c].item, 30);
        nodes.swap_items(b, c);
        assert_eq!((nodes[b].item, nodes[c].item), (30, 20));
        nodes.clear();
        assert_eq!(nodes.len(), 0);
    }

    #[test]
    #[should_panic]
    fn test_double_release() {
        let mut nodes: Nodes<i64> = Nodes::new();
        let a = nodes.alloc(Node::new(10, None));
        nodes.release(a);
        nodes.release(a);
    }

    #[test]
    fn test_navigation() {
        let (nodes, root) = sample();
        let min = nodes.min(root);
        assert_eq!(nodes[min].item, 1);
        assert_eq!(nodes[nodes.max(root)].item, 6);

        let mut items = vec![];
        let mut node = Some(min);
        while let Some(id) = node {
            items.push(nodes[id].item);
            node = nodes.next(id);
        }
        assert_eq!(items, vec![1, 2, 3, 4, 6]);

        let mut items = vec![];
        let mut node = Some(nodes.max(root));
        while let Some(id) = node {
            items.push(nodes[id].item);
            node = nodes.prev(id);
        }
        assert_eq!(items, vec![6, 4, 3, 2, 1]);
    }

    #[test]
    fn test_bounds() {
        let (nodes, root) = sample();
        let root = Some(root);
        let item = |id: Option<NodeId>| id.map(|id| nodes[id].item);

        assert_eq!(item(nodes.find(root, &3)), Some(3));
        assert_eq!(item(nodes.find(root, &5)), None);

        assert_eq!(item(nodes.lower_bound(root, Bound::Included(&5))), Some(6));
        assert_eq!(item(nodes.lower_bound(root, Bound::Included(&4))), Some(4));
        assert_eq!(item(nodes.lower_bound(root, Bound::Excluded(&4))), Some(6));
        assert_eq!(item(nodes.lower_bound(root, Bound::Excluded(&6))), None);
        assert_eq!(item(nodes.lower_bound(root, Bound::Unbounded)), Some(1));

        assert_eq!(item(nodes.upper_bound(root, Bound::Included(&5))), Some(4));
        assert_eq!(item(nodes.upper_bound(root, Bound::Excluded(&4))), Some(3));
        assert_eq!(item(nodes.upper_bound(root, Bound::Excluded(&1))), None);
        assert_eq!(item(nodes.upper_bound(root, Bound::Unbounded)), Some(6));
    }
}
