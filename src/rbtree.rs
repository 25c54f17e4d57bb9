use std::{
    cmp::Ordering,
    fmt, mem,
    ops::{Bound, RangeBounds},
};

use log::{debug, error, trace};
use rand::Rng;

use crate::depth::Depth;
use crate::error::Error;
use crate::item::{order, Item};
use crate::iter::Iter;
use crate::node::{Color, Node, NodeId, Nodes};

/// RbTree manage a single instance of in-memory index using
/// [red-black][rbtree] tree, with parent links for upward navigation.
///
/// Writers must be serialized by the caller. Concurrent readers are fine
/// as long as no writer is active, which the borrow checker enforces for
/// safe code.
///
/// [rbtree]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree
#[derive(Clone)]
pub struct RbTree<T>
where
    T: Item,
{
    name: String,
    root: Option<NodeId>,
    nodes: Nodes<T>,
    n_count: usize, // number of items in the tree.
}

impl<T> Default for RbTree<T>
where
    T: Item,
{
    fn default() -> RbTree<T> {
        RbTree::new("")
    }
}

/// Different ways to construct a new RbTree instance.
impl<T> RbTree<T>
where
    T: Item,
{
    /// Create an empty instance of RbTree, identified by `name`.
    /// Applications can choose unique names.
    pub fn new<S>(name: S) -> RbTree<T>
    where
        S: AsRef<str>,
    {
        RbTree {
            name: name.as_ref().to_string(),
            root: Default::default(),
            nodes: Nodes::new(),
            n_count: Default::default(),
        }
    }

    /// Create an empty instance with room for `capacity` nodes before
    /// the node arena has to grow.
    pub fn with_capacity<S>(name: S, capacity: usize) -> RbTree<T>
    where
        S: AsRef<str>,
    {
        RbTree {
            name: name.as_ref().to_string(),
            root: Default::default(),
            nodes: Nodes::with_capacity(capacity),
            n_count: Default::default(),
        }
    }

    /// Create a new instance of RbTree and load it with items from
    /// `iter`. Items equal to an earlier item replace it.
    pub fn load_from<S, I>(name: S, iter: I) -> RbTree<T>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = T>,
    {
        let mut tree = RbTree::new(name);
        for item in iter {
            tree.upsert(item);
        }
        debug!("{}: loaded {} items", tree.name, tree.n_count);
        tree
    }
}

/// Maintenance API.
impl<T> RbTree<T>
where
    T: Item,
{
    /// Identify this instance. Applications can choose unique names while
    /// creating RbTree instances.
    #[inline]
    pub fn id(&self) -> String {
        self.name.clone()
    }

    /// Return number of items in this instance.
    #[inline]
    pub fn len(&self) -> usize {
        self.n_count
    }

    /// Check whether this index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_count == 0
    }

    /// Return the number of nodes the arena can hold without growing.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Remove all items.
    pub fn clear(&mut self) {
        debug!("{}: clear {} items", self.name, self.n_count);
        self.root = None;
        self.nodes.clear();
        self.n_count = 0;
    }

    /// Return quickly with basic statisics, only entries() and
    /// node_size() are valid with this statisics.
    pub fn stats(&self) -> Stats {
        Stats::new(self.n_count, mem::size_of::<Node<T>>())
    }
}

/// Write operations on RbTree instance.
impl<T> RbTree<T>
where
    T: Item,
{
    /// Create a new item in the index. If an equal item is already
    /// present return error and leave the tree untouched.
    pub fn create(&mut self, item: T) -> Result<(), Error<T>> {
        if self.nodes.find(self.root, &item).is_some() {
            return Err(Error::OverwriteKey);
        }
        self.upsert(item);
        Ok(())
    }

    /// Insert item. If there is an equal item, replace it in place and
    /// return the replaced item.
    pub fn upsert(&mut self, item: T) -> Option<T> {
        let root = match self.root {
            Some(root) => root,
            None => {
                let mut node = Node::new(item, None);
                node.color = Color::Black;
                self.root = Some(self.nodes.alloc(node));
                self.n_count = 1;
                return None;
            }
        };

        match self.insert_at(root, item) {
            Insert::Replaced(old_item) => Some(old_item),
            Insert::Attached(id) => {
                self.n_count += 1;
                self.rebalance_insert(id);
                None
            }
        }
    }

    /// Delete item equal to `item` from this instance and return it. If
    /// item is not present, then delete is effectively a no-op.
    pub fn delete(&mut self, item: &T) -> Option<T> {
        let id = self.nodes.find(self.root, item)?;
        Some(self.delete_node(id))
    }

    /// Delete the minimum item and return it.
    pub fn delete_min(&mut self) -> Option<T> {
        let id = self.nodes.min(self.root?);
        Some(self.delete_node(id))
    }

    /// Delete the maximum item and return it.
    pub fn delete_max(&mut self) -> Option<T> {
        let id = self.nodes.max(self.root?);
        Some(self.delete_node(id))
    }
}

/// Read operations on RbTree instance.
impl<T> RbTree<T>
where
    T: Item,
{
    /// Get the stored item equal to `item`.
    pub fn get(&self, item: &T) -> Option<&T> {
        let id = self.nodes.find(self.root, item)?;
        Some(&self.nodes[id].item)
    }

    /// Check whether an item equal to `item` is stored.
    pub fn exists(&self, item: &T) -> bool {
        self.nodes.find(self.root, item).is_some()
    }

    /// Return the minimum item.
    pub fn min(&self) -> Option<&T> {
        let id = self.nodes.min(self.root?);
        Some(&self.nodes[id].item)
    }

    /// Return the maximum item.
    pub fn max(&self) -> Option<&T> {
        let id = self.nodes.max(self.root?);
        Some(&self.nodes[id].item)
    }

    /// Return a random item from this index.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<&T> {
        let mut id = self.root?;

        let mut at_depth = rng.gen::<u8>() % 40;
        loop {
            let node = &self.nodes[id];
            let next = match rng.gen::<u8>() % 2 {
                0 => node.left,
                _ => node.right,
            };
            match next {
                Some(next) if at_depth > 0 => {
                    at_depth -= 1;
                    id = next;
                }
                _ => break Some(&node.item),
            }
        }
    }

    /// Return a double-ended iterator over all items in sort order.
    pub fn iter(&self) -> Iter<T> {
        self.range::<(Bound<&T>, Bound<&T>)>((Bound::Unbounded, Bound::Unbounded))
    }

    /// Range over items from low to high. Use `rev()` on the returned
    /// iterator to range from high to low. An inverted range is empty.
    pub fn range<R>(&self, range: R) -> Iter<T>
    where
        R: RangeBounds<T>,
    {
        let front = self.nodes.lower_bound(self.root, range.start_bound());
        let back = self.nodes.upper_bound(self.root, range.end_bound());
        match (front, back) {
            (Some(f), Some(b)) => {
                let (fitem, bitem) = (&self.nodes[f].item, &self.nodes[b].item);
                if order(fitem, bitem) == Ordering::Greater {
                    Iter::new(&self.nodes, None, None)
                } else {
                    Iter::new(&self.nodes, front, back)
                }
            }
            _ => Iter::new(&self.nodes, None, None),
        }
    }

    /// Call `visit` on each item in ascending order, until items are
    /// exhausted or `visit` returns false.
    pub fn ascend<F>(&self, visit: F)
    where
        F: FnMut(&T) -> bool,
    {
        visit_while(self.iter(), visit)
    }

    /// Call `visit` on each item in descending order, until items are
    /// exhausted or `visit` returns false.
    pub fn descend<F>(&self, visit: F)
    where
        F: FnMut(&T) -> bool,
    {
        visit_while(self.iter().rev(), visit)
    }

    /// Same as [`RbTree::ascend`], starting from the first item that is
    /// not less than `low`.
    pub fn ascend_greater_or_equal<F>(&self, low: &T, visit: F)
    where
        F: FnMut(&T) -> bool,
    {
        let range = (Bound::Included(low), Bound::Unbounded);
        visit_while(self.range::<(Bound<&T>, Bound<&T>)>(range), visit)
    }

    /// Same as [`RbTree::ascend`], stopping before the first item that is
    /// not less than `high`.
    pub fn ascend_less<F>(&self, high: &T, visit: F)
    where
        F: FnMut(&T) -> bool,
    {
        let range = (Bound::Unbounded, Bound::Excluded(high));
        visit_while(self.range::<(Bound<&T>, Bound<&T>)>(range), visit)
    }

    /// Visit items in `[low, high)` in ascending order. If `low` is not
    /// less than `high` nothing is visited.
    pub fn ascend_range<F>(&self, low: &T, high: &T, visit: F)
    where
        F: FnMut(&T) -> bool,
    {
        let range = (Bound::Included(low), Bound::Excluded(high));
        visit_while(self.range::<(Bound<&T>, Bound<&T>)>(range), visit)
    }
}

fn visit_while<'a, T, I, F>(iter: I, mut visit: F)
where
    T: 'a,
    I: Iterator<Item = &'a T>,
    F: FnMut(&T) -> bool,
{
    for item in iter {
        if !visit(item) {
            break;
        }
    }
}

/// Validation API.
impl<T> RbTree<T>
where
    T: Item + Clone + fmt::Debug,
{
    /// Validate red-black tree with following rules:
    ///
    /// * Root node, if any, is black.
    /// * From root to any leaf, no consecutive reds allowed in its path.
    /// * Number of blacks should be same under left child and right child.
    /// * Make sure items are in sorted order.
    /// * Every child points back to its parent.
    /// * Number of reachable nodes match the item count.
    ///
    /// Additionally return full statistics on the tree. Refer to [`Stats`]
    /// for more information.
    pub fn validate(&self) -> Result<Stats, Error<T>> {
        let res = self.do_validate();
        if let Err(err) = &res {
            error!("{}: validate failed, {:?}", self.name, err);
        }
        res
    }

    fn do_validate(&self) -> Result<Stats, Error<T>> {
        if self.nodes.is_red(self.root) {
            return Err(Error::RedRoot);
        }
        if let Some(root) = self.root {
            if let Some(parent) = self.nodes[root].parent {
                let msg = format!("root has parent {:?}", parent);
                return Err(Error::BrokenLink(msg));
            }
        }

        let mut stats = Stats::new(self.n_count, mem::size_of::<Node<T>>());
        stats.set_depths(Depth::new());
        let mut n_nodes = 0;
        let blacks = self.validate_tree(self.root, false, 0, 0, &mut n_nodes, &mut stats)?;
        if n_nodes != self.n_count || self.nodes.len() != self.n_count {
            return Err(Error::SizeMismatch(n_nodes, self.n_count));
        }
        stats.set_blacks(blacks);
        Ok(stats)
    }

    fn validate_tree(
        &self,
        node: Option<NodeId>,
        fromred: bool,
        mut nb: usize,
        depth: usize,
        n_nodes: &mut usize,
        stats: &mut Stats,
    ) -> Result<usize, Error<T>> {
        let id = match node {
            None => {
                if let Some(depths) = stats.depths.as_mut() {
                    depths.record(depth);
                }
                return Ok(nb + 1); // absent positions count as black.
            }
            Some(id) => id,
        };
        *n_nodes += 1;

        let red = self.nodes.is_red(node);
        if fromred && red {
            return Err(Error::ConsecutiveReds);
        }
        if !red {
            nb += 1;
        }
        let n = &self.nodes[id];
        for child in [n.left, n.right].iter().filter_map(|c| *c) {
            if self.nodes[child].parent != Some(id) {
                let msg = format!("{:?} not pointing back to {:?}", child, id);
                return Err(Error::BrokenLink(msg));
            }
        }

        let lblacks = self.validate_tree(n.left, red, nb, depth + 1, n_nodes, stats)?;
        let rblacks = self.validate_tree(n.right, red, nb, depth + 1, n_nodes, stats)?;
        if lblacks != rblacks {
            let err = format!("left: {} right: {}", lblacks, rblacks);
            return Err(Error::UnbalancedBlacks(err));
        }
        if let Some(left) = n.left {
            let left = &self.nodes[left];
            if !left.item.less(&n.item) {
                let (litem, parent) = (left.item.clone(), n.item.clone());
                return Err(Error::SortError(litem, parent));
            }
        }
        if let Some(right) = n.right {
            let right = &self.nodes[right];
            if !n.item.less(&right.item) {
                let (ritem, parent) = (right.item.clone(), n.item.clone());
                return Err(Error::SortError(ritem, parent));
            }
        }
        Ok(lblacks)
    }
}

enum Insert<T> {
    Replaced(T),
    Attached(NodeId),
}

impl<T> RbTree<T>
where
    T: Item,
{
    fn insert_at(&mut self, mut id: NodeId, item: T) -> Insert<T> {
        loop {
            let node = &self.nodes[id];
            let (left, right) = (node.left, node.right);
            match order(&item, &node.item) {
                Ordering::Less => match left {
                    Some(left) => id = left,
                    None => {
                        let child = self.nodes.alloc(Node::new(item, Some(id)));
                        self.nodes[id].left = Some(child);
                        break Insert::Attached(child);
                    }
                },
                Ordering::Greater => match right {
                    Some(right) => id = right,
                    None => {
                        let child = self.nodes.alloc(Node::new(item, Some(id)));
                        self.nodes[id].right = Some(child);
                        break Insert::Attached(child);
                    }
                },
                Ordering::Equal => {
                    let old_item = mem::replace(&mut self.nodes[id].item, item);
                    break Insert::Replaced(old_item);
                }
            }
        }
    }

    fn rebalance_insert(&mut self, mut n: NodeId) {
        let (parent, grandparent) = loop {
            // case 1, n is root.
            let parent = match self.nodes[n].parent {
                Some(parent) => parent,
                None => {
                    self.nodes[n].color = Color::Black;
                    return;
                }
            };
            // case 2, parent is black.
            if self.nodes[parent].is_black() {
                return;
            }
            // root is always black, a red parent has a parent.
            let grandparent = match self.nodes[parent].parent {
                Some(grandparent) => grandparent,
                None => panic!("rebalance_insert(): red root, call the programmer"),
            };
            // case 3, red uncle, push the red up to grandparent.
            let uncle = self.nodes.sibling(Some(parent), grandparent);
            match uncle {
                Some(uncle) if !self.nodes[uncle].is_black() => {
                    trace!("{}: insert fixup, red uncle", self.name);
                    self.nodes[parent].color = Color::Black;
                    self.nodes[uncle].color = Color::Black;
                    self.nodes[grandparent].color = Color::Red;
                    n = grandparent;
                }
                _ => break (parent, grandparent),
            }
        };

        // case 4, inner grandchild, straighten the line.
        let (mut n, mut parent) = (n, parent);
        let parent_is_left = self.nodes[grandparent].left == Some(parent);
        if self.nodes[parent].right == Some(n) && parent_is_left {
            self.rotate_left(parent);
            mem::swap(&mut n, &mut parent);
        } else if self.nodes[parent].left == Some(n) && !parent_is_left {
            self.rotate_right(parent);
            mem::swap(&mut n, &mut parent);
        }

        // case 5, outer grandchild.
        self.nodes[parent].color = Color::Black;
        self.nodes[grandparent].color = Color::Red;
        if self.nodes[parent].left == Some(n) {
            self.rotate_right(grandparent);
        } else {
            self.rotate_left(grandparent);
        }
    }

    fn delete_node(&mut self, mut id: NodeId) -> T {
        // move the item down to the in-order successor until the node to
        // splice has at most one child.
        loop {
            let node = &self.nodes[id];
            match (node.left, node.right) {
                (Some(_), Some(right)) => {
                    let successor = self.nodes.min(right);
                    self.nodes.swap_items(id, successor);
                    id = successor;
                }
                _ => break,
            }
        }

        let node = &self.nodes[id];
        let (child, parent, color) = (node.left.or(node.right), node.parent, node.color);
        self.replace(id, child);
        let item = self.nodes.release(id).item;
        self.n_count -= 1;

        if color == Color::Red {
            return item;
        }
        match child {
            Some(child) if !self.nodes[child].is_black() => {
                self.nodes[child].color = Color::Black;
            }
            _ => self.rebalance_delete(child, parent),
        }
        item
    }

    // `n` is the position carrying an extra black, possibly absent, and
    // `parent` is its parent when `n` is absent.
    fn rebalance_delete(&mut self, mut n: Option<NodeId>, mut parent: Option<NodeId>) {
        let (p, s) = loop {
            // case 1, deficiency reached the root.
            if n == self.root {
                return;
            }
            if let Some(id) = n {
                parent = self.nodes[id].parent;
            }
            let p = match parent {
                Some(p) => p,
                None => panic!("rebalance_delete(): orphan position, call the programmer"),
            };

            // case 2, red sibling, rotate it above parent.
            let s = self.nodes.sibling(n, p);
            if self.nodes.is_red(s) {
                self.nodes[p].color = Color::Red;
                self.set_black(s);
                if n == self.nodes[p].left {
                    self.rotate_left(p);
                } else {
                    self.rotate_right(p);
                }
            }

            // case 3, all black, push the deficiency up to parent.
            let s = self.nodes.sibling(n, p);
            if self.nodes[p].is_black() && s.is_some() && self.is_all_black(s) {
                trace!("{}: delete fixup, black family", self.name);
                self.set_red(s);
                n = Some(p);
                parent = self.nodes[p].parent;
                continue;
            }
            break (p, s);
        };

        // case 4, red parent, black sibling and nephews.
        if !self.nodes[p].is_black() && s.is_some() && self.is_all_black(s) {
            self.set_red(s);
            self.nodes[p].color = Color::Black;
            return;
        }

        let n_is_left = n == self.nodes[p].left;

        // case 5, near nephew red, far nephew black.
        if let Some(sid) = s {
            let (sl, sr) = (self.nodes[sid].left, self.nodes[sid].right);
            if self.nodes[sid].is_black() {
                if n_is_left && self.nodes.is_black(sr) && self.nodes.is_red(sl) {
                    self.nodes[sid].color = Color::Red;
                    self.set_black(sl);
                    self.rotate_right(sid);
                } else if !n_is_left && self.nodes.is_black(sl) && self.nodes.is_red(sr) {
                    self.nodes[sid].color = Color::Red;
                    self.set_black(sr);
                    self.rotate_left(sid);
                }
            }
        }

        // case 6, far nephew red.
        if let Some(sid) = self.nodes.sibling(n, p) {
            self.nodes[sid].color = self.nodes[p].color;
            self.nodes[p].color = Color::Black;
            if n_is_left {
                self.set_black(self.nodes[sid].right);
                self.rotate_left(p);
            } else {
                self.set_black(self.nodes[sid].left);
                self.rotate_right(p);
            }
        }
    }

    #[inline]
    fn is_all_black(&self, id: Option<NodeId>) -> bool {
        match id {
            None => true,
            Some(id) => {
                let node = &self.nodes[id];
                node.is_black() && self.nodes.is_black(node.left) && self.nodes.is_black(node.right)
            }
        }
    }

    #[inline]
    fn set_black(&mut self, id: Option<NodeId>) {
        if let Some(id) = id {
            self.nodes[id].color = Color::Black
        }
    }

    #[inline]
    fn set_red(&mut self, id: Option<NodeId>) {
        if let Some(id) = id {
            self.nodes[id].color = Color::Red
        }
    }

    //--------- rotation and splice ----------------

    //              (p)                       (p)
    //               |                         |
    //               n                         x
    //              / \                       / \
    //             /   \                     /   \
    //            /     \                   /     \
    //          left     x                 n       xr
    //                  / \               / \
    //                xl   xr          left  xl
    //
    fn rotate_left(&mut self, n: NodeId) {
        let x = match self.nodes[n].right {
            Some(x) => x,
            None => panic!("rotate_left(): no right child, call the programmer"),
        };
        let xl = self.nodes[x].left;
        self.nodes[n].right = xl;
        if let Some(xl) = xl {
            self.nodes[xl].parent = Some(n);
        }
        self.replace(n, Some(x));
        self.nodes[x].left = Some(n);
        self.nodes[n].parent = Some(x);
    }

    //              (p)                       (p)
    //               |                         |
    //               n                         x
    //              / \                       / \
    //             /   \                     /   \
    //            /     \                   /     \
    //           x      right             xl      n
    //          / \                              / \
    //        xl   xr                          xr  right
    //
    fn rotate_right(&mut self, n: NodeId) {
        let x = match self.nodes[n].left {
            Some(x) => x,
            None => panic!("rotate_right(): no left child, call the programmer"),
        };
        let xr = self.nodes[x].right;
        self.nodes[n].left = xr;
        if let Some(xr) = xr {
            self.nodes[xr].parent = Some(n);
        }
        self.replace(n, Some(x));
        self.nodes[x].right = Some(n);
        self.nodes[n].parent = Some(x);
    }

    // Install `child` in n's slot under its parent, or as root. n's own
    // links are left as they are.
    fn replace(&mut self, n: NodeId, child: Option<NodeId>) {
        let parent = self.nodes[n].parent;
        match parent {
            None => self.root = child,
            Some(p) if self.nodes[p].left == Some(n) => self.nodes[p].left = child,
            Some(p) => self.nodes[p].right = child,
        }
        if let Some(child) = child {
            self.nodes[child].parent = parent;
        }
    }
}

impl<T> fmt::Debug for RbTree<T>
where
    T: Item + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Statistics on [`RbTree`] tree. Serves two purpose:
///
/// * To get partial but quick statistics via [`RbTree::stats`] method.
/// * To get full statisics via [`RbTree::validate`] method.
#[derive(Default, Debug)]
pub struct Stats {
    entries: usize, // number of items in the tree.
    node_size: usize,
    blacks: Option<usize>,
    depths: Option<Depth>,
}

impl Stats {
    fn new(entries: usize, node_size: usize) -> Stats {
        Stats {
            entries,
            node_size,
            blacks: Default::default(),
            depths: Default::default(),
        }
    }

    #[inline]
    fn set_blacks(&mut self, blacks: usize) {
        self.blacks = Some(blacks)
    }

    #[inline]
    fn set_depths(&mut self, depths: Depth) {
        self.depths = Some(depths)
    }

    /// Return number items in [`RbTree`] instance.
    #[inline]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Return node-size, including over-head for `RbTree<T>`. Although
    /// the node overhead is constant, the node size varies based on
    /// item type. EG:
    ///
    /// ```
    /// use rb_index::RbTree;
    /// let small: RbTree<u8> = RbTree::new("small");
    /// let large: RbTree<u128> = RbTree::new("large");
    ///
    /// assert!(small.stats().node_size() < large.stats().node_size());
    /// ```
    #[inline]
    pub fn node_size(&self) -> usize {
        self.node_size
    }

    /// Return black-height, counted from root to any absent-child
    /// position, absent position included.
    #[inline]
    pub fn blacks(&self) -> Option<usize> {
        self.blacks
    }

    /// Return [`Depth`] statistics.
    pub fn depths(&self) -> Option<Depth> {
        match &self.depths {
            Some(depths) if depths.samples() > 0 => Some(depths.clone()),
            _ => None,
        }
    }
}
