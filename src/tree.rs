//! The tree engine. Every algorithm here that would naturally recurse (traversals, deep copies,
//! balanced construction, teardown) keeps its pending work on a [`Stack`] instead, so the depth
//! of a tree never threatens the call stack. Note that this tree does not balance itself. Only
//! [`Tree::build_balanced`] produces a tree of minimal height.
//!
//! # Examples
//!
//! ```
//! use stack_bst::{IntOps, Parity, Tree};
//!
//! let ops = IntOps::new(0);
//! let mut tree = Tree::new();
//!
//! for key in [5, 3, 8, 1, 4, 7, 9] {
//!     tree.insert(&key, &ops).unwrap();
//! }
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 3, 4, 5, 7, 8, 9]);
//!
//! // Deleting a node with two children promotes its in-order successor.
//! assert!(tree.delete(&5, &ops));
//! assert_eq!(tree.root().map(|n| *n.key()), Some(7));
//!
//! // Remove the even keys between 3 and 8.
//! assert_eq!(tree.delete_range(&3, &8, Parity::Even, &ops), Ok(2));
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 3, 7, 9]);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::ptr;

use tracing::{debug, trace};

use crate::ops::{KeyOps, Parity};
use crate::{Error, Stack};

type Link<K> = Option<Box<Node<K>>>;

/// A binary search tree over keys of type `K`. Keys are ordered, copied and released through the
/// [`KeyOps`] bundle handed to each call; the tree itself only owns nodes.
pub struct Tree<K> {
    root: Link<K>,
}

/// A single position in a [`Tree`]. Each node owns its key and its children.
pub struct Node<K> {
    key: K,
    left: Link<K>,
    right: Link<K>,
}

impl<K> Node<K> {
    /// Builds a childless node around a fresh copy of `key`.
    fn new_boxed<O>(key: &K, ops: &O) -> Result<Box<Self>, Error>
    where
        O: KeyOps<K>,
    {
        let key = ops.duplicate(key).ok_or(Error::NodeAllocation)?;
        Ok(Box::new(Self {
            key,
            left: None,
            right: None,
        }))
    }

    /// The key stored in this node.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// The root of this node's left subtree.
    pub fn left(&self) -> Option<&Self> {
        self.left.as_deref()
    }

    /// The root of this node's right subtree.
    pub fn right(&self) -> Option<&Self> {
        self.right.as_deref()
    }

    /// Whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

impl<K> Default for Tree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Drop for Tree<K> {
    fn drop(&mut self) {
        release_nodes(self.root.take(), drop);
    }
}

impl<K> fmt::Debug for Tree<K>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K> Tree<K> {
    /// Generates a new, empty `Tree`.
    pub const fn new() -> Self {
        Self { root: None }
    }

    /// The root node, if the tree has one.
    pub fn root(&self) -> Option<&Node<K>> {
        self.root.as_deref()
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Finds the node holding `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use stack_bst::{IntOps, Tree};
    ///
    /// let ops = IntOps::new(0);
    /// let mut tree = Tree::new();
    /// tree.insert(&1, &ops).unwrap();
    ///
    /// assert_eq!(tree.search(&1, &ops).map(|n| *n.key()), Some(1));
    /// assert!(tree.search(&42, &ops).is_none());
    /// ```
    pub fn search<O>(&self, key: &K, ops: &O) -> Option<&Node<K>>
    where
        O: KeyOps<K>,
    {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match ops.compare(&node.key, key) {
                Ordering::Greater => node.left.as_deref(),
                Ordering::Less => node.right.as_deref(),
                Ordering::Equal => return Some(node),
            };
        }
        None
    }

    /// Adds a node holding a copy of `key`. Returns `Ok(false)` without touching the tree if the
    /// key is already present. If the copy can't be made the tree is left as it was and
    /// [`Error::NodeAllocation`] is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use stack_bst::{IntOps, Tree};
    ///
    /// let ops = IntOps::new(0);
    /// let mut tree = Tree::new();
    ///
    /// assert_eq!(tree.insert(&1, &ops), Ok(true));
    /// assert_eq!(tree.insert(&1, &ops), Ok(false));
    /// assert_eq!(tree.count_nodes(), 1);
    /// ```
    pub fn insert<O>(&mut self, key: &K, ops: &O) -> Result<bool, Error>
    where
        O: KeyOps<K>,
    {
        let mut link = &mut self.root;
        while let Some(node) = link {
            link = match ops.compare(&node.key, key) {
                Ordering::Greater => &mut node.left,
                Ordering::Less => &mut node.right,
                Ordering::Equal => {
                    trace!("key already present, insert skipped");
                    return Ok(false);
                }
            };
        }

        *link = Some(Node::new_boxed(key, ops)?);
        trace!("attached new node");
        Ok(true)
    }

    /// Builds a tree from up to `n` distinct keys drawn from [`KeyOps::generate_random`].
    /// Candidates already in the tree are discarded and don't count towards `n`. If the source
    /// runs dry first the tree holds however many keys were inserted by then.
    ///
    /// # Examples
    ///
    /// ```
    /// use stack_bst::{IntOps, Tree};
    ///
    /// let mut ops = IntOps::new(3).with_range(0..=1_000);
    /// let tree = Tree::generate_random(20, &mut ops).unwrap();
    /// assert_eq!(tree.count_nodes(), 20);
    ///
    /// // Only two keys exist, so the tree stops growing at two.
    /// let mut ops = IntOps::new(3).with_range(0..=1).with_limit(100);
    /// let tree = Tree::generate_random(20, &mut ops).unwrap();
    /// assert_eq!(tree.count_nodes(), 2);
    /// ```
    pub fn generate_random<O>(n: usize, ops: &mut O) -> Result<Self, Error>
    where
        O: KeyOps<K>,
    {
        let mut tree = Self::new();
        let mut inserted = 0;
        let mut discarded = 0usize;

        while inserted < n {
            let Some(candidate) = ops.generate_random() else {
                debug!(inserted, requested = n, "key source exhausted");
                break;
            };

            if tree.search(&candidate, &*ops).is_some() {
                discarded += 1;
                ops.destroy(candidate);
                continue;
            }

            let result = tree.insert(&candidate, &*ops);
            ops.destroy(candidate);
            if let Err(err) = result {
                tree.destroy(&*ops);
                return Err(err);
            }
            inserted += 1;
        }

        debug!(inserted, discarded, "generated random tree");
        Ok(tree)
    }

    /// Whether both trees hold equal keys in exactly the same shape. Two empty trees are equal.
    ///
    /// # Examples
    ///
    /// ```
    /// use stack_bst::{IntOps, Tree};
    ///
    /// let ops = IntOps::new(0);
    /// let mut a = Tree::new();
    /// let mut b = Tree::new();
    /// assert!(a.equal(&b, &ops));
    ///
    /// // Same keys, different shapes.
    /// a.insert(&1, &ops).unwrap();
    /// a.insert(&2, &ops).unwrap();
    /// b.insert(&2, &ops).unwrap();
    /// b.insert(&1, &ops).unwrap();
    /// assert!(!a.equal(&b, &ops));
    /// ```
    pub fn equal<O>(&self, other: &Self, ops: &O) -> bool
    where
        O: KeyOps<K>,
    {
        // Both stacks are pushed and popped in lockstep.
        let mut ours = Stack::new();
        let mut theirs = Stack::new();
        let mut a = self.root.as_deref();
        let mut b = other.root.as_deref();

        loop {
            match (a, b) {
                (Some(x), Some(y)) => {
                    if ops.compare(&x.key, &y.key) != Ordering::Equal {
                        return false;
                    }
                    ours.push(x.right.as_deref());
                    theirs.push(y.right.as_deref());
                    a = x.left.as_deref();
                    b = y.left.as_deref();
                }
                (None, None) => match (ours.pop(), theirs.pop()) {
                    (Some(x), Some(y)) => {
                        a = x;
                        b = y;
                    }
                    _ => return true,
                },
                _ => return false,
            }
        }
    }

    /// A deep copy of this tree: the same shape, with every key copied by
    /// [`KeyOps::duplicate`]. If any copy fails, the nodes built so far are released and the
    /// error is returned.
    pub fn duplicate<O>(&self, ops: &O) -> Result<Self, Error>
    where
        O: KeyOps<K>,
    {
        let mut copy = Self::new();
        match copy_nodes(self.root.as_deref(), &mut copy.root, ops) {
            Ok(copied) => {
                debug!(copied, "duplicated tree");
                Ok(copy)
            }
            Err(err) => {
                copy.destroy(ops);
                Err(err)
            }
        }
    }

    /// Removes the node holding `key` and returns whether there was one. A node with two
    /// children takes over the key of its in-order successor, and the successor's node is the
    /// one unlinked.
    ///
    /// # Examples
    ///
    /// ```
    /// use stack_bst::{IntOps, Tree};
    ///
    /// let ops = IntOps::new(0);
    /// let mut tree = Tree::new();
    /// tree.insert(&1, &ops).unwrap();
    ///
    /// assert!(tree.delete(&1, &ops));
    /// assert!(!tree.delete(&1, &ops));
    /// assert!(tree.is_empty());
    /// ```
    pub fn delete<O>(&mut self, key: &K, ops: &O) -> bool
    where
        O: KeyOps<K>,
    {
        let slot = slot_of(&mut self.root, key, ops);
        let Some(target) = slot.as_mut() else {
            return false;
        };

        if target.left.is_some() && target.right.is_some() {
            let Node {
                key: target_key,
                right,
                ..
            } = &mut **target;

            let mut link = right;
            while link.as_ref().is_some_and(|node| node.left.is_some()) {
                let Some(node) = link else {
                    break;
                };
                link = &mut node.left;
            }

            // The successor has no left child, so its right child takes its place.
            if let Some(mut successor) = link.take() {
                *link = successor.right.take();
                let old_key = std::mem::replace(target_key, successor.key);
                ops.destroy(old_key);
            }
            trace!("deleted node by promoting its successor");
        } else if let Some(mut removed) = slot.take() {
            *slot = removed.left.take().or(removed.right.take());
            ops.destroy(removed.key);
            trace!("deleted node with at most one child");
        }

        true
    }

    /// Deletes every node whose key lies in `low..=high` and matches `parity`, returning how many
    /// were removed.
    ///
    /// The matching keys are found first by an in-order walk that skips subtrees lying wholly
    /// outside the bounds, and copies of them are staged on a stack. Only then is each staged key
    /// deleted, lowest first, by a fresh descent from the root. Staging is the only step that can
    /// fail; if it does the tree is untouched.
    pub fn delete_range<O>(
        &mut self,
        low: &K,
        high: &K,
        parity: Parity,
        ops: &O,
    ) -> Result<usize, Error>
    where
        O: KeyOps<K>,
    {
        let mut staged = self.stage_range(low, high, parity, ops)?;
        let staged_count = staged.iter().count();
        staged.reverse();

        let mut removed = 0;
        while let Some(key) = staged.pop() {
            if self.delete(&key, ops) {
                removed += 1;
            }
            ops.destroy(key);
        }

        debug!(staged = staged_count, removed, ?parity, "range deletion finished");
        Ok(removed)
    }

    /// Copies the keys [`Tree::delete_range`] will remove onto a stack, highest on top.
    fn stage_range<O>(&self, low: &K, high: &K, parity: Parity, ops: &O) -> Result<Stack<K>, Error>
    where
        O: KeyOps<K>,
    {
        let mut staged = Stack::new();
        let mut pending = Stack::new();
        let mut current = self.root.as_deref();

        while current.is_some() || !pending.is_empty() {
            if let Some(node) = current {
                current = if ops.compare(&node.key, high) == Ordering::Greater {
                    node.left.as_deref()
                } else if ops.compare(&node.key, low) == Ordering::Less {
                    node.right.as_deref()
                } else {
                    pending.push(node);
                    node.left.as_deref()
                };
            } else if let Some(node) = pending.pop() {
                if parity.accepts(ops.is_even(&node.key)) {
                    if let Err(err) = staged.push_dup(&node.key, |key| ops.duplicate(key)) {
                        staged.clear_with(|key| ops.destroy(key));
                        return Err(err);
                    }
                }
                current = node.right.as_deref();
            }
        }

        Ok(staged)
    }

    /// Builds a tree of minimal height from `values`, which must be sorted in strictly ascending
    /// order. The middle element of each range becomes the root of that range's subtree (the
    /// lower middle for even lengths). `values` is only read; every key is copied.
    ///
    /// # Examples
    ///
    /// ```
    /// use stack_bst::{IntOps, Tree};
    ///
    /// let ops = IntOps::new(0);
    /// let tree = Tree::build_balanced(&[1, 2, 3, 4, 5, 6, 7], &ops).unwrap();
    ///
    /// assert_eq!(tree.root().map(|n| *n.key()), Some(4));
    /// assert_eq!(tree.height(), 3);
    /// ```
    pub fn build_balanced<O>(values: &[K], ops: &O) -> Result<Self, Error>
    where
        O: KeyOps<K>,
    {
        debug_assert!(
            values
                .windows(2)
                .all(|pair| ops.compare(&pair[0], &pair[1]) == Ordering::Less),
            "`Tree::build_balanced` needs strictly ascending values"
        );

        let mut tree = Self::new();
        if let Err(err) = build_nodes(values, &mut tree.root, ops) {
            tree.destroy(ops);
            return Err(err);
        }

        debug!(len = values.len(), "built balanced tree");
        Ok(tree)
    }

    /// Visits every key root first, then the left subtree, then the right subtree, passing each
    /// to [`KeyOps::print`].
    pub fn preorder<O>(&self, ops: &O)
    where
        O: KeyOps<K>,
    {
        self.walk_preorder(|key| ops.print(key));
    }

    /// Visits every key in ascending order, passing each to [`KeyOps::print`].
    pub fn inorder<O>(&self, ops: &O)
    where
        O: KeyOps<K>,
    {
        self.iter().for_each(|key| ops.print(key));
    }

    /// Visits every key after both of its subtrees, passing each to [`KeyOps::print`].
    pub fn postorder<O>(&self, ops: &O)
    where
        O: KeyOps<K>,
    {
        self.walk_postorder(|key| ops.print(key));
    }

    fn walk_preorder<'a, F>(&'a self, mut visit: F)
    where
        F: FnMut(&'a K),
    {
        let mut pending = Stack::new();
        let mut current = self.root.as_deref();

        while let Some(node) = current.or_else(|| pending.pop()) {
            visit(&node.key);
            if let Some(right) = node.right.as_deref() {
                pending.push(right);
            }
            current = node.left.as_deref();
        }
    }

    fn walk_postorder<'a, F>(&'a self, mut visit: F)
    where
        F: FnMut(&'a K),
    {
        let mut pending: Stack<&Node<K>> = Stack::new();
        let mut current = self.root.as_deref();
        // The node visited most recently tells us whether we are coming back up from the right.
        let mut last: Option<&Node<K>> = None;

        loop {
            if let Some(node) = current {
                pending.push(node);
                current = node.left.as_deref();
                continue;
            }

            let Some(&node) = pending.peek() else {
                break;
            };
            match node.right.as_deref() {
                Some(right) if !last.is_some_and(|last| ptr::eq(last, right)) => {
                    current = Some(right);
                }
                _ => {
                    visit(&node.key);
                    last = Some(node);
                    pending.pop();
                }
            }
        }
    }

    /// Iterates over the keys in ascending order.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            pending: Stack::new(),
            current: self.root.as_deref(),
        }
    }

    /// Writes every key into `out` in ascending order through [`KeyOps::store_at`], starting at
    /// index `0`, and returns how many were written. If a write fails, `out` keeps the keys
    /// written before it.
    pub fn flatten_inorder<O>(&self, ops: &O, out: &mut Vec<K>) -> Result<usize, Error>
    where
        O: KeyOps<K>,
    {
        let mut written = 0;
        for (index, key) in self.iter().enumerate() {
            ops.store_at(out, key, index)?;
            written += 1;
        }
        Ok(written)
    }

    /// The number of nodes, counted by an in-order walk.
    pub fn count_nodes(&self) -> usize {
        self.iter().count()
    }

    /// The number of nodes on the longest path from the root to a leaf. An empty tree has a
    /// height of 0.
    pub fn height(&self) -> usize {
        let mut pending = Stack::new();
        let mut height = 0;
        if let Some(root) = self.root.as_deref() {
            pending.push((root, 1));
        }

        while let Some((node, depth)) = pending.pop() {
            height = height.max(depth);
            for child in [node.left.as_deref(), node.right.as_deref()].into_iter().flatten() {
                pending.push((child, depth + 1));
            }
        }
        height
    }

    /// Releases every node, children before parents, passing each key to [`KeyOps::destroy`].
    /// The tree is empty afterwards.
    pub fn destroy<O>(&mut self, ops: &O)
    where
        O: KeyOps<K>,
    {
        let released = release_nodes(self.root.take(), |key| ops.destroy(key));
        trace!(released, "destroyed tree");
    }
}

/// In-order iterator over the keys of a [`Tree`]. Created by [`Tree::iter`].
pub struct Iter<'a, K> {
    pending: Stack<&'a Node<K>>,
    current: Option<&'a Node<K>>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.current {
            self.pending.push(node);
            self.current = node.left.as_deref();
        }

        let node = self.pending.pop()?;
        self.current = node.right.as_deref();
        Some(&node.key)
    }
}

impl<'a, K> IntoIterator for &'a Tree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Walks down from `link` to the link holding `key`, or to the empty link where `key` would be
/// attached.
fn slot_of<'a, K, O>(mut link: &'a mut Link<K>, key: &K, ops: &O) -> &'a mut Link<K>
where
    O: KeyOps<K>,
{
    while link
        .as_deref()
        .is_some_and(|node| ops.compare(&node.key, key) != Ordering::Equal)
    {
        let Some(node) = link else {
            break;
        };
        link = if ops.compare(&node.key, key) == Ordering::Greater {
            &mut node.left
        } else {
            &mut node.right
        };
    }
    link
}

/// Fills `target` with a copy of the subtree rooted at `source`. One stack holds the source nodes
/// still to copy and a second holds the empty links their copies go into; the two are always
/// pushed and popped together.
fn copy_nodes<K, O>(source: Option<&Node<K>>, target: &mut Link<K>, ops: &O) -> Result<usize, Error>
where
    O: KeyOps<K>,
{
    let mut sources = Stack::new();
    let mut slots = Stack::new();
    if let Some(root) = source {
        sources.push(root);
        slots.push(target);
    }

    let mut copied = 0;
    while let (Some(node), Some(slot)) = (sources.pop(), slots.pop()) {
        let copy = slot.insert(Node::new_boxed(&node.key, ops)?);
        copied += 1;

        let Node { left, right, .. } = &mut **copy;
        if let Some(source_right) = node.right.as_deref() {
            sources.push(source_right);
            slots.push(right);
        }
        if let Some(source_left) = node.left.as_deref() {
            sources.push(source_left);
            slots.push(left);
        }
    }
    Ok(copied)
}

/// Fills `root` with a balanced tree over `values`. The left spine of each subtree is built
/// straight away while its right link and the index range that belongs there are deferred on two
/// stacks.
fn build_nodes<K, O>(values: &[K], root: &mut Link<K>, ops: &O) -> Result<(), Error>
where
    O: KeyOps<K>,
{
    let mut slots = Stack::new();
    let mut ranges = Stack::new();
    let mut slot = root;
    let mut range = 0..values.len();

    loop {
        if range.is_empty() {
            match (slots.pop(), ranges.pop()) {
                (Some(next_slot), Some(next_range)) => {
                    slot = next_slot;
                    range = next_range;
                }
                _ => return Ok(()),
            }
        } else {
            let mid = range.start + (range.len() - 1) / 2;
            let node = slot.insert(Node::new_boxed(&values[mid], ops)?);
            let Node { left, right, .. } = &mut **node;

            slots.push(right);
            ranges.push(mid + 1..range.end);
            slot = left;
            range = range.start..mid;
        }
    }
}

/// Frees every node under `root`, children before parents, handing each key to `release`.
/// Returns how many nodes were freed.
fn release_nodes<K, F>(root: Link<K>, mut release: F) -> usize
where
    F: FnMut(K),
{
    let mut pending = Stack::new();
    let mut released = 0;
    if let Some(root) = root {
        pending.push(root);
    }

    while let Some(mut node) = pending.pop() {
        let child = match node.left.take() {
            Some(left) => Some(left),
            None => node.right.take(),
        };
        match child {
            Some(child) => {
                pending.push(node);
                pending.push(child);
            }
            None => {
                release(node.key);
                released += 1;
            }
        }
    }
    released
}
