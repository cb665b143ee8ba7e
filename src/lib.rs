//! This crate is a Binary Search Tree (BST) engine that never recurses. Every algorithm
//! that is naturally written recursively walks the tree with an explicit [`Stack`] instead.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored records. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` will typically store
//! some sort of key and will sometimes have child `Node`s. The most important
//! invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    key less than its own key.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    key greater than its own key.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! The benefits of these invariants are many. For instance, searching for
//! keys in the tree takes `O(height)` (where `height` is defined as the longest
//! path from the root `Node` to a leaf `Node`). This tree does not rebalance itself,
//! so its height depends on insertion order, but [`Tree::build_balanced`] builds a tree
//! of minimal height from sorted keys. BSTs also naturally support sorted iteration by
//! visiting the left subtree, then the subtree root, then the right subtree.
//!
//! ## Keys
//!
//! The tree is generic over its key type and learns everything it needs to know about keys
//! from a [`KeyOps`] bundle passed to each call: how they compare, how to copy and release
//! them, how to print them, which of them count as even, where random ones come from and how
//! to write them into an output sequence.
//!
//! ```
//! use stack_bst::{IntOps, Tree};
//!
//! let ops = IntOps::new(0);
//! let tree = Tree::build_balanced(&[1, 2, 3, 4, 5, 6, 7], &ops).unwrap();
//! let copy = tree.duplicate(&ops).unwrap();
//!
//! assert!(tree.equal(&copy, &ops));
//! assert_eq!(copy.count_nodes(), 7);
//! ```

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod error;
pub mod ops;
pub mod stack;
pub mod tree;

#[cfg(test)]
mod test;

pub use error::Error;
pub use ops::{IntOps, KeyOps, Parity, StrOps};
pub use stack::Stack;
pub use tree::{Iter, Node, Tree};
