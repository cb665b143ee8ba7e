//! A singly linked LIFO used as scratch memory by the tree algorithms. Every walk that would
//! naturally recurse keeps its pending work on one of these instead of on the call stack, so the
//! depth of a tree never limits what the engine can do with it.
//!
//! A `Stack` stores whatever it is given. Traversals push borrowed `&Node`s and never own the keys
//! behind them; [`Stack::push_dup`] stores an owned copy instead, which is how staged keys outlive
//! the nodes they were read from.
//!
//! # Examples
//!
//! ```
//! use stack_bst::Stack;
//!
//! let mut stack = Stack::new();
//! stack.push(1);
//! stack.push(2);
//!
//! assert_eq!(stack.peek(), Some(&2));
//! assert_eq!(stack.pop(), Some(2));
//! assert_eq!(stack.pop(), Some(1));
//! assert!(stack.is_empty());
//! ```

use std::fmt;

use crate::Error;

type Link<T> = Option<Box<Frame<T>>>;

struct Frame<T> {
    item: T,
    next: Link<T>,
}

/// A last-in, first-out sequence with no length bound.
pub struct Stack<T> {
    head: Link<T>,
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Stack<T> {
    // Unlinks one frame at a time. Letting `Box` drop the chain would recurse once per frame.
    fn drop(&mut self) {
        let mut link = self.head.take();
        while let Some(mut frame) = link {
            link = frame.next.take();
        }
    }
}

impl<T> fmt::Debug for Stack<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Stack<T> {
    /// Generates a new, empty `Stack`.
    pub const fn new() -> Self {
        Self { head: None }
    }

    /// Puts `item` on top of the stack.
    pub fn push(&mut self, item: T) {
        let next = self.head.take();
        self.head = Some(Box::new(Frame { item, next }));
    }

    /// Puts a copy of `item` on top of the stack, made with `duplicate`. If no copy can be made
    /// the stack is left untouched and [`Error::StackAllocation`] is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use stack_bst::{Error, Stack};
    ///
    /// let mut stack = Stack::new();
    /// let key = String::from("kept");
    ///
    /// stack.push_dup(&key, |k| Some(k.clone())).unwrap();
    /// assert_eq!(stack.push_dup(&key, |_| None), Err(Error::StackAllocation));
    ///
    /// drop(key);
    /// assert_eq!(stack.pop().as_deref(), Some("kept"));
    /// assert!(stack.is_empty());
    /// ```
    pub fn push_dup<F>(&mut self, item: &T, duplicate: F) -> Result<(), Error>
    where
        F: FnOnce(&T) -> Option<T>,
    {
        let item = duplicate(item).ok_or(Error::StackAllocation)?;
        self.push(item);
        Ok(())
    }

    /// Removes the top of the stack and hands it back. Popping an empty stack does nothing.
    pub fn pop(&mut self) -> Option<T> {
        self.head.take().map(|frame| {
            let Frame { item, next } = *frame;
            self.head = next;
            item
        })
    }

    /// Removes the top of the stack and passes it to `destroy`. Returns whether anything was
    /// removed.
    pub fn pop_with<F>(&mut self, destroy: F) -> bool
    where
        F: FnOnce(T),
    {
        match self.pop() {
            Some(item) => {
                destroy(item);
                true
            }
            None => false,
        }
    }

    /// The item on top of the stack, if there is one.
    pub fn peek(&self) -> Option<&T> {
        self.head.as_ref().map(|frame| &frame.item)
    }

    /// Whether the stack holds nothing.
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Pops until the stack is empty, passing every item to `destroy` from the top down.
    pub fn clear_with<F>(&mut self, mut destroy: F)
    where
        F: FnMut(T),
    {
        while let Some(item) = self.pop() {
            destroy(item);
        }
    }

    /// Reverses the order of the stack in place by relinking its frames. Whatever was at the
    /// bottom ends up on top.
    pub fn reverse(&mut self) {
        let mut reversed = None;
        let mut current = self.head.take();
        while let Some(mut frame) = current {
            current = frame.next.take();
            frame.next = reversed;
            reversed = Some(frame);
        }
        self.head = reversed;
    }

    /// Iterates over the stack from the top down without removing anything.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head.as_deref(),
        }
    }
}

/// Borrowing iterator over a [`Stack`], top first. Created by [`Stack::iter`].
pub struct Iter<'a, T> {
    next: Option<&'a Frame<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|frame| {
            self.next = frame.next.as_deref();
            &frame.item
        })
    }
}
