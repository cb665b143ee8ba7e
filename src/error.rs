//! Errors reported by the tree engine and its stack.
//!
//! Only allocation failures are errors. Looking up or deleting a missing key and inserting a key
//! that is already present are ordinary outcomes and are reported through `bool`/`Option` return
//! values instead.

/// Something the engine needed could not be built. Whenever one of these is returned the tree
/// that was being worked on is left exactly as it was before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A node could not be created because its key could not be duplicated.
    #[error("failed to allocate a tree node")]
    NodeAllocation,
    /// A duplicating push could not copy its key onto the stack.
    #[error("failed to allocate a stack cell")]
    StackAllocation,
    /// A key could not be copied into an output sequence.
    #[error("failed to copy a key into the output sequence")]
    OutputAllocation,
}
