//! Domain-level errors (no external dependencies)

use generational_arena::Index;
use thiserror::Error;

/// Caller errors rejected before the tree is touched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("node not found: {0:?}")]
    NodeNotFound(Index),

    #[error("no node with id {0}")]
    UnknownId(i64),

    #[error("insert position {index} out of range for {len} children")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("cycle detected: node {child} is {parent} or one of its ancestors")]
    CycleDetected { parent: i64, child: i64 },

    #[error("node {0} already has a parent; remove it first")]
    AlreadyAttached(i64),

    #[error("node {0} is the tree root and cannot be moved")]
    RootNotAllowed(i64),

    #[error("duplicate node id: {0}")]
    DuplicateId(i64),
}

pub type TreeResult<T> = Result<T, DomainError>;
