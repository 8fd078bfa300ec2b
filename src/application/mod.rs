//! Application layer: the tree manager
//!
//! Wraps the domain tree with versioning and change notification for observers.

pub mod error;
pub mod error_ext;
pub mod manager;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use manager::{TreeManager, TreeSnapshot};
