//! Infrastructure layer: reading and writing tree files
//!
//! This layer implements the I/O boundary traits.

pub mod error;
pub mod loader;
pub mod traits;

pub use error::{InfraError, InfraResult};
pub use loader::{DescriptorFormat, TreeLoader};
pub use traits::{FileSystem, RealFileSystem};
