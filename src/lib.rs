//! Trees of fractional values where every parent is recomputed from its
//! children whenever a value or the structure below it changes.
//!
//! - [`domain`]: values, value stores, the arena tree and its recalculation
//! - [`application`]: [`TreeManager`](application::TreeManager), versioning and observers
//! - [`infrastructure`]: loading and saving tree descriptors
//! - [`cli`]: the `fractree` command line

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;

pub use application::{TreeManager, TreeSnapshot};
pub use domain::{DisplayType, NodeInput, NodeValue, TreeArena};
