//! Domain layer: values, stores and the recalculating tree
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod aggregate;
pub mod arena;
pub mod error;
pub mod input;
pub mod observer;
pub mod serialize;
pub mod store;
pub mod value;

pub use aggregate::aggregate;
pub use arena::{TreeArena, TreeNode};
pub use error::{DomainError, TreeResult};
pub use generational_arena::Index;
pub use input::{fixture, NodeInput, NodeSource};
pub use observer::{Listeners, SubscriptionId};
pub use serialize::NodeView;
pub use store::ValueStore;
pub use value::{DisplayType, NodeValue, Unit, Units};
