//! Domain layer: the christree and its operations
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod dump;
pub mod error;
mod insert;
pub mod layer;
pub mod node;
mod remove;
pub mod select;
pub mod traverse;
pub mod tree;
mod verify;

pub use dump::TreeDump;
pub use error::{TreeError, TreeResult};
pub use layer::Layer;
pub use node::{Node, CHILDREN_MIN, ROOT_DEPTH};
pub use select::{Mask, MismatchPolicy, SelectOptions, CANDIDATE_CAP};
pub use tree::{ChrisTree, LayerIter};
