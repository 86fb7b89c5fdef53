//! Application layer: operation scripts driving a tree
//!
//! This layer orchestrates domain logic and owns the file I/O the domain avoids.

pub mod error;
pub mod error_ext;
pub mod runner;
pub mod script;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use runner::{Outcome, ScriptRunner};
pub use script::{Command, Script};
