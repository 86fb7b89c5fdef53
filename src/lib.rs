//! christree: a layered, cross-linked byte trie
//!
//! Keys are fixed-length byte strings. Every key byte selects one child per
//! level, and every node is additionally threaded into a sorted sibling chain
//! for its depth (a *layer*). Layers make masked lookups cheap: the first mask
//! byte is found by scanning one layer instead of walking the whole tree.
//!
//! ```
//! use christree::{ChrisTree, Mask};
//!
//! let mut tree = ChrisTree::init(3).unwrap();
//! tree.add(&[1, 2, 3], "a").unwrap();
//! tree.add(&[9, 2, 3], "b").unwrap();
//!
//! let hits = tree.select(&Mask::new(1, vec![2, 3]), 10).unwrap();
//! assert_eq!(hits, vec![&"a", &"b"]);
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;

pub use domain::{ChrisTree, Mask, MismatchPolicy, SelectOptions, TreeDump, TreeError, TreeResult};
