//! Diff engine for object edits.
//!
//! Compares an original object with an edited copy and produces a diff tree
//! mirroring both inputs, where every leaf records how that position changed.
//! Arrays are compared position by position.
//!
//! # Key Types
//!
//! - [`diff`] / [`diff_values`] -- Recursive structural comparison
//! - [`DiffNode`] / [`DiffLeaf`] -- Diff tree (interior maps, classified leaves)
//! - [`ChangeKind`] -- Leaf classification
//! - [`DiffSummary`] -- Leaf counts per classification

pub mod error;
pub mod node;
pub mod tree_diff;

pub use error::{DiffError, DiffResult};
pub use node::{ChangeKind, DiffLeaf, DiffNode, DiffSummary};
pub use tree_diff::{classify, diff, diff_values};
