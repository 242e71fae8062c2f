//! Patch compiler for object edits.
//!
//! Turns a diff tree into the edit operation an object store consumes:
//! a flat map from path strings to directives (`set`, `delete`,
//! `increment`) plus the prior values the store checks before applying.
//!
//! # Key Types
//!
//! - [`FieldPath`] / [`Segment`] -- Path grammar: `key`, `key.nested`, `key[3]`
//! - [`Directive`] / [`ChangeSet`] / [`PriorValues`] -- Per-path instructions
//! - [`flatten`] / [`Patch`] -- Diff tree to change set
//! - [`EditOperation`] / [`EditEntry`] -- The record handed to the submitter
//! - [`EditSession`] -- Original object plus its edited copy
//! - [`apply_edit`] / [`revert_edit`] -- Store-side application and reversal of an edit entry
//! - [`PatchConfig`] -- Fields that always increment

pub mod apply;
pub mod config;
pub mod directive;
pub mod error;
pub mod flatten;
pub mod operation;
pub mod path;
pub mod session;

pub use apply::{apply_edit, revert_edit};
pub use config::PatchConfig;
pub use directive::{ChangeSet, Directive, Patch, PriorValues};
pub use error::{ApplyError, ApplyResult, PatchError, PatchResult, PathError};
pub use flatten::{flatten, flatten_with};
pub use operation::{build_edit_operation, EditEntry, EditOperation};
pub use path::{FieldPath, Segment};
pub use session::EditSession;
