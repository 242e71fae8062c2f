//! Patch directives and the flat maps that carry them.

use std::collections::BTreeMap;

use odb_types::Value;
use serde::{Deserialize, Serialize};

/// Instruction for a single path.
///
/// On the wire `Set` and `Append` are single-key objects (`{"set": v}`),
/// `Delete` and `Increment` are bare strings (`"delete"`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Directive {
    /// Replace (or create) the value at the path.
    Set(Value),
    /// Push onto an array, or merge into an object.
    Append(Value),
    /// Remove the value at the path.
    Delete,
    /// Add one to a numeric counter.
    Increment,
}

impl Directive {
    pub fn name(&self) -> &'static str {
        match self {
            Directive::Set(_) => "set",
            Directive::Append(_) => "append",
            Directive::Delete => "delete",
            Directive::Increment => "increment",
        }
    }
}

/// Path string to directive.
pub type ChangeSet = BTreeMap<String, Directive>;

/// Path string to the value held there before the edit.
pub type PriorValues = BTreeMap<String, Value>;

/// A flattened diff: what to change, and what was there before.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Patch {
    pub change: ChangeSet,
    pub current: PriorValues,
}

impl Patch {
    /// Returns `true` if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.change.is_empty()
    }
}
