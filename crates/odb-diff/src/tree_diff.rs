//! Recursive structural diff over dynamic values.
//!
//! When either side is a scalar (or absent) the position becomes a leaf
//! classified by value comparison. When both sides are containers the diff
//! recurses over the union of their keys, array keys being decimal indices, so
//! an array and an object holding the same entries compare equal. Arrays are
//! compared by position only; an insertion at the front reports every later
//! element as updated.

use std::collections::BTreeMap;

use odb_types::Value;
use tracing::debug;

use crate::error::{DiffError, DiffResult};
use crate::node::{ChangeKind, DiffLeaf, DiffNode};

/// Compare `old` with `new`, where `None` stands for an absent value.
///
/// Fails if either side is a function. Function-valued entries inside
/// containers are treated as absent and never appear in the result.
pub fn diff(old: Option<&Value>, new: Option<&Value>) -> DiffResult<DiffNode> {
    let node = diff_node(old, new)?;
    let summary = node.summary();
    debug!(
        created = summary.created,
        updated = summary.updated,
        deleted = summary.deleted,
        unchanged = summary.unchanged,
        "diff computed"
    );
    Ok(node)
}

/// Compare two present values.
pub fn diff_values(old: &Value, new: &Value) -> DiffResult<DiffNode> {
    diff(Some(old), Some(new))
}

/// Classify a pair of values the way leaves are classified.
pub fn classify(old: Option<&Value>, new: Option<&Value>) -> ChangeKind {
    match (old, new) {
        (None, None) => ChangeKind::Unchanged,
        (None, Some(_)) => ChangeKind::Created,
        (Some(_), None) => ChangeKind::Deleted,
        (Some(a), Some(b)) if a == b => ChangeKind::Unchanged,
        (Some(_), Some(_)) => ChangeKind::Updated,
    }
}

fn diff_node(old: Option<&Value>, new: Option<&Value>) -> DiffResult<DiffNode> {
    for side in [old, new].into_iter().flatten() {
        if let Value::Function(f) = side {
            return Err(DiffError::InvalidInput(f.name().to_string()));
        }
    }

    match (old, new) {
        (Some(a), Some(b)) if a.is_container() && b.is_container() => diff_children(a, b),
        _ => Ok(DiffNode::Leaf(leaf(old, new))),
    }
}

fn leaf(old: Option<&Value>, new: Option<&Value>) -> DiffLeaf {
    match (old, new) {
        (None, None) => DiffLeaf::unchanged(None),
        (None, Some(b)) => DiffLeaf::created(b.clone()),
        (Some(a), None) => DiffLeaf::deleted(a.clone()),
        (Some(a), Some(b)) if a == b => DiffLeaf::unchanged(Some(a.clone())),
        (Some(a), Some(b)) => DiffLeaf::updated(a.clone(), b.clone()),
    }
}

fn diff_children(old: &Value, new: &Value) -> DiffResult<DiffNode> {
    let mut children = BTreeMap::new();

    // Keys of the old side, paired with whatever the new side holds.
    for (key, child) in old.entries() {
        if child.is_function() {
            continue;
        }
        let other = new.get(&key).filter(|v| !v.is_function());
        let node = diff_node(Some(child), other)?;
        children.insert(key, node);
    }

    // Keys only the new side has.
    for (key, child) in new.entries() {
        if child.is_function() || children.contains_key(&key) {
            continue;
        }
        let node = diff_node(None, Some(child))?;
        children.insert(key, node);
    }

    Ok(DiffNode::Interior(children))
}
