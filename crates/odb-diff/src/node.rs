//! Diff tree types.

use std::collections::BTreeMap;
use std::fmt;

use odb_types::Value;
use serde::Serialize;

/// How a single leaf position changed between the two compared values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Unchanged,
    Created,
    Updated,
    Deleted,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Unchanged => "unchanged",
            ChangeKind::Created => "created",
            ChangeKind::Updated => "updated",
            ChangeKind::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified leaf of the diff tree.
///
/// `old` is present unless the leaf was created, `new` is present unless it
/// was deleted. An unchanged leaf carries the shared value on both sides.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiffLeaf {
    kind: ChangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    old: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    new: Option<Value>,
}

impl DiffLeaf {
    /// Both sides hold the same value (or are both absent).
    pub fn unchanged(value: Option<Value>) -> Self {
        Self {
            kind: ChangeKind::Unchanged,
            new: value.clone(),
            old: value,
        }
    }

    pub fn created(new: Value) -> Self {
        Self {
            kind: ChangeKind::Created,
            old: None,
            new: Some(new),
        }
    }

    pub fn deleted(old: Value) -> Self {
        Self {
            kind: ChangeKind::Deleted,
            old: Some(old),
            new: None,
        }
    }

    pub fn updated(old: Value, new: Value) -> Self {
        Self {
            kind: ChangeKind::Updated,
            old: Some(old),
            new: Some(new),
        }
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    pub fn old(&self) -> Option<&Value> {
        self.old.as_ref()
    }

    pub fn new_value(&self) -> Option<&Value> {
        self.new.as_ref()
    }
}

/// A node of the diff tree.
///
/// Interior nodes mirror the compared containers: object keys verbatim, array
/// positions as decimal strings. Children are kept in key order so the same
/// inputs always produce the same tree.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DiffNode {
    Leaf(DiffLeaf),
    Interior(BTreeMap<String, DiffNode>),
}

impl DiffNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self, DiffNode::Leaf(_))
    }

    pub fn as_leaf(&self) -> Option<&DiffLeaf> {
        match self {
            DiffNode::Leaf(leaf) => Some(leaf),
            DiffNode::Interior(_) => None,
        }
    }

    pub fn children(&self) -> Option<&BTreeMap<String, DiffNode>> {
        match self {
            DiffNode::Leaf(_) => None,
            DiffNode::Interior(children) => Some(children),
        }
    }

    /// The child under `key`, if this is an interior node that has one.
    pub fn get(&self, key: &str) -> Option<&DiffNode> {
        self.children().and_then(|c| c.get(key))
    }

    /// Classification of this node if it is a leaf.
    pub fn kind(&self) -> Option<ChangeKind> {
        self.as_leaf().map(DiffLeaf::kind)
    }

    /// Count leaves per classification across the whole subtree.
    pub fn summary(&self) -> DiffSummary {
        let mut summary = DiffSummary::default();
        self.accumulate(&mut summary);
        summary
    }

    fn accumulate(&self, summary: &mut DiffSummary) {
        match self {
            DiffNode::Leaf(leaf) => match leaf.kind {
                ChangeKind::Unchanged => summary.unchanged += 1,
                ChangeKind::Created => summary.created += 1,
                ChangeKind::Updated => summary.updated += 1,
                ChangeKind::Deleted => summary.deleted += 1,
            },
            DiffNode::Interior(children) => {
                for child in children.values() {
                    child.accumulate(summary);
                }
            }
        }
    }

    /// Returns `true` if no leaf in the subtree changed.
    pub fn is_unchanged(&self) -> bool {
        self.summary().changes() == 0
    }
}

/// Per-classification leaf counts of a diff tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub unchanged: usize,
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl DiffSummary {
    /// Number of leaves that changed in any way.
    pub fn changes(&self) -> usize {
        self.created + self.updated + self.deleted
    }
}
