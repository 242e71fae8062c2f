//! Flatten a diff tree into a change set and prior values.

use odb_diff::{ChangeKind, DiffLeaf, DiffNode};
use odb_types::Value;
use tracing::{debug, warn};

use crate::config::PatchConfig;
use crate::directive::{Directive, Patch};
use crate::path::{is_ambiguous_key, FieldPath};

/// Flatten `root` with the default configuration (`version` increments).
pub fn flatten(root: &DiffNode) -> Patch {
    flatten_with(root, &PatchConfig::default())
}

/// Flatten `root`, forcing `increment` for the configured keys.
///
/// Created and updated leaves become `set`, deleted leaves `delete`; updated
/// and deleted leaves also record their old value. Unchanged leaves emit
/// nothing. A child whose key is an increment field always emits
/// `increment`, even when unchanged, and its subtree is not walked.
pub fn flatten_with(root: &DiffNode, config: &PatchConfig) -> Patch {
    let mut patch = Patch::default();
    walk(root, &FieldPath::root(), config, &mut patch);
    debug!(
        changes = patch.change.len(),
        prior = patch.current.len(),
        "patch flattened"
    );
    patch
}

fn walk(node: &DiffNode, path: &FieldPath, config: &PatchConfig, patch: &mut Patch) {
    match node {
        DiffNode::Leaf(leaf) => record_leaf(leaf, path, patch),
        DiffNode::Interior(children) => {
            for (key, child) in children {
                if is_ambiguous_key(key) {
                    warn!(parent = %path, key = %key, "key cannot be addressed unambiguously");
                }
                let child_path = path.child(key);
                if config.is_increment_field(key) {
                    if let Some(old) = child.as_leaf().and_then(prior_value) {
                        patch.current.insert(child_path.to_string(), old.clone());
                    }
                    patch
                        .change
                        .insert(child_path.to_string(), Directive::Increment);
                    continue;
                }
                walk(child, &child_path, config, patch);
            }
        }
    }
}

fn record_leaf(leaf: &DiffLeaf, path: &FieldPath, patch: &mut Patch) {
    let key = path.to_string();
    match (leaf.kind(), leaf.old(), leaf.new_value()) {
        (ChangeKind::Created, _, Some(new)) => {
            patch.change.insert(key, Directive::Set(new.clone()));
        }
        (ChangeKind::Deleted, Some(old), _) => {
            patch.change.insert(key.clone(), Directive::Delete);
            patch.current.insert(key, old.clone());
        }
        (ChangeKind::Updated, Some(old), Some(new)) => {
            patch.change.insert(key.clone(), Directive::Set(new.clone()));
            patch.current.insert(key, old.clone());
        }
        _ => {}
    }
}

fn prior_value(leaf: &DiffLeaf) -> Option<&Value> {
    match leaf.kind() {
        ChangeKind::Updated | ChangeKind::Deleted => leaf.old(),
        ChangeKind::Created | ChangeKind::Unchanged => None,
    }
}
