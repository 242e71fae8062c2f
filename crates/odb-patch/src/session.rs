use odb_diff::{diff_values, DiffNode};
use odb_types::{ObjectId, Value};
use tracing::debug;

use crate::config::PatchConfig;
use crate::error::{PatchError, PatchResult};
use crate::flatten::flatten_with;
use crate::operation::EditOperation;

/// An object being edited: the last-known original and the working copy.
///
/// The session is owned by whoever drives the edit; compiling it does not
/// modify it.
#[derive(Clone, Debug, PartialEq)]
pub struct EditSession {
    original: Value,
    edited: Value,
}

impl EditSession {
    /// Start editing `original`; the working copy begins identical to it.
    pub fn begin(original: Value) -> Self {
        Self {
            edited: original.clone(),
            original,
        }
    }

    pub fn new(original: Value, edited: Value) -> Self {
        Self { original, edited }
    }

    pub fn original(&self) -> &Value {
        &self.original
    }

    pub fn edited(&self) -> &Value {
        &self.edited
    }

    pub fn edited_mut(&mut self) -> &mut Value {
        &mut self.edited
    }

    /// Replace the working copy.
    pub fn set_edited(&mut self, edited: Value) {
        self.edited = edited;
    }

    /// The `id` of the original object.
    pub fn object_id(&self) -> PatchResult<ObjectId> {
        ObjectId::of(&self.original).ok_or(PatchError::MissingObjectId)
    }

    pub fn diff(&self) -> PatchResult<DiffNode> {
        Ok(diff_values(&self.original, &self.edited)?)
    }

    /// Diff, flatten and package the session as an edit operation.
    pub fn compile(&self, op_type: &str, config: &PatchConfig) -> PatchResult<EditOperation> {
        let node = self.diff()?;
        let id = self.object_id()?;
        let patch = flatten_with(&node, config);
        debug!(id = %id, op_type, changes = patch.change.len(), "edit compiled");
        Ok(EditOperation::from_patch(id, op_type, patch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::Directive;
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn end_to_end_user_edit() {
        let session = EditSession::new(
            v(json!({"id": 7, "version": 1, "name": "Alice", "tags": ["x"]})),
            v(json!({"id": 7, "version": 1, "name": "Alicia", "tags": ["x", "y"]})),
        );
        let op = session.compile("user", &PatchConfig::default()).unwrap();
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({
                "type": "user",
                "edit": [{
                    "id": 7,
                    "change": {
                        "name": {"set": "Alicia"},
                        "tags[1]": {"set": "y"},
                        "version": "increment"
                    },
                    "current": {"name": "Alice"}
                }]
            })
        );
    }

    #[test]
    fn untouched_session_only_increments_version() {
        let session = EditSession::begin(v(json!({"id": "a", "version": 2, "x": 1})));
        let op = session.compile("thing", &PatchConfig::default()).unwrap();
        let change = &op.edit[0].change;
        assert_eq!(change.len(), 1);
        assert_eq!(change.get("version"), Some(&Directive::Increment));
    }

    #[test]
    fn untouched_session_without_version_is_noop() {
        let session = EditSession::begin(v(json!({"id": "a", "x": 1})));
        let op = session.compile("thing", &PatchConfig::default()).unwrap();
        assert!(op.is_noop());
    }

    #[test]
    fn edits_through_working_copy() {
        let mut session = EditSession::begin(v(json!({"id": 1, "name": "a"})));
        if let Value::Object(map) = session.edited_mut() {
            map.insert("name".into(), Value::from("b"));
        }
        let op = session.compile("user", &PatchConfig::plain()).unwrap();
        assert_eq!(
            op.edit[0].change.get("name"),
            Some(&Directive::Set(Value::from("b")))
        );
        assert_eq!(session.original(), &v(json!({"id": 1, "name": "a"})));
    }

    #[test]
    fn missing_id_is_reported() {
        let session = EditSession::new(v(json!({"name": "a"})), v(json!({"name": "b"})));
        let err = session.compile("user", &PatchConfig::default()).unwrap_err();
        assert!(matches!(err, PatchError::MissingObjectId));
    }

    #[test]
    fn function_edit_is_rejected() {
        let session = EditSession::new(v(json!({"id": 1})), Value::function("render"));
        let err = session.compile("user", &PatchConfig::default()).unwrap_err();
        assert!(matches!(err, PatchError::Diff(_)));
    }
}
