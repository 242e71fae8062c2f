//! The edit operation record handed to the submitter.

use odb_types::ObjectId;
use serde::{Deserialize, Serialize};

use crate::directive::{ChangeSet, Patch, PriorValues};

/// One object's edit: what to change and what the fields held before.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EditEntry {
    pub id: ObjectId,
    pub change: ChangeSet,
    pub current: PriorValues,
}

/// An edit operation: `{"type": …, "edit": [{"id", "change", "current"}]}`.
///
/// Stores match on these field names and on the directive vocabulary, so
/// neither may change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EditOperation {
    #[serde(rename = "type")]
    pub op_type: String,
    pub edit: Vec<EditEntry>,
}

impl EditOperation {
    /// Wrap a flattened patch as a single-entry edit of `id`.
    pub fn from_patch(id: ObjectId, op_type: impl Into<String>, patch: Patch) -> Self {
        build_edit_operation(id, op_type, patch.change, patch.current)
    }

    /// Returns `true` if no entry changes anything.
    pub fn is_noop(&self) -> bool {
        self.edit.iter().all(|e| e.change.is_empty())
    }

    /// Render as compact JSON.
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Package a change set and its prior values as an edit of `id`.
///
/// `op_type` is passed through as given; whether it matches the object's
/// actual type is for the store to decide.
pub fn build_edit_operation(
    id: ObjectId,
    op_type: impl Into<String>,
    change: ChangeSet,
    current: PriorValues,
) -> EditOperation {
    EditOperation {
        op_type: op_type.into(),
        edit: vec![EditEntry {
            id,
            change,
            current,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::Directive;
    use odb_types::Value;
    use serde_json::json;

    #[test]
    fn wire_shape() {
        let mut change = ChangeSet::new();
        change.insert("name".into(), Directive::Set(Value::from("b")));
        change.insert("version".into(), Directive::Increment);
        let mut current = PriorValues::new();
        current.insert("name".into(), Value::from("a"));

        let op = build_edit_operation(ObjectId::from(7), "user", change, current);
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({
                "type": "user",
                "edit": [{
                    "id": 7,
                    "change": {"name": {"set": "b"}, "version": "increment"},
                    "current": {"name": "a"}
                }]
            })
        );
    }

    #[test]
    fn empty_patch_is_noop() {
        let op = EditOperation::from_patch(ObjectId::from(1), "user", Patch::default());
        assert!(op.is_noop());
        assert_eq!(op.edit.len(), 1);
        assert_eq!(
            op.to_json_string().unwrap(),
            r#"{"type":"user","edit":[{"id":1,"change":{},"current":{}}]}"#
        );
    }

    #[test]
    fn composite_id_carried_verbatim() {
        let id = ObjectId::composite(["osm", "42"]);
        let op = build_edit_operation(id.clone(), "place", ChangeSet::new(), PriorValues::new());
        assert_eq!(op.edit[0].id, id);
    }

    #[test]
    fn parses_from_wire() {
        let op: EditOperation = serde_json::from_value(json!({
            "type": "user",
            "edit": [{
                "id": ["u", "1"],
                "change": {"tags": {"append": "x"}, "old": "delete"},
                "current": {"old": 1}
            }]
        }))
        .unwrap();
        assert_eq!(op.op_type, "user");
        let entry = &op.edit[0];
        assert_eq!(entry.change.get("old"), Some(&Directive::Delete));
        assert_eq!(entry.change.get("tags"), Some(&Directive::Append(Value::from("x"))));
    }
}
