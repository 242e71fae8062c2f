//! Apply an edit entry to an object, as a store does on receipt, and undo it
//! again from the prior values it carries.
//!
//! Both directions are all-or-nothing: the input is cloned, every check runs
//! against the unmodified input, and the clone is returned only if every
//! directive succeeded.

use std::collections::BTreeMap;

use odb_types::{Number, Value};
use tracing::debug;

use crate::directive::Directive;
use crate::error::{ApplyError, ApplyResult};
use crate::operation::EditEntry;
use crate::path::{FieldPath, Segment};

type Change<'e> = (&'e String, FieldPath, &'e Directive);

/// Apply `entry` to `target` and return the edited object.
///
/// Every `current` value must match the target. A `set` or `delete` that
/// replaces a non-null value must be covered by a `current` entry. Directives
/// run in path order, except deletions, which run last from the highest path
/// down so removing several array elements keeps the remaining indexes valid.
pub fn apply_edit(target: &Value, entry: &EditEntry) -> ApplyResult<Value> {
    let changes = parse_changes(entry)?;

    for (raw, expected) in &entry.current {
        let path = FieldPath::parse(raw)?;
        let actual = lookup(target, &path).cloned().unwrap_or(Value::Null);
        if &actual != expected {
            return Err(ApplyError::PriorValueMismatch {
                path: raw.clone(),
                expected: expected.clone(),
                actual,
            });
        }
    }

    for (raw, path, directive) in &changes {
        if matches!(directive, Directive::Set(_) | Directive::Delete)
            && !entry.current.contains_key(*raw)
            && lookup(target, path).is_some_and(|v| !v.is_null())
        {
            return Err(ApplyError::MissingPriorValue(raw.to_string()));
        }
    }

    let (mut deletes, writes): (Vec<_>, Vec<_>) = changes
        .into_iter()
        .partition(|(_, _, directive)| matches!(directive, Directive::Delete));
    deletes.reverse();

    let mut doc = target.clone();
    for (_, path, directive) in &writes {
        match directive {
            Directive::Set(value) => set_at(&mut doc, path, value.clone())?,
            Directive::Increment => increment_at(&mut doc, path)?,
            Directive::Append(value) => append_at(&mut doc, path, value.clone())?,
            Directive::Delete => {}
        }
    }
    for (_, path, _) in &deletes {
        remove_at(&mut doc, path)?;
    }

    debug!(
        id = %entry.id,
        writes = writes.len(),
        deletes = deletes.len(),
        "edit applied"
    );
    Ok(doc)
}

/// Undo `entry` on `edited`, the object it produced, and return the object
/// as it was before.
///
/// `set` and `delete` restore the path's `current` value. A `set` without
/// one created its path, which is removed again. `increment` restores
/// `current` when given and otherwise subtracts one. `append` removes the
/// appended value, or the appended keys of a merged object; an array the
/// append created is left behind empty.
///
/// Every `set` value must still be in place. Deletions are undone first, in
/// ascending path order, then the remaining directives from the highest path
/// down.
pub fn revert_edit(edited: &Value, entry: &EditEntry) -> ApplyResult<Value> {
    let changes = parse_changes(entry)?;

    for (raw, path, directive) in &changes {
        if let Directive::Set(expected) = directive {
            let actual = lookup(edited, path).cloned().unwrap_or(Value::Null);
            if &actual != expected {
                return Err(ApplyError::NotApplied {
                    path: raw.to_string(),
                    expected: expected.clone(),
                    actual,
                });
            }
        }
    }

    let (deletes, writes): (Vec<_>, Vec<_>) = changes
        .into_iter()
        .partition(|(_, _, directive)| matches!(directive, Directive::Delete));

    let mut doc = edited.clone();
    for (raw, path, _) in &deletes {
        if let Some(prior) = entry.current.get(*raw) {
            insert_at(&mut doc, path, prior.clone())?;
        }
    }
    for (raw, path, directive) in writes.iter().rev() {
        match (directive, entry.current.get(*raw)) {
            (Directive::Set(_) | Directive::Increment, Some(prior)) => {
                set_at(&mut doc, path, prior.clone())?
            }
            (Directive::Set(_), None) => remove_at(&mut doc, path)?,
            (Directive::Increment, None) => decrement_at(&mut doc, path)?,
            (Directive::Append(value), _) => unappend_at(&mut doc, path, value)?,
            (Directive::Delete, _) => {}
        }
    }

    debug!(
        id = %entry.id,
        writes = writes.len(),
        deletes = deletes.len(),
        "edit reverted"
    );
    Ok(doc)
}

/// Read the value at `path`, if every step exists.
pub fn lookup<'a>(value: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(value, |cursor, segment| child(cursor, segment))
}

// Change paths in ascending order. No directive may address the root.
fn parse_changes<'e>(entry: &'e EditEntry) -> ApplyResult<Vec<Change<'e>>> {
    let mut changes = entry
        .change
        .iter()
        .map(|(raw, directive)| -> ApplyResult<Change<'e>> {
            let path = FieldPath::parse(raw)?;
            if path.is_root() {
                return Err(ApplyError::RootTarget);
            }
            Ok((raw, path, directive))
        })
        .collect::<ApplyResult<Vec<_>>>()?;
    changes.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(changes)
}

fn child<'a>(value: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(&segment.key()),
        Value::Array(items) => segment.as_index().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn child_mut<'a>(value: &'a mut Value, segment: &Segment) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(&segment.key()),
        Value::Array(items) => segment.as_index().and_then(move |i| items.get_mut(i)),
        _ => None,
    }
}

// Missing or null object members on the way down become empty objects.
fn child_or_create<'a>(value: &'a mut Value, segment: &Segment) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => {
            let slot = map.entry(segment.key()).or_insert(Value::Null);
            if slot.is_null() {
                *slot = Value::Object(BTreeMap::new());
            }
            Some(slot)
        }
        Value::Array(items) => segment.as_index().and_then(move |i| items.get_mut(i)),
        _ => None,
    }
}

fn parent_mut<'a, 'p>(
    doc: &'a mut Value,
    path: &'p FieldPath,
    create: bool,
) -> ApplyResult<(&'a mut Value, &'p Segment)> {
    let not_found = || ApplyError::PathNotFound(path.to_string());
    let (last, parents) = path.segments().split_last().ok_or(ApplyError::RootTarget)?;
    let mut cursor = doc;
    for segment in parents {
        cursor = if create {
            child_or_create(cursor, segment)
        } else {
            child_mut(cursor, segment)
        }
        .ok_or_else(not_found)?;
    }
    Ok((cursor, last))
}

fn set_at(doc: &mut Value, path: &FieldPath, value: Value) -> ApplyResult<()> {
    let (parent, last) = parent_mut(doc, path, true)?;
    match parent {
        Value::Object(map) => {
            map.insert(last.key(), value);
            Ok(())
        }
        Value::Array(items) => {
            let index = last
                .as_index()
                .ok_or_else(|| ApplyError::PathNotFound(path.to_string()))?;
            let len = items.len();
            if index < len {
                items[index] = value;
            } else if index == len {
                items.push(value);
            } else {
                return Err(ApplyError::IndexOutOfRange {
                    path: path.to_string(),
                    index,
                    len,
                });
            }
            Ok(())
        }
        _ => Err(ApplyError::PathNotFound(path.to_string())),
    }
}

// Like `set_at`, but array elements at and after the index shift up.
fn insert_at(doc: &mut Value, path: &FieldPath, value: Value) -> ApplyResult<()> {
    let (parent, last) = parent_mut(doc, path, true)?;
    match parent {
        Value::Object(map) => {
            map.insert(last.key(), value);
            Ok(())
        }
        Value::Array(items) => {
            let index = last
                .as_index()
                .ok_or_else(|| ApplyError::PathNotFound(path.to_string()))?;
            let len = items.len();
            if index > len {
                return Err(ApplyError::IndexOutOfRange {
                    path: path.to_string(),
                    index,
                    len,
                });
            }
            items.insert(index, value);
            Ok(())
        }
        _ => Err(ApplyError::PathNotFound(path.to_string())),
    }
}

fn remove_at(doc: &mut Value, path: &FieldPath) -> ApplyResult<()> {
    let (parent, last) = parent_mut(doc, path, false)?;
    match parent {
        Value::Object(map) => {
            map.remove(&last.key());
            Ok(())
        }
        Value::Array(items) => {
            let len = items.len();
            match last.as_index() {
                Some(index) if index < len => {
                    items.remove(index);
                    Ok(())
                }
                Some(index) => Err(ApplyError::IndexOutOfRange {
                    path: path.to_string(),
                    index,
                    len,
                }),
                None => Err(ApplyError::PathNotFound(path.to_string())),
            }
        }
        _ => Err(ApplyError::PathNotFound(path.to_string())),
    }
}

// Counters are held as longs; fractional values are truncated.
fn step(n: &Number, delta: i64) -> Value {
    if let Some(i) = n.as_i64() {
        return Value::from(i.saturating_add(delta));
    }
    if let Some(u) = n.as_u64() {
        return Value::from(u.saturating_add_signed(delta));
    }
    let f = n.as_f64().unwrap_or_default();
    Value::from((f.trunc() as i64).saturating_add(delta))
}

fn increment_at(doc: &mut Value, path: &FieldPath) -> ApplyResult<()> {
    let next = match lookup(doc, path) {
        None | Some(Value::Null) => Value::from(1),
        Some(Value::Number(n)) => step(n, 1),
        Some(other) => {
            return Err(ApplyError::IncrementNonNumber {
                path: path.to_string(),
                found: other.type_name(),
            })
        }
    };
    set_at(doc, path, next)
}

fn decrement_at(doc: &mut Value, path: &FieldPath) -> ApplyResult<()> {
    let prev = match lookup(doc, path) {
        Some(Value::Number(n)) => step(n, -1),
        Some(other) => {
            return Err(ApplyError::IncrementNonNumber {
                path: path.to_string(),
                found: other.type_name(),
            })
        }
        None => return Err(ApplyError::PathNotFound(path.to_string())),
    };
    set_at(doc, path, prev)
}

fn append_mismatch(path: &FieldPath, found: &'static str, value: &Value) -> ApplyError {
    ApplyError::AppendMismatch {
        path: path.to_string(),
        found,
        value: value.type_name(),
    }
}

fn append_at(doc: &mut Value, path: &FieldPath, value: Value) -> ApplyResult<()> {
    let (parent, last) = parent_mut(doc, path, true)?;
    match child_mut(parent, last) {
        Some(Value::Array(items)) => {
            items.push(value);
            Ok(())
        }
        Some(Value::Object(map)) => match value {
            Value::Object(extra) => {
                map.extend(extra);
                Ok(())
            }
            other => Err(append_mismatch(path, "object", &other)),
        },
        Some(Value::Null) | None => set_at(doc, path, Value::Array(vec![value])),
        Some(other) => {
            let found = other.type_name();
            Err(append_mismatch(path, found, &value))
        }
    }
}

fn unappend_at(doc: &mut Value, path: &FieldPath, value: &Value) -> ApplyResult<()> {
    let (parent, last) = parent_mut(doc, path, false)?;
    match child_mut(parent, last) {
        Some(Value::Array(items)) => {
            let index = items
                .iter()
                .rposition(|item| item == value)
                .ok_or_else(|| ApplyError::PathNotFound(path.to_string()))?;
            items.remove(index);
            Ok(())
        }
        Some(Value::Object(map)) => match value {
            Value::Object(extra) => {
                for key in extra.keys() {
                    map.remove(key);
                }
                Ok(())
            }
            other => Err(append_mismatch(path, "object", other)),
        },
        Some(other) => {
            let found = other.type_name();
            Err(append_mismatch(path, found, value))
        }
        None => Err(ApplyError::PathNotFound(path.to_string())),
    }
}
