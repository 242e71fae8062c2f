use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use odb_diff::{diff_values, ChangeKind, DiffNode};
use odb_patch::{
    apply_edit, revert_edit, ApplyResult, EditEntry, EditOperation, EditSession, FieldPath,
    PatchConfig,
};
use odb_types::{ObjectId, Value};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Diff(args) => cmd_diff(args),
        Command::Compile(args) => cmd_compile(args),
        Command::Apply(args) => cmd_apply(args, apply_edit),
        Command::Revert(args) => cmd_apply(args, revert_edit),
        Command::Config(args) => cmd_config(args),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PatchConfig> {
    match path {
        Some(p) => PatchConfig::load(p).with_context(|| format!("loading {}", p.display())),
        None => Ok(PatchConfig::default()),
    }
}

fn cmd_diff(args: DiffArgs) -> anyhow::Result<()> {
    let original: Value = read_json(&args.original)?;
    let edited: Value = read_json(&args.edited)?;
    let node = diff_values(&original, &edited)?;

    if args.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&node)?);
        return Ok(());
    }

    let lines = change_lines(&node);
    if lines.is_empty() {
        println!("No changes.");
        return Ok(());
    }
    for line in &lines {
        println!("{}", render_line(line));
    }
    let summary = node.summary();
    println!(
        "\n{} created, {} updated, {} deleted",
        summary.created.to_string().green(),
        summary.updated.to_string().yellow(),
        summary.deleted.to_string().red(),
    );
    Ok(())
}

fn cmd_compile(args: CompileArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let original: Value = read_json(&args.original)?;
    let edited: Value = read_json(&args.edited)?;

    let op = EditSession::new(original, edited).compile(&args.op_type, &config)?;
    if op.is_noop() {
        eprintln!("{}", "warning: edit changes nothing".yellow());
    }
    println!("{}", serde_json::to_string_pretty(&op)?);
    Ok(())
}

fn cmd_apply(
    args: ApplyArgs,
    run: fn(&Value, &EditEntry) -> ApplyResult<Value>,
) -> anyhow::Result<()> {
    let object: Value = read_json(&args.object)?;
    let op: EditOperation = read_json(&args.operation)?;
    let Some(entry) = op.edit.get(args.entry) else {
        bail!("operation has {} edit entries, no entry {}", op.edit.len(), args.entry);
    };
    if let Some(id) = ObjectId::of(&object) {
        if id != entry.id {
            bail!("edit targets object {} but {} has id {}", entry.id, args.object.display(), id);
        }
    }

    let result = run(&object, entry)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}

/// One changed leaf of a diff, addressed by its path string.
#[derive(Debug, PartialEq)]
struct ChangeLine {
    path: String,
    kind: ChangeKind,
    old: Option<Value>,
    new: Option<Value>,
}

fn change_lines(node: &DiffNode) -> Vec<ChangeLine> {
    let mut lines = Vec::new();
    collect(node, &FieldPath::root(), &mut lines);
    lines
}

fn collect(node: &DiffNode, path: &FieldPath, lines: &mut Vec<ChangeLine>) {
    match node {
        DiffNode::Leaf(leaf) if leaf.kind() != ChangeKind::Unchanged => lines.push(ChangeLine {
            path: path.to_string(),
            kind: leaf.kind(),
            old: leaf.old().cloned(),
            new: leaf.new_value().cloned(),
        }),
        DiffNode::Leaf(_) => {}
        DiffNode::Interior(children) => {
            for (key, child) in children {
                collect(child, &path.child(key), lines);
            }
        }
    }
}

fn show(value: &Option<Value>) -> String {
    value.as_ref().map(Value::to_string).unwrap_or_default()
}

fn render_line(line: &ChangeLine) -> String {
    match line.kind {
        ChangeKind::Created => format!("{} {} = {}", "+".green().bold(), line.path, show(&line.new)),
        ChangeKind::Deleted => format!("{} {} (was {})", "-".red().bold(), line.path, show(&line.old)),
        ChangeKind::Updated => format!(
            "{} {}: {} → {}",
            "~".yellow().bold(),
            line.path,
            show(&line.old).dimmed(),
            show(&line.new)
        ),
        ChangeKind::Unchanged => format!("  {}", line.path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn change_lines_list_only_changed_leaves() {
        let old = Value::from(json!({"name": "Alice", "tags": ["x"], "id": 7}));
        let new = Value::from(json!({"name": "Alicia", "tags": ["x", "y"], "id": 7}));
        let lines = change_lines(&diff_values(&old, &new).unwrap());

        let paths: Vec<&str> = lines.iter().map(|l| l.path.as_str()).collect();
        assert_eq!(paths, vec!["name", "tags[1]"]);
        assert_eq!(lines[0].kind, ChangeKind::Updated);
        assert_eq!(lines[1].kind, ChangeKind::Created);
        assert_eq!(lines[1].new, Some(Value::from("y")));
    }

    #[test]
    fn render_mentions_path_and_values() {
        colored::control::set_override(false);
        let line = ChangeLine {
            path: "addr.city".into(),
            kind: ChangeKind::Updated,
            old: Some(Value::from("X")),
            new: Some(Value::from("Y")),
        };
        assert_eq!(render_line(&line), r#"~ addr.city: "X" → "Y""#);
    }
}
