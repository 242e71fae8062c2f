use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "odb",
    about = "Diff objects and compile edit operations for the object store",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show how an edited object differs from its original
    Diff(DiffArgs),
    /// Compile an original/edited pair into an edit operation
    Compile(CompileArgs),
    /// Apply an edit operation to an object
    Apply(ApplyArgs),
    /// Undo an edit operation on the object it produced
    Revert(ApplyArgs),
    /// Print the effective patch configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    /// JSON file holding the original object
    pub original: PathBuf,
    /// JSON file holding the edited copy
    pub edited: PathBuf,
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct CompileArgs {
    pub original: PathBuf,
    pub edited: PathBuf,
    /// Object type tag written into the operation
    #[arg(short = 't', long = "type")]
    pub op_type: String,
    /// TOML patch configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// JSON file holding the object to edit, or to restore on revert
    pub object: PathBuf,
    /// JSON file holding the edit operation
    pub operation: PathBuf,
    /// Which edit entry to apply
    #[arg(long, default_value = "0")]
    pub entry: usize,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_belongs_to_diff() {
        let cli = Cli::try_parse_from(["odb", "diff", "a.json", "b.json", "--format", "json"]).unwrap();
        match cli.command {
            Command::Diff(args) => assert_eq!(args.format, OutputFormat::Json),
            _ => panic!("expected diff"),
        }
        assert!(Cli::try_parse_from(["odb", "compile", "a.json", "b.json", "-t", "user", "--format", "text"]).is_err());
        assert!(Cli::try_parse_from(["odb", "config", "--format", "json"]).is_err());
    }

    #[test]
    fn revert_takes_object_and_operation() {
        let cli = Cli::try_parse_from(["odb", "-v", "revert", "obj.json", "op.json", "--entry", "1"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Revert(args) => {
                assert_eq!(args.object, PathBuf::from("obj.json"));
                assert_eq!(args.entry, 1);
            }
            _ => panic!("expected revert"),
        }
    }
}
