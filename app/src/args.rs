//! Command line arguments for the `assetbridge` driver.

use std::path::PathBuf;

use assetbridge_core::{ImportPurpose, OverwritePolicy};
use clap::{Parser, Subcommand};

/// Materialize bundled assets and run file imports against a console engine.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Bridge configuration file (TOML). Defaults apply when omitted.
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Copy the bundle tree into the destination directory
    #[command(visible_alias = "m")]
    Materialize {
        #[command(flatten)]
        dirs: BridgeDirs,

        /// Override the configured overwrite policy
        #[arg(long, value_enum)]
        policy: Option<CliPolicy>,
    },

    /// Start the bridge and deliver one file as a picker result
    #[command(visible_alias = "i")]
    Import {
        #[command(flatten)]
        dirs: BridgeDirs,

        /// Entry point to deliver to
        #[arg(long, value_enum)]
        purpose: CliPurpose,

        /// Deliver a cancellation instead of the file
        #[arg(long)]
        cancel: bool,

        /// File the picker "returns"
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct BridgeDirs {
    /// Read-only bundle directory
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub bundle: PathBuf,

    /// Writable storage directory
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub dest: PathBuf,
}

/// Overwrite policy selection for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliPolicy {
    /// Keep files that already exist in storage.
    Preserve,
    /// Replace existing files, except the exemption list.
    Overwrite,
}

impl From<CliPolicy> for OverwritePolicy {
    fn from(cli: CliPolicy) -> Self {
        match cli {
            CliPolicy::Preserve => OverwritePolicy::PreserveIfPresent,
            CliPolicy::Overwrite => OverwritePolicy::AlwaysOverwrite,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliPurpose {
    Scene,
    Texture,
}

impl From<CliPurpose> for ImportPurpose {
    fn from(cli: CliPurpose) -> Self {
        match cli {
            CliPurpose::Scene => ImportPurpose::Scene,
            CliPurpose::Texture => ImportPurpose::Texture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_import() {
        let cli = Cli::try_parse_from([
            "assetbridge",
            "import",
            "--bundle",
            "assets",
            "--dest",
            "files",
            "--purpose",
            "texture",
            "brick.png",
        ])
        .unwrap();

        let Command::Import {
            purpose,
            cancel,
            file,
            ..
        } = cli.command
        else {
            panic!("expected import");
        };
        assert_eq!(ImportPurpose::from(purpose), ImportPurpose::Texture);
        assert!(!cancel);
        assert_eq!(file, PathBuf::from("brick.png"));
    }

    #[test]
    fn parses_materialize_policy() {
        let cli = Cli::try_parse_from([
            "assetbridge",
            "materialize",
            "--bundle",
            "assets",
            "--dest",
            "files",
            "--policy",
            "overwrite",
        ])
        .unwrap();

        let Command::Materialize { policy, .. } = cli.command else {
            panic!("expected materialize");
        };
        assert_eq!(policy.map(OverwritePolicy::from), Some(OverwritePolicy::AlwaysOverwrite));
    }
}
