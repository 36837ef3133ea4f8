use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI entry point for the template tree reconciler.
#[derive(Parser, Debug)]
#[command(
    name = "template-tree",
    about = "Reconcile a destination directory with templated source trees",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Report what would change without modifying the destination
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Disable parallel walking of source roots (parallel is enabled by default)
    #[arg(long = "no-parallel", global = true, action = clap::ArgAction::SetFalse)]
    pub parallel: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reconcile the destination with the source trees
    Apply(ApplyOpts),
    /// Print version information
    Version,
}

/// Options for the `apply` subcommand.
///
/// Every option overrides the value of the same name in the run file.
#[derive(Parser, Debug, Clone, Default)]
pub struct ApplyOpts {
    /// TOML run file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Source root; a trailing separator copies the directory's contents (repeatable)
    #[arg(long = "src")]
    pub src: Vec<String>,

    /// Destination root
    #[arg(long)]
    pub dest: Option<String>,

    /// Owner of created entries
    #[arg(long)]
    pub owner: Option<String>,

    /// Group of created entries
    #[arg(long)]
    pub group: Option<String>,

    /// Octal mode of created files
    #[arg(long)]
    pub file_mode: Option<String>,

    /// Octal mode of created directories
    #[arg(long)]
    pub directory_mode: Option<String>,

    /// Delete destination entries that no source provides
    /// (`--exclusive=false` turns a run file's setting off)
    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    pub exclusive: Option<bool>,

    /// Path exempt from deletion in exclusive mode (repeatable)
    #[arg(long = "exclusive-ignore")]
    pub exclusive_ignore: Vec<String>,

    /// Suffix marking template sources
    #[arg(long)]
    pub template_extension: Option<String>,

    /// Directory relative sources are resolved against
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// Template variable (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,

    /// Print a unified diff of every change
    #[arg(long)]
    pub diff: bool,

    /// Print the outcome record as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

/// Parse a `KEY=VALUE` pair.
fn parse_var(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn apply(args: &[&str]) -> (GlobalOpts, ApplyOpts) {
        let cli = Cli::parse_from(args);
        match cli.command {
            Command::Apply(opts) => (cli.global, opts),
            Command::Version => panic!("expected apply"),
        }
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_apply_sources_and_dest() {
        let (_, opts) = apply(&[
            "template-tree",
            "apply",
            "--src",
            "files/app/",
            "--src",
            "files/extra",
            "--dest",
            "/opt/app",
        ]);
        assert_eq!(opts.src, vec!["files/app/", "files/extra"]);
        assert_eq!(opts.dest.as_deref(), Some("/opt/app"));
        assert_eq!(opts.exclusive, None);
    }

    #[test]
    fn parse_apply_exclusive_with_ignores() {
        let (_, opts) = apply(&[
            "template-tree",
            "apply",
            "--exclusive",
            "--exclusive-ignore",
            "logs",
            "--exclusive-ignore",
            "cache",
        ]);
        assert_eq!(opts.exclusive, Some(true));
        assert_eq!(opts.exclusive_ignore, vec!["logs", "cache"]);
    }

    #[test]
    fn parse_apply_exclusive_disabled() {
        let (_, opts) = apply(&["template-tree", "apply", "--exclusive=false"]);
        assert_eq!(opts.exclusive, Some(false));
    }

    #[test]
    fn parse_vars() {
        let (_, opts) = apply(&["template-tree", "apply", "--var", "port=8080", "--var", "url=a=b"]);
        assert_eq!(
            opts.vars,
            vec![
                ("port".to_string(), "8080".to_string()),
                ("url".to_string(), "a=b".to_string()),
            ]
        );
    }

    #[test]
    fn var_without_key_is_rejected() {
        assert!(Cli::try_parse_from(["template-tree", "apply", "--var", "=1"]).is_err());
        assert!(Cli::try_parse_from(["template-tree", "apply", "--var", "port"]).is_err());
    }

    #[test]
    fn parse_dry_run_short() {
        let (global, _) = apply(&["template-tree", "-d", "apply"]);
        assert!(global.dry_run);
    }

    #[test]
    fn parse_config_short() {
        let (_, opts) = apply(&["template-tree", "apply", "-c", "run.toml"]);
        assert_eq!(opts.config, Some(PathBuf::from("run.toml")));
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["template-tree", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::parse_from(["template-tree", "-v", "apply"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parallel_is_enabled_by_default() {
        let (global, _) = apply(&["template-tree", "apply"]);
        assert!(global.parallel, "parallel should be true by default");
    }

    #[test]
    fn no_parallel_disables_parallel() {
        let (global, _) = apply(&["template-tree", "--no-parallel", "apply"]);
        assert!(
            !global.parallel,
            "--no-parallel should set parallel to false"
        );
    }
}
