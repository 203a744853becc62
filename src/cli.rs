//! Command-line interface definition.
use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the agentdeck hook installer.
#[derive(Parser, Debug)]
#[command(
    name = "agentdeck",
    about = "Register agentdeck's dashboard hook with AI coding agents",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Override the bundle directory holding hooks/agentdeck-hook.*
    #[arg(long, global = true)]
    pub root: Option<std::path::PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Deploy hook scripts and register them with every enabled host
    Install(InstallOpts),
    /// Back up, then remove every agentdeck registration and script
    Reset(ResetOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Install(_) => "install",
            Self::Reset(_) => "reset",
            Self::Version => "version",
        }
    }
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallOpts {
    /// Skip specific tasks
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Run only specific tasks
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}

/// Options for the `reset` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct ResetOpts {
    /// Do not ask a running dashboard to clear its browser state
    #[arg(long)]
    pub no_signal: bool,
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

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_install_dry_run() {
        let cli = Cli::parse_from(["agentdeck", "--dry-run", "install"]);
        assert!(cli.global.dry_run);
        assert!(matches!(cli.command, Command::Install(_)));
    }

    #[test]
    fn parse_dry_run_short_after_subcommand() {
        let cli = Cli::parse_from(["agentdeck", "reset", "-d"]);
        assert!(cli.global.dry_run);
    }

    #[test]
    fn parse_install_skip_tasks() {
        let cli = Cli::parse_from(["agentdeck", "install", "--skip", "scripts,back up"]);
        let Command::Install(opts) = cli.command else {
            panic!("expected install");
        };
        assert_eq!(opts.skip, vec!["scripts", "back up"]);
    }

    #[test]
    fn parse_install_only_tasks() {
        let cli = Cli::parse_from(["agentdeck", "install", "--only", "register"]);
        let Command::Install(opts) = cli.command else {
            panic!("expected install");
        };
        assert_eq!(opts.only, vec!["register"]);
    }

    #[test]
    fn parse_reset_defaults_to_signal() {
        let cli = Cli::parse_from(["agentdeck", "reset"]);
        let Command::Reset(opts) = cli.command else {
            panic!("expected reset");
        };
        assert!(!opts.no_signal);
    }

    #[test]
    fn parse_reset_no_signal() {
        let cli = Cli::parse_from(["agentdeck", "reset", "--no-signal"]);
        let Command::Reset(opts) = cli.command else {
            panic!("expected reset");
        };
        assert!(opts.no_signal);
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["agentdeck", "version"]);
        assert!(matches!(cli.command, Command::Version));
        assert_eq!(cli.command.name(), "version");
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::parse_from(["agentdeck", "-v", "install"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_root_override() {
        let cli = Cli::parse_from(["agentdeck", "--root", "/opt/agentdeck", "install"]);
        assert_eq!(
            cli.global.root,
            Some(std::path::PathBuf::from("/opt/agentdeck"))
        );
    }
}
