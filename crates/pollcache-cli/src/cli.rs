//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::replay::ReplayArgs;

/// Live poll vote collections, replayed against an in-memory backend.
#[derive(Parser, Debug)]
#[command(name = "pollcache")]
#[command(author, version = env!("POLLCACHE_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Filter directives for `-v` counts. Targets starting with `pollcache`
    /// get the requested level; dependencies stay at `warn` until `-vvv`.
    pub fn log_directives(&self) -> String {
        match self.verbose {
            0 => "warn".to_string(),
            1 => "pollcache=info,warn".to_string(),
            2 => "pollcache=debug,warn".to_string(),
            _ => "trace".to_string(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a fixture and replay a script through one live collection
    Replay(ReplayArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn arguments_are_consistent() {
        Cli::command().debug_assert();
    }

    fn verbosity(flags: &[&str]) -> String {
        let mut args = vec!["pollcache"];
        args.extend_from_slice(flags);
        args.extend(["replay", "--fixture", "f.json", "--poll", "p1", "--answers"]);
        Cli::try_parse_from(args).unwrap().log_directives()
    }

    #[test]
    fn verbosity_raises_engine_targets_only() {
        assert_eq!(verbosity(&[]), "warn");
        assert_eq!(verbosity(&["-v"]), "pollcache=info,warn");
        assert_eq!(verbosity(&["-vv"]), "pollcache=debug,warn");
        assert_eq!(verbosity(&["-vvv"]), "trace");
    }

    #[test]
    fn version_flag_reports_embedded_version() {
        let err = Cli::try_parse_from(["pollcache", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
        assert!(err.to_string().contains(env!("POLLCACHE_VERSION")));
    }

    #[test]
    fn scope_is_required() {
        let parsed = Cli::try_parse_from(["pollcache", "replay", "--fixture", "f.json", "--poll", "p1"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn answers_and_option_conflict() {
        let parsed = Cli::try_parse_from([
            "pollcache", "replay", "--fixture", "f.json", "--poll", "p1", "--answers", "--option", "optA",
        ]);
        assert!(parsed.is_err());
    }
}
