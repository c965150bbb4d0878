//! Command-line definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// strmsync - keep a tree of .strm link files in sync with remote media
#[derive(Parser, Debug)]
#[command(name = "strmsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (missing file means defaults)
    #[arg(short, long, env = "STRMSYNC_CONFIG", default_value = "config.toml")]
    pub config: PathBuf,

    /// Log output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create or refresh link files for every item in a manifest
    Sync {
        /// JSON array of sync requests
        #[arg(short, long)]
        manifest: PathBuf,

        /// Report what would change without touching the disk
        #[arg(long)]
        dry_run: bool,
    },

    /// Re-run sync on an interval until interrupted
    Watch {
        /// JSON array of sync requests (re-read every cycle)
        #[arg(short, long)]
        manifest: PathBuf,

        /// Seconds between cycles (defaults to watch.interval_secs)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Report what would change without touching the disk
        #[arg(long)]
        dry_run: bool,
    },

    /// List link files under the output root
    Scan {
        /// Print descriptors as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete one link file (relative paths are under the output root)
    Delete {
        path: PathBuf,
    },

    /// Delete link files whose remote URL is not in the manifest
    Prune {
        /// JSON array of sync requests that are still active
        #[arg(short, long)]
        manifest: PathBuf,

        /// List stale files without deleting them
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sync() {
        let cli = Cli::try_parse_from([
            "strmsync",
            "--config",
            "/etc/strmsync.toml",
            "sync",
            "--manifest",
            "items.json",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("/etc/strmsync.toml"));
        match cli.command {
            Commands::Sync { manifest, dry_run } => {
                assert_eq!(manifest, PathBuf::from("items.json"));
                assert!(dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_watch_interval() {
        let cli =
            Cli::try_parse_from(["strmsync", "watch", "-m", "items.json", "--interval", "60"])
                .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Watch {
                interval: Some(60),
                dry_run: false,
                ..
            }
        ));
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    #[test]
    fn test_manifest_required() {
        assert!(Cli::try_parse_from(["strmsync", "sync"]).is_err());
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
