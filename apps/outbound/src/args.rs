//! Command-line argument parsing

use clap::Parser;
use std::path::PathBuf;

/// Publish build artifacts to the configured hosts
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Publish configuration (TOML or JSON)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Directory the transfer patterns are relative to
    #[arg(short, long = "base-dir", default_value = ".")]
    pub base_dir: PathBuf,

    /// Build timestamp used for date-formatted remote directories
    /// (RFC 3339 or `YYYY-MM-DDTHH:MM:SS`, default: now, UTC)
    #[arg(short = 't', long = "build-time")]
    pub build_time: Option<String>,

    /// Print per-file progress for every publisher
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let args = Args::parse_from([
            "outbound",
            "--config",
            "publish.toml",
            "--base-dir",
            "build",
            "--build-time",
            "2010-11-25T13:14:15",
            "--verbose",
        ]);
        assert_eq!(args.config, PathBuf::from("publish.toml"));
        assert_eq!(args.base_dir, PathBuf::from("build"));
        assert_eq!(args.build_time.as_deref(), Some("2010-11-25T13:14:15"));
        assert!(args.verbose);
    }

    #[test]
    fn base_dir_defaults_to_current() {
        let args = Args::parse_from(["outbound", "-c", "p.json"]);
        assert_eq!(args.base_dir, PathBuf::from("."));
        assert!(args.build_time.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn config_is_required() {
        assert!(Args::try_parse_from(["outbound"]).is_err());
    }
}
