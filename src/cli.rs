//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use fakeua_core::convert::DEFAULT_SOURCE_URL;

/// Random real-world browser user agents.
///
/// Draws user agent strings from a dataset built out of browser usage
/// statistics, filtered by browser, operating system, and device type.
#[derive(Parser, Debug)]
#[command(name = "fakeua")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a random user agent
    Get(GetArgs),
    /// Rebuild the cached dataset from the upstream sources
    Update(UpdateArgs),
    /// Convert a user-agents.json corpus into a JSON Lines dataset
    Convert(ConvertArgs),
}

#[derive(clap::Args, Debug)]
pub struct GetArgs {
    /// Browser name or alias (chrome, ff, ie, ...); `random` draws from every allowed browser
    #[arg(default_value = "random")]
    pub browser: String,

    /// Allowed operating systems, e.g. win10,macos,linux (`windows` covers every release)
    #[arg(long, value_delimiter = ',')]
    pub os: Vec<String>,

    /// Allowed device types: desktop (or pc), mobile, tablet
    #[arg(long, value_delimiter = ',')]
    pub platform: Vec<String>,

    /// Minimum browser major.minor version
    #[arg(long, default_value_t = 0.0)]
    pub min_version: f64,

    /// Minimum usage percentage
    #[arg(long, default_value_t = 0.0)]
    pub min_percentage: f64,

    /// Pick proportionally to usage instead of uniformly
    #[arg(long)]
    pub weighted: bool,

    /// Print the whole record as JSON
    #[arg(long)]
    pub json: bool,

    /// Fail instead of printing the fallback user agent when nothing matches
    #[arg(long)]
    pub no_fallback: bool,

    /// Dataset file; built by scraping when missing (default: bundled data)
    #[arg(long, value_name = "PATH")]
    pub data: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Dataset file to rebuild (default: config `data_path` or the temp directory)
    #[arg(long, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Do not fall back to the pre-built remote dataset when scraping fails
    #[arg(long)]
    pub no_remote_fallback: bool,

    /// Skip TLS certificate validation
    #[arg(long)]
    pub insecure: bool,
}

#[derive(clap::Args, Debug)]
#[command(group(clap::ArgGroup::new("source").required(true).args(["input", "download"])))]
pub struct ConvertArgs {
    /// Local corpus file (JSON or gzipped JSON)
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Download the corpus, optionally from a custom URL
    #[arg(long, value_name = "URL", num_args = 0..=1, default_missing_value = DEFAULT_SOURCE_URL)]
    pub download: Option<String>,

    /// Output JSON Lines file
    #[arg(short, long, default_value = "browsers.jsonl")]
    pub output: PathBuf,

    /// Only convert the first N entries
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: Option<u64>,

    /// Classification worker threads (default: available cores)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=256))]
    pub threads: Option<u64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn get_args(argv: &[&str]) -> GetArgs {
        match Args::try_parse_from(argv).unwrap().command {
            Command::Get(args) => args,
            other => panic!("expected get, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_get_defaults() {
        let args = Args::try_parse_from(["fakeua", "get"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        let Command::Get(get) = args.command else {
            panic!("expected get");
        };
        assert_eq!(get.browser, "random");
        assert!(get.os.is_empty());
        assert!(get.platform.is_empty());
        assert!(!get.weighted);
        assert!(!get.json);
        assert!(get.data.is_none());
    }

    #[test]
    fn test_cli_get_filters_split_on_commas() {
        let get = get_args(&[
            "fakeua",
            "get",
            "firefox",
            "--os",
            "linux,windows",
            "--platform",
            "pc",
            "--platform",
            "mobile",
            "--min-version",
            "120.5",
            "--weighted",
            "--json",
        ]);
        assert_eq!(get.browser, "firefox");
        assert_eq!(get.os, ["linux", "windows"]);
        assert_eq!(get.platform, ["pc", "mobile"]);
        assert!((get.min_version - 120.5).abs() < f64::EPSILON);
        assert!(get.weighted);
        assert!(get.json);
    }

    #[test]
    fn test_cli_verbose_is_global() {
        let args = Args::try_parse_from(["fakeua", "get", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);

        let args = Args::try_parse_from(["fakeua", "-q", "update"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_update_flags() {
        let args =
            Args::try_parse_from(["fakeua", "update", "--no-remote-fallback", "--insecure"])
                .unwrap();
        let Command::Update(update) = args.command else {
            panic!("expected update");
        };
        assert!(update.no_remote_fallback);
        assert!(update.insecure);
        assert!(update.data.is_none());
    }

    #[test]
    fn test_cli_convert_download_defaults_to_intoli_url() {
        let args = Args::try_parse_from(["fakeua", "convert", "--download"]).unwrap();
        let Command::Convert(convert) = args.command else {
            panic!("expected convert");
        };
        assert_eq!(convert.download.as_deref(), Some(DEFAULT_SOURCE_URL));
        assert_eq!(convert.output, PathBuf::from("browsers.jsonl"));
    }

    #[test]
    fn test_cli_convert_requires_exactly_one_source() {
        let err = Args::try_parse_from(["fakeua", "convert"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = Args::try_parse_from([
            "fakeua",
            "convert",
            "--input",
            "ua.json",
            "--download",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_cli_convert_limit_zero_rejected() {
        let err = Args::try_parse_from(["fakeua", "convert", "--input", "ua.json", "--limit", "0"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_subcommand_required() {
        assert!(Args::try_parse_from(["fakeua"]).is_err());
        assert!(Args::try_parse_from(["fakeua", "-v"]).is_err());
    }

    #[test]
    fn test_cli_help_and_version() {
        let err = Args::try_parse_from(["fakeua", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);

        let err = Args::try_parse_from(["fakeua", "--version"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["fakeua", "get", "--invalid-flag"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }
}
