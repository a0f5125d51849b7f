use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use svgdomctl::cmd_conform;
use svgdomctl::cmd_elements;
use svgdomctl::cmd_parse;

#[derive(Parser, Debug)]
#[command(name = "svgdomctl", version, about = "SVG object model CLI")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Output JSON where applicable
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Parse one SVG file and print its element tree
    Parse {
        file: PathBuf,
        /// Keep styles as raw declarations instead of typed properties
        #[arg(long)]
        no_flush: bool,
    },
    /// List the registered element types
    Elements,
    /// Parse every test file in a directory and report failures
    Conform {
        dir: PathBuf,
        /// Files expected to parse, one per line [default: DIR/../PassingTests.txt]
        #[arg(long)]
        passing: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let Cli { verbose, json, cmd } = Cli::parse();

    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| level.into()),
        ))
        .with_target(false)
        .init();

    match cmd {
        Cmd::Parse { file, no_flush } => cmd_parse::run(&file, !no_flush, json)?,
        Cmd::Elements => cmd_elements::run(json)?,
        Cmd::Conform { dir, passing } => cmd_conform::run(&dir, passing, json)?,
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults_flush_styles() {
        let cli = Cli::parse_from(["svgdomctl", "parse", "a.svg"]);
        assert!(!cli.json);
        assert_eq!(cli.verbose, 0);
        match cli.cmd {
            Cmd::Parse { file, no_flush } => {
                assert_eq!(file, PathBuf::from("a.svg"));
                assert!(!no_flush);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn parse_conform_args() {
        let cli = Cli::parse_from([
            "svgdomctl",
            "-vv",
            "--json",
            "conform",
            "suite/svg",
            "--passing",
            "pass.txt",
        ]);
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        match cli.cmd {
            Cmd::Conform { dir, passing } => {
                assert_eq!(dir, PathBuf::from("suite/svg"));
                assert_eq!(passing, Some(PathBuf::from("pass.txt")));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn elements_takes_no_arguments() {
        let cli = Cli::parse_from(["svgdomctl", "elements"]);
        assert!(matches!(cli.cmd, Cmd::Elements));
        assert!(Cli::try_parse_from(["svgdomctl", "elements", "extra"]).is_err());
    }
}
