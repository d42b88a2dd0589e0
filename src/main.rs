//! # Codepad
//!
//! Headless front end for the codepad editor core.
//!
//! ## Quick Start
//!
//! ```bash
//! # Print a file with line numbers and highlighting
//! cargo run -- view path/to/script.py
//!
//! # Wrap at 60 columns, with the greedy string rule
//! cargo run -- view path/to/script.py --width 60 --greedy-strings
//!
//! # Run a file through the configured interpreter
//! cargo run -- run path/to/script.py --timeout 10
//! ```

mod render;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use codepad_core::{BufferSession, Config, Editor, SystemLauncher};
use codepad_syntax::StringMatching;

/// Codepad - a small code editor core
#[derive(Parser, Debug)]
#[command(name = "codepad")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print a file with its gutter and highlighting
    View {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Match strings from the first quote to the last on each line
        #[arg(long)]
        greedy_strings: bool,

        /// Wrap text at this many columns
        #[arg(short, long, value_name = "N")]
        width: Option<usize>,
    },

    /// Run a file and print its output
    Run {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Kill the process after this many seconds
        #[arg(short, long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
        timeout: Option<u64>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .with(filter)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(Config::load()),
    }
}

fn view(mut config: Config, file: PathBuf, greedy: bool, width: Option<usize>) -> anyhow::Result<()> {
    if greedy {
        config.highlight.string_matching = StringMatching::Greedy;
    }
    config.editor.read_only = true;

    let mut session = BufferSession::load(&file, &config)?;
    tracing::info!(language = session.language().name(), "viewing {}", session.title());

    let editor_view = session.view_mut();
    render::fit_view(editor_view, width);
    let rows = render::rows(editor_view);

    let mut stdout = std::io::stdout().lock();
    render::print_rows(
        &mut stdout,
        &rows,
        editor_view.line_count(),
        config.gutter.background,
        config.gutter.foreground,
    )?;
    Ok(())
}

async fn run(mut config: Config, file: PathBuf, timeout: Option<u64>) -> anyhow::Result<i32> {
    if let Some(secs) = timeout {
        config.process.timeout_secs = secs;
    }
    config.validate()?;

    let mut editor = Editor::with_config(config);
    let id = editor.load_session(&file)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let output = editor.run(id, &SystemLauncher, cancel).await?;
    print!("{}", output.stdout);
    eprint!("{}", output.stderr);
    if !output.success() {
        tracing::warn!(status = ?output.status, "process failed");
    }
    Ok(output.status.unwrap_or(1))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose);
    tracing::debug!("Starting codepad v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(args.config.as_ref())?;

    match args.command {
        Cmd::View {
            file,
            greedy_strings,
            width,
        } => view(config, file, greedy_strings, width),
        Cmd::Run { file, timeout } => {
            let status = run(config, file, timeout).await?;
            if status != 0 {
                std::process::exit(status);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_view_args() {
        let args =
            Args::try_parse_from(["codepad", "-vv", "view", "a.py", "--greedy-strings", "--width", "60"])
                .unwrap();
        assert_eq!(args.verbose, 2);
        match args.command {
            Cmd::View {
                file,
                greedy_strings,
                width,
            } => {
                assert_eq!(file, PathBuf::from("a.py"));
                assert!(greedy_strings);
                assert_eq!(width, Some(60));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_run_args() {
        let args =
            Args::try_parse_from(["codepad", "run", "a.py", "--timeout", "5", "--config", "c.toml"])
                .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("c.toml")));
        assert!(matches!(args.command, Cmd::Run { timeout: Some(5), .. }));
        assert!(Args::try_parse_from(["codepad", "run"]).is_err());
        assert!(Args::try_parse_from(["codepad", "run", "a.py", "--timeout", "0"]).is_err());
    }

    #[test]
    fn test_view_prints_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.py");
        std::fs::write(&path, "x = 1\n").unwrap();

        assert!(view(Config::default(), path, false, Some(40)).is_ok());
        assert!(view(Config::default(), dir.path().join("missing.py"), false, None).is_err());
    }
}
