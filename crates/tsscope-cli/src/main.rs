use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glob::glob;
use log::{LevelFilter, debug};
use serde::Serialize;
use tsscope_core::ts::{RoundMode, StreamError, TransportStream};
use tsscope_core::{AnalysisError, ByteSource, FileByteSource, ScanRange};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("TSSCOPE_BUILD_COMMIT"),
    " ",
    env!("TSSCOPE_BUILD_DATE"),
    ")"
);

const INPUT_HINT: &str = "expected a file of 188-byte packets starting with 0x47";

#[derive(Parser, Debug)]
#[command(name = "tsscope")]
#[command(version = VERSION)]
#[command(
    about = "Offline inspector for MPEG-2 transport stream files.",
    long_about = None,
    after_help = "Examples:\n  tsscope ts probe capture.ts\n  tsscope ts packet capture.ts --position 376\n  tsscope ts summary capture.ts -o report.json"
)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on transport stream files.
    Ts {
        #[command(subcommand)]
        command: TsCommands,
    },
}

#[derive(Subcommand, Debug)]
enum TsCommands {
    /// Check whether a file looks like a transport stream.
    Probe {
        /// Path (or glob pattern) of the input file
        input: PathBuf,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },

    /// Decode the packet at a byte position and print it as JSON.
    #[command(
        after_help = "Examples:\n  tsscope ts packet capture.ts --position 0\n  tsscope ts packet capture.ts --position 1000 --round down --pretty"
    )]
    Packet {
        /// Path (or glob pattern) of the input file
        input: PathBuf,

        /// Byte position of the packet
        #[arg(short, long, allow_negative_numbers = true)]
        position: i64,

        /// Snap the position to a packet start first
        #[arg(long, value_enum)]
        round: Option<RoundArg>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Summarize a byte range per PID and generate a JSON report.
    #[command(
        after_help = "Examples:\n  tsscope ts summary capture.ts -o report.json\n  tsscope ts summary capture.ts --stdout --start 0 --end 18800 --pretty"
    )]
    Summary {
        /// Path (or glob pattern) of the input file
        input: PathBuf,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// First byte position of the range
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        start: i64,

        /// Last byte position of the range (default: end of file)
        #[arg(long, allow_negative_numbers = true)]
        end: Option<i64>,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RoundArg {
    Down,
    Up,
    Inc,
}

impl From<RoundArg> for RoundMode {
    fn from(arg: RoundArg) -> Self {
        match arg {
            RoundArg::Down => RoundMode::Down,
            RoundArg::Up => RoundMode::Up,
            RoundArg::Inc => RoundMode::Inc,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Ts { command } => match command {
            TsCommands::Probe { input, quiet } => cmd_ts_probe(input, quiet),
            TsCommands::Packet {
                input,
                position,
                round,
                pretty,
            } => cmd_ts_packet(input, position, round, pretty),
            TsCommands::Summary {
                input,
                report,
                stdout,
                start,
                end,
                pretty,
                compact,
                quiet,
            } => cmd_ts_summary(
                input,
                report,
                stdout,
                ScanRange::new(start, end),
                pretty,
                compact,
                quiet,
            ),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

/// `RUST_LOG` wins over `-v` when set.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

impl From<StreamError> for CliError {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::UnsupportedFormat { source_name } => CliError::new(
                format!("not an MPEG transport stream: {source_name}"),
                Some(INPUT_HINT.to_string()),
            ),
            StreamError::Source(err) => CliError::new(format!("read failed: {err}"), None),
        }
    }
}

impl From<AnalysisError> for CliError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Stream(err) => err.into(),
            AnalysisError::Source(err) => CliError::new(format!("read failed: {err}"), None),
        }
    }
}

fn cmd_ts_probe(input: PathBuf, quiet: bool) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&input)?;
    validate_input_file(&resolved_input)?;

    let mut source = FileByteSource::open(&resolved_input)
        .with_context(|| format!("Failed to open input file: {}", resolved_input.display()))?;
    let is_ts = TransportStream::probe(&mut source)
        .with_context(|| format!("Failed to read input file: {}", resolved_input.display()))?;
    source.close().context("Failed to close input file")?;

    if !is_ts {
        return Err(CliError::new(
            format!("not an MPEG transport stream: {}", resolved_input.display()),
            Some(INPUT_HINT.to_string()),
        ));
    }
    if !quiet {
        println!("OK: {} is a transport stream", resolved_input.display());
    }
    Ok(())
}

fn cmd_ts_packet(
    input: PathBuf,
    position: i64,
    round: Option<RoundArg>,
    pretty: bool,
) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&input)?;
    validate_input_file(&resolved_input)?;

    let source = FileByteSource::open(&resolved_input)
        .with_context(|| format!("Failed to open input file: {}", resolved_input.display()))?;
    let mut stream = TransportStream::open(source)?;
    let position = match round {
        Some(mode) => {
            let rounded = stream.round(position, mode.into());
            debug!("position {position} rounded to {rounded}");
            rounded
        }
        None => position,
    };

    let packet = stream
        .packet_at(position)
        .with_context(|| format!("Failed to read packet at {position}"))?;
    stream.close().context("Failed to close input file")?;
    let packet = packet.ok_or_else(|| {
        CliError::new(
            format!("no packet at position {position}"),
            Some("positions must be packet starts inside the file; try --round down".to_string()),
        )
    })?;
    let json = to_json(&tsscope_core::describe_packet(&packet), pretty)?;
    println!("{json}");
    Ok(())
}

fn cmd_ts_summary(
    input: PathBuf,
    report: Option<PathBuf>,
    stdout: bool,
    range: ScanRange,
    pretty: bool,
    compact: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;
    let report = if stdout {
        None
    } else {
        Some(report.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };

    if let Some(report_path) = report.as_ref() {
        ensure_distinct_output(report_path, &input_abs)?;
    }

    let rep = tsscope_core::summarize_file(&resolved_input, range)?;
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    let json = to_json(&rep, pretty)?;

    let Some(report) = report else {
        print!("{}", json);
        return Ok(());
    };
    if let Some(parent) = report.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    fs::write(&report, json)
        .with_context(|| format!("Failed to write report: {}", report.display()))?;

    if !quiet {
        eprintln!("OK: report written -> {}", report.display());
    }
    Ok(())
}

fn ensure_distinct_output(report_path: &Path, input_abs: &Path) -> Result<(), CliError> {
    let report_dir = report_path
        .parent()
        .map(|parent| {
            if parent.as_os_str().is_empty() {
                fs::canonicalize(".")
            } else {
                fs::canonicalize(parent)
            }
        })
        .transpose()
        .with_context(|| format!("Failed to resolve output path: {}", report_path.display()))?;
    let Some(report_dir) = report_dir else {
        return Ok(());
    };
    let report_target = report_dir.join(
        report_path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Invalid report path"))?,
    );
    if report_target == input_abs {
        return Err(CliError::new(
            format!(
                "report path must differ from input: {}",
                report_path.display()
            ),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, CliError> {
    if pretty {
        serde_json::to_string_pretty(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some(INPUT_HINT.to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some(INPUT_HINT.to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    if matches.len() > 1 {
        let hint = "pass a single stream file, or run once per file".to_string();
        let mut message = format!(
            "multiple files match pattern '{}' ({} matches)",
            pattern,
            matches.len()
        );
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>();
        message.push_str("; matches: ");
        message.push_str(&listed.join(", "));
        if matches.len() > 3 {
            message.push_str(", ...");
        }
        return Err(CliError::new(message, Some(hint)));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
