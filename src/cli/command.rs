use std::path::PathBuf;
use std::sync::LazyLock;

use clap::{Args, Parser as ClapParser, Subcommand, ValueEnum};

static LONG_VERSION: LazyLock<String> = LazyLock::new(|| {
    format!(
        "{} ({})\nrawm {}\nbuilt {}",
        env!("CARGO_PKG_VERSION"),
        option_env!("VERGEN_GIT_DESCRIBE").unwrap_or("unknown"),
        env!("RAWM_VERSION"),
        env!("BUILD_TIMESTAMP"),
    )
});

#[derive(Debug, ClapParser)]
#[command(
    name         = env!("CARGO_PKG_NAME"),
    version      = env!("CARGO_PKG_VERSION"),
    long_version = LONG_VERSION.as_str(),
    about        = "Tools for inspecting and extracting split RAWM camera recordings",
    long_about   = None,
)]
pub struct Cli {
    /// Set the log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Treat warnings as fatal errors (fail on first warning).
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Show progress bars during operations.
    #[arg(long, global = true)]
    pub progress: bool,

    /// Choose an operation to perform.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Diagnostics at or above this level abort the operation.
    pub fn fail_level(&self) -> log::Level {
        if self.strict {
            log::Level::Warn
        } else {
            log::Level::Error
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print recording information
    Info(InfoArgs),

    /// Write the block index as YAML.
    Index(IndexArgs),

    /// Extract raw frames into individual files.
    Extract(ExtractArgs),
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Any chunk of the recording (.RAW, .R00, ...).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

#[derive(Debug, Args)]
pub struct IndexArgs {
    /// Any chunk of the recording (.RAW, .R00, ...).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output YAML file. Defaults to stdout.
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Any chunk of the recording (.RAW, .R00, ...).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output directory for frame files.
    #[arg(long, value_name = "DIR")]
    pub output_path: PathBuf,

    /// First frame to extract.
    #[arg(long, value_name = "INDEX", default_value_t = 0)]
    pub first: usize,

    /// Number of frames to extract. Defaults to all remaining frames.
    #[arg(long, value_name = "N")]
    pub count: Option<usize>,

    /// Also write the encoded MLVI and RAWI headers.
    #[arg(long)]
    pub headers: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Disable logging output.
    Off,
    /// No output except errors.
    Error,
    /// Show warnings and errors.
    Warn,
    /// Show info, warnings and errors (default).
    Info,
    /// Show debug, info, warnings and errors.
    Debug,
    /// Show all log messages including trace.
    Trace,
}

impl LogLevel {
    /// Convert LogLevel to log::LevelFilter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Colorized human-readable text.
    Plain,
    /// Structured JSON per log record.
    Json,
}
