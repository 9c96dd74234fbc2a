//! command-line arguments for the `watch` and `hw-info` binaries.

use {
    crate::{Interval, Mode, Refresh},
    anyhow::{Context, anyhow},
    clap::{Args, Parser},
    std::{ffi::OsString, fs::File, path::PathBuf, sync::Mutex},
    tracing_subscriber::EnvFilter,
};

/// runs a command repeatedly, showing its output in place.
#[derive(Debug, Parser)]
#[command(name = "watch", version)]
pub struct WatchArgs {
    #[command(flatten)]
    pub refresh: RefreshArgs,

    /// exit with an error when the command fails, instead of showing the failure.
    #[arg(long)]
    pub strict: bool,

    #[command(flatten)]
    pub log: LogArgs,

    /// the command to run, followed by its arguments.
    #[arg(
        value_name = "COMMAND",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<OsString>,
}

/// shows cpu, memory, and gpu load, refreshed in place.
#[derive(Debug, Parser)]
#[command(name = "hw-info", version)]
pub struct HwInfoArgs {
    #[command(flatten)]
    pub refresh: RefreshArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Debug, Args)]
pub struct RefreshArgs {
    /// seconds between frames.
    #[arg(short = 'n', long = "interval", value_name = "SECONDS", default_value = "1.0")]
    pub interval: Interval,

    /// clear the whole screen before each frame.
    ///
    /// this may flicker, but never leaves stale text behind.
    #[arg(long)]
    pub safe: bool,
}

#[derive(Debug, Args)]
pub struct LogArgs {
    /// append logs to this file. logs are discarded otherwise.
    #[arg(long, env = "PDWN_LOG_FILE", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

// === impl RefreshArgs ===

impl RefreshArgs {
    pub fn refresh(&self) -> Refresh {
        let Self { interval, safe } = *self;
        Refresh::new(interval, Mode::safe(safe))
    }
}

// === impl LogArgs ===

impl LogArgs {
    /// the environment variable holding the log filter.
    pub const FILTER: &str = "PDWN_LOG";
    const DEFAULT_FILTER: &str = "info";

    /// installs the global subscriber, if a log file was given.
    pub fn init(&self) -> anyhow::Result<()> {
        let Some(path) = &self.log_file else {
            return Ok(());
        };

        let file = File::options()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("could not open log file `{}`", path.display()))?;
        let filter = EnvFilter::try_from_env(Self::FILTER).unwrap_or_else(|_| EnvFilter::new(Self::DEFAULT_FILTER));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .try_init()
            .map_err(|error| anyhow!("could not install the logger: {error}"))
    }
}
