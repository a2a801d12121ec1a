//! Tracing initialization.
//! Builds a subscriber with EnvFilter, supports compact or JSON formats, and optional file logging.
//!
//! Behavior:
//! - Log level is driven by LogLevel (no RUST_LOG override here).
//! - Console logs go to stderr so listings on stdout stay pipeable.
//! - If `log_file` is provided and passes safety checks, a non-blocking file layer is added.
//! - File logging is refused if any ancestor of the file path is a symlink.

use anyhow::Result;
use chrono::Local;
use std::fmt as stdfmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt as tsfmt;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::registry;
use tracing_subscriber::Registry;
use tracing_subscriber::util::SubscriberInitExt;

use unified_fs::output as out;
use unified_fs::{LogLevel, default_log_path, path_has_symlink_ancestor};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Human-friendly timestamp formatter (DD/MM/YY HH:MM:SS)
struct LocalHumanTime;
impl FormatTime for LocalHumanTime {
    fn format_time(&self, w: &mut tsfmt::format::Writer<'_>) -> stdfmt::Result {
        write!(w, "{}", Local::now().format("%d/%m/%y %H:%M:%S"))
    }
}

#[inline]
fn to_level_filter(lvl: &LogLevel) -> LevelFilter {
    match lvl {
        LogLevel::Quiet => LevelFilter::ERROR,
        LogLevel::Normal => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::TRACE,
    }
}

#[inline]
fn env_filter_from_level(level_filter: LevelFilter) -> EnvFilter {
    let level_str = match level_filter {
        LevelFilter::ERROR => "error",
        LevelFilter::WARN => "warn",
        LevelFilter::INFO => "info",
        LevelFilter::DEBUG => "debug",
        LevelFilter::TRACE => "trace",
        _ => "warn",
    };
    EnvFilter::new(level_str)
}

fn fmt_layer<W>(json: bool, ansi: bool, writer: W) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    if json {
        tsfmt::layer()
            .json()
            .with_timer(LocalHumanTime)
            .with_target(true)
            .with_writer(writer)
            .boxed()
    } else {
        tsfmt::layer()
            .compact()
            .with_timer(LocalHumanTime)
            .with_target(true)
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed()
    }
}

fn open_log_append(path: &Path) -> io::Result<File> {
    let mut opts = OpenOptions::new();
    opts.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600).custom_flags(libc::O_NOFOLLOW);
    }
    opts.open(path)
}

/// Try to open a non-blocking file writer for logging:
/// - Refuse if any ancestor is a symlink
/// - Best-effort create parent directory
/// - Open file for append and wrap with non_blocking
fn maybe_open_non_blocking_writer(path: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    match path_has_symlink_ancestor(path) {
        Ok(false) => {}
        Ok(true) => {
            out::print_warn(&format!(
                "Refusing to enable file logging: ancestor of {} is a symlink",
                path.display()
            ));
            return None;
        }
        Err(e) => {
            out::print_warn(&format!("Cannot check log path {} for symlinks: {e}", path.display()));
            return None;
        }
    }

    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    match open_log_append(path) {
        Ok(file) => Some(tracing_appender::non_blocking(file)),
        Err(e) => {
            out::print_warn(&format!("Failed to open log file {}: {e}", path.display()));
            None
        }
    }
}

/// Initialize tracing based on LogLevel and format. Returns an optional WorkerGuard
/// if a file appender is created (must be held until shutdown to flush logs).
pub fn init_tracing(lvl: &LogLevel, log_file: Option<&Path>, json: bool) -> Result<Option<WorkerGuard>> {
    let env_filter = env_filter_from_level(to_level_filter(lvl));
    let console_ansi = atty::is(atty::Stream::Stderr);

    let mut layers: Vec<BoxedLayer> = vec![fmt_layer(json, console_ansi, io::stderr)];
    let mut guard = None;

    if let Some(path) = log_file {
        match maybe_open_non_blocking_writer(path) {
            Some((writer, g)) => {
                layers.push(fmt_layer(json, false, writer));
                guard = Some(g);
            }
            None => {
                if let Some(def) = default_log_path() {
                    out::print_info(&format!(
                        "Logging to the console only. The default log path is {}",
                        def.display()
                    ));
                }
            }
        }
    }

    registry().with(layers).with(env_filter).try_init()?;
    Ok(guard)
}
