use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::Subscriber;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt};

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Per-target log levels, read from a JSON object like
/// `{ "intake": "debug", "tower_http": "warn" }`.
#[derive(Debug, Clone)]
pub struct LoggerTargets {
    directives: Vec<Directive>,
}

impl LoggerTargets {
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        crate::serde::load_json_from_file(path)
    }

    pub fn build_filter(&self) -> EnvFilter {
        self.directives
            .iter()
            .cloned()
            .fold(EnvFilter::default(), EnvFilter::add_directive)
    }
}

impl<'de> Deserialize<'de> for LoggerTargets {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let targets = BTreeMap::<String, String>::deserialize(deserializer)?;
        let directives = targets
            .into_iter()
            .map(|(target, level)| format!("{target}={level}").parse::<Directive>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(serde::de::Error::custom)?;
        Ok(Self { directives })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    pub outputs: Vec<LoggerOutput>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            outputs: vec![LoggerOutput::Stderr(LoggerStderrOutput::default())],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable on stderr, JSON in files.
    #[default]
    Auto,
    Human,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LoggerOutput {
    Stderr(LoggerStderrOutput),
    File(LoggerFileOutput),
}

impl LoggerOutput {
    pub fn as_layer<S>(&self) -> Result<BoxedLayer<S>>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        match self {
            Self::Stderr(stderr) => Ok(stderr.as_layer()),
            Self::File(file) => file.as_layer(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct LoggerStderrOutput {
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggerStderrOutput {
    pub fn as_layer<S>(&self) -> BoxedLayer<S>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        match self.format {
            LogFormat::Json => tracing_stackdriver::layer()
                .with_writer(std::io::stderr)
                .boxed(),
            LogFormat::Human | LogFormat::Auto => {
                let layer = fmt::layer().with_writer(std::io::stderr);
                if is_systemd_child() {
                    layer.without_time().with_ansi(false).boxed()
                } else {
                    layer.with_ansi(std::io::stderr().is_terminal()).boxed()
                }
            }
        }
    }
}

/// Hourly rotated log files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerFileOutput {
    pub dir: PathBuf,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default = "log_file_prefix")]
    pub file_prefix: String,
    #[serde(default = "max_log_files")]
    pub max_files: NonZeroUsize,
}

impl LoggerFileOutput {
    pub fn as_layer<S>(&self) -> Result<BoxedLayer<S>>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        let writer = tracing_appender::rolling::Builder::new()
            .rotation(Rotation::HOURLY)
            .filename_prefix(&self.file_prefix)
            .max_log_files(self.max_files.get())
            .build(&self.dir)
            .with_context(|| format!("failed to open log dir {}", self.dir.display()))?;

        Ok(match self.format {
            LogFormat::Human => fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .boxed(),
            LogFormat::Json | LogFormat::Auto => {
                tracing_stackdriver::layer().with_writer(writer).boxed()
            }
        })
    }
}

fn log_file_prefix() -> String {
    "intake.log".to_owned()
}

fn max_log_files() -> NonZeroUsize {
    NonZeroUsize::new(24).unwrap_or(NonZeroUsize::MIN)
}

pub fn is_systemd_child() -> bool {
    #[cfg(target_os = "linux")]
    {
        // SAFETY: `getppid` is always successful and has no side effects.
        let ppid = unsafe { libc::getppid() };
        ppid == 1 || std::env::var_os("SYSTEMD_EXEC_PID").is_some()
    }

    #[cfg(not(target_os = "linux"))]
    {
        false
    }
}

/// Installs the global subscriber.
///
/// Levels come from the `logger_targets` file when given, otherwise from
/// `RUST_LOG` with `info` as the fallback. Fails on a second call.
pub fn init_logger(config: &LoggerConfig, logger_targets: Option<&Path>) -> Result<()> {
    use tracing_subscriber::layer::SubscriberExt;

    static INITIALIZED: AtomicBool = AtomicBool::new(false);
    if INITIALIZED.swap(true, Ordering::AcqRel) {
        anyhow::bail!("logger was already initialized");
    }

    let filter = match logger_targets {
        Some(path) => LoggerTargets::load_from(path)
            .context("failed to load logger targets")?
            .build_filter(),
        None => EnvFilter::builder()
            .with_default_directive(tracing::Level::INFO.into())
            .from_env_lossy(),
    };

    let outputs = config
        .outputs
        .iter()
        .map(LoggerOutput::as_layer)
        .collect::<Result<Vec<_>>>()?;

    let subscriber = tracing_subscriber::registry().with(filter).with(outputs);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Logs panics through `tracing` and terminates the process.
pub fn set_abort_with_tracing() {
    std::panic::set_hook(Box::new(|info| {
        use std::io::Write;

        let backtrace = std::backtrace::Backtrace::force_capture();
        tracing::error!("panic: {info}\n{backtrace}");

        std::io::stderr().flush().ok();
        std::io::stdout().flush().ok();

        #[allow(clippy::exit)]
        std::process::exit(1);
    }));
}
