use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use file_rotate::{
    compression::Compression,
    suffix::{AppendCount, AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};
use parking_lot::Mutex;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt;

use crate::config::{LoggingConfig, Section};

const DEFAULT_SECTION: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 100;

/// `"off"`/`"none"` disable output; unknown values fall back to `info`; blank means "inherit".
fn parse_level(raw: &str) -> Option<LevelFilter> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" => None,
        "trace" => Some(LevelFilter::TRACE),
        "debug" => Some(LevelFilter::DEBUG),
        "info" => Some(LevelFilter::INFO),
        "warn" | "warning" => Some(LevelFilter::WARN),
        "error" => Some(LevelFilter::ERROR),
        "off" | "none" => Some(LevelFilter::OFF),
        _ => Some(LevelFilter::INFO),
    }
}

/// `target == name` or `target` starts with `name::`.
fn matches_crate_prefix(target: &str, name: &str) -> bool {
    target
        .strip_prefix(name)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

fn subsystems(cfg: &LoggingConfig) -> impl Iterator<Item = (&str, &Section)> {
    cfg.iter()
        .filter(|(name, _)| name.as_str() != DEFAULT_SECTION)
        .map(|(name, section)| (name.as_str(), section))
}

fn console_targets(cfg: &LoggingConfig) -> Targets {
    let default = cfg
        .get(DEFAULT_SECTION)
        .and_then(|s| parse_level(&s.console_level))
        .unwrap_or(LevelFilter::INFO);
    subsystems(cfg).fold(Targets::new().with_default(default), |targets, (name, s)| {
        match parse_level(&s.console_level) {
            Some(level) => targets.with_target(name, level),
            None => targets,
        }
    })
}

/// Per-target file levels. A subsystem without its own file writes to the default file
/// (when there is one) at its own `file_level`.
fn file_targets(cfg: &LoggingConfig, has_default_file: bool) -> Targets {
    let default = cfg
        .get(DEFAULT_SECTION)
        .filter(|_| has_default_file)
        .and_then(|s| parse_level(&s.file_level))
        .unwrap_or(LevelFilter::OFF);
    subsystems(cfg).fold(Targets::new().with_default(default), |targets, (name, s)| {
        let has_file = !s.file.trim().is_empty();
        let level = match parse_level(&s.file_level) {
            Some(level) if has_file || has_default_file => level,
            None if has_file => LevelFilter::INFO,
            None => return targets,
            Some(_) => LevelFilter::OFF,
        };
        targets.with_target(name, level)
    })
}

/// Relative log paths live under `base_dir` (the server home).
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

enum Rotation {
    Daily(FileRotate<AppendTimestamp>),
    Counted(FileRotate<AppendCount>),
}

impl Write for Rotation {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Rotation::Daily(f) => f.write(buf),
            Rotation::Counted(f) => f.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Rotation::Daily(f) => f.flush(),
            Rotation::Counted(f) => f.flush(),
        }
    }
}

#[derive(Clone)]
struct RotatingFile(Arc<Mutex<Rotation>>);

impl RotatingFile {
    /// `max_backups` set: keep that many numbered files; otherwise timestamped files
    /// for one day.
    fn open(path: &Path, section: &Section) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
        let limit = ContentLimit::BytesSurpassed(usize::try_from(max_bytes).unwrap_or(usize::MAX));
        let rotation = match section.max_backups {
            Some(keep) => Rotation::Counted(FileRotate::new(
                path,
                AppendCount::new(keep),
                limit,
                Compression::None,
                #[cfg(unix)]
                None,
            )),
            None => Rotation::Daily(FileRotate::new(
                path,
                AppendTimestamp::default(FileLimit::Age(chrono::Duration::days(1))),
                limit,
                Compression::None,
                #[cfg(unix)]
                None,
            )),
        };
        Ok(Self(Arc::new(Mutex::new(rotation))))
    }
}

/// Write handle that drops records when no file is routed.
struct RoutedHandle(Option<RotatingFile>);

impl Write for RoutedHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &self.0 {
            Some(file) => file.0.lock().write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &self.0 {
            Some(file) => file.0.lock().flush(),
            None => Ok(()),
        }
    }
}

/// Routes each record to its subsystem file, else the default file.
#[derive(Clone, Default)]
struct FileRouter {
    default: Option<RotatingFile>,
    by_prefix: Vec<(String, RotatingFile)>,
}

impl FileRouter {
    fn build(cfg: &LoggingConfig, base_dir: &Path) -> Self {
        let open = |name: &str, section: &Section| {
            if section.file.trim().is_empty() {
                return None;
            }
            let path = resolve_log_path(&section.file, base_dir);
            match RotatingFile::open(&path, section) {
                Ok(file) => Some(file),
                Err(e) => {
                    eprintln!("failed to open log file '{}' for '{name}': {e}", path.display());
                    None
                }
            }
        };

        let mut by_prefix: Vec<(String, RotatingFile)> = subsystems(cfg)
            .filter_map(|(name, section)| open(name, section).map(|f| (name.to_string(), f)))
            .collect();
        // Longest prefix first so nested subsystems win over their parents.
        by_prefix.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Self {
            default: cfg
                .get(DEFAULT_SECTION)
                .and_then(|section| open(DEFAULT_SECTION, section)),
            by_prefix,
        }
    }

    fn resolve(&self, target: &str) -> Option<RotatingFile> {
        self.by_prefix
            .iter()
            .find(|(prefix, _)| matches_crate_prefix(target, prefix))
            .map(|(_, file)| file.clone())
            .or_else(|| self.default.clone())
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_prefix.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = RoutedHandle;

    fn make_writer(&'a self) -> Self::Writer {
        RoutedHandle(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        RoutedHandle(self.resolve(meta.target()))
    }
}

/// Install the global subscriber.
///
/// Console output is human-readable and filtered per subsystem; file output is JSON,
/// rotated by `file-rotate`. `log` records are bridged into `tracing`. Calling this
/// twice is harmless: the second install is ignored.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

    let _ = tracing_log::LogTracer::init();

    // Console goes to stderr so commands can print results on stdout.
    let ansi = atty::is(atty::Stream::Stderr);
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(console_targets(cfg));

    let router = FileRouter::build(cfg, base_dir);
    if router.is_empty() {
        let _ = Registry::default().with(console).try_init();
        return;
    }

    let targets = file_targets(cfg, router.default.is_some());
    let file = fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_writer(router)
        .with_filter(targets);
    let _ = Registry::default().with(console).with(file).try_init();
}

/// Console-only logging for commands that run before (or without) a config file.
pub fn init_console_logging(level: &str) {
    let mut cfg: LoggingConfig = HashMap::new();
    cfg.insert(
        DEFAULT_SECTION.to_string(),
        Section {
            console_level: level.to_string(),
            file: String::new(),
            file_level: String::new(),
            max_backups: None,
            max_size_mb: None,
        },
    );
    init_logging_from_config(&cfg, Path::new("."));
}
