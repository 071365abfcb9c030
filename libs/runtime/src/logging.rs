use crate::config::{LoggingConfig, Section};
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{level_filters::LevelFilter, Level};
use tracing_subscriber::{
    filter::{FilterFn, Targets},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer, Registry,
};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

const DEFAULT_MAX_SIZE_MB: u64 = 100;

fn parse_tracing_level(s: &str) -> Option<Level> {
    match s.to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        "off" | "none" => None,
        _ => Some(Level::INFO),
    }
}

/// True if target == subsystem or target starts with "subsystem::".
fn matches_subsystem(target: &str, subsystem: &str) -> bool {
    target == subsystem
        || (target.starts_with(subsystem) && target[subsystem.len()..].starts_with("::"))
}

type CatchAllFilter = FilterFn<Box<dyn Fn(&tracing::Metadata<'_>) -> bool + Send + Sync>>;

/// Filter for the "default" section: everything not claimed by an explicit subsystem.
fn catch_all_filter(claimed: &[String], max_level: Level) -> CatchAllFilter {
    let claimed = claimed.to_vec();
    FilterFn::new(Box::new(move |meta: &tracing::Metadata<'_>| {
        let target = meta.target();
        !claimed.iter().any(|s| matches_subsystem(target, s)) && meta.level() <= &max_level
    }))
}

// -------- rotating file writers --------

#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendTimestamp>>>);

struct RoutedWriter(Option<RotWriter>);

impl Write for RoutedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &self.0 {
            Some(w) => w.0.lock().write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &self.0 {
            Some(w) => w.0.lock().flush(),
            None => Ok(()),
        }
    }
}

/// Routes records to per-subsystem files by target prefix, falling back to the default file.
#[derive(Clone, Default)]
struct FileRouter {
    default: Option<RotWriter>,
    by_subsystem: HashMap<String, RotWriter>,
}

impl FileRouter {
    fn resolve_for(&self, target: &str) -> Option<RotWriter> {
        self.by_subsystem
            .iter()
            .find(|(name, _)| matches_subsystem(target, name))
            .map(|(_, w)| w.clone())
            .or_else(|| self.default.clone())
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_subsystem.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = RoutedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RoutedWriter(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        RoutedWriter(self.resolve_for(meta.target()))
    }
}

/// Relative log paths live under `base_dir` (the server home_dir).
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn open_rotating_writer(log_path: &Path, section: &Section) -> std::io::Result<RotWriter> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let limit = match section.max_backups {
        Some(n) if n > 0 => FileLimit::MaxFiles(n),
        _ => FileLimit::Age(chrono::Duration::days(i64::from(
            section.max_age_days.unwrap_or(1),
        ))),
    };

    let rot = FileRotate::new(
        log_path,
        AppendTimestamp::default(limit),
        ContentLimit::BytesSurpassed(max_bytes as usize),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    Ok(RotWriter(Arc::new(Mutex::new(rot))))
}

fn writer_for_section(name: &str, section: &Section, base_dir: &Path) -> Option<RotWriter> {
    if section.file.trim().is_empty() {
        return None;
    }
    let path = resolve_log_path(&section.file, base_dir);
    match open_rotating_writer(&path, section) {
        Ok(w) => Some(w),
        Err(e) => {
            eprintln!(
                "Failed to open log file for '{}': {} ({})",
                name,
                path.display(),
                e
            );
            None
        }
    }
}

// -------- public init --------

/// Install the global subscriber from `cfg`.
///
/// The `"default"` section covers every target not claimed by another section;
/// other keys are target prefixes (e.g. `health_analytics::ingest`). Console output
/// is human readable, files get JSON lines. Relative file paths resolve against `base_dir`.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // Bridge `log` → `tracing` before installing the subscriber
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        init_default_logging();
        return;
    }

    let default_section = cfg.get("default");
    let subsystems: Vec<(&String, &Section)> =
        cfg.iter().filter(|(k, _)| k.as_str() != "default").collect();
    let claimed: Vec<String> = subsystems.iter().map(|(k, _)| (*k).clone()).collect();

    let mut console_targets = Targets::new().with_default(LevelFilter::OFF);
    let mut file_targets = Targets::new().with_default(LevelFilter::OFF);
    let mut router = FileRouter::default();

    for (name, section) in &subsystems {
        if let Some(level) = parse_tracing_level(&section.console_level) {
            console_targets = console_targets.with_target((*name).clone(), level);
        }
        if let Some(writer) = writer_for_section(name, section, base_dir) {
            router.by_subsystem.insert((*name).clone(), writer);
            if let Some(level) = parse_tracing_level(&section.file_level) {
                file_targets = file_targets.with_target((*name).clone(), level);
            }
        }
    }
    if let Some(section) = default_section {
        router.default = writer_for_section("default", section, base_dir);
    }

    let ansi = std::io::stdout().is_terminal();
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    layers.push(
        fmt::layer()
            .with_ansi(ansi)
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_filter(console_targets)
            .boxed(),
    );

    if !router.is_empty() {
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_writer(router.clone())
                .with_filter(file_targets)
                .boxed(),
        );
    }

    if let Some(section) = default_section {
        if let Some(level) = parse_tracing_level(&section.console_level) {
            layers.push(
                fmt::layer()
                    .with_ansi(ansi)
                    .with_target(true)
                    .with_timer(fmt::time::UtcTime::rfc_3339())
                    .with_filter(catch_all_filter(&claimed, level))
                    .boxed(),
            );
        }
        if router.default.is_some() {
            if let Some(level) = parse_tracing_level(&section.file_level) {
                layers.push(
                    fmt::layer()
                        .json()
                        .with_ansi(false)
                        .with_target(true)
                        .with_timer(fmt::time::UtcTime::rfc_3339())
                        .with_writer(router)
                        .with_filter(catch_all_filter(&claimed, level))
                        .boxed(),
                );
            }
        }
    }

    let _ = Registry::default().with(layers).try_init();
}

fn init_default_logging() {
    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .try_init();
}
