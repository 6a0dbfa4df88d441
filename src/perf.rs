//! Timing for the render pipeline.
//!
//! With `--perf`, every [`Scope`] adds its elapsed time to a per-name tally
//! and the binary prints [`report`] once rendering is done. With
//! `--render-debug-log`, scopes and ad-hoc events are also appended to a file
//! with a timestamp relative to when the log was opened.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, Mutex};
use std::time::{Duration, Instant};

static ENABLED: AtomicBool = AtomicBool::new(false);
static TALLY: LazyLock<Mutex<BTreeMap<&'static str, ScopeStats>>> =
    LazyLock::new(|| Mutex::new(BTreeMap::new()));
static RENDER_LOG: Mutex<Option<RenderLog>> = Mutex::new(None);

/// Accumulated timings for one scope name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeStats {
    pub calls: u64,
    pub total: Duration,
    pub max: Duration,
}

impl ScopeStats {
    fn record(&mut self, elapsed: Duration) {
        self.calls += 1;
        self.total += elapsed;
        self.max = self.max.max(elapsed);
    }
}

/// Guard timing a named section until dropped.
#[derive(Debug)]
#[must_use = "a scope measures until it is dropped"]
pub struct Scope {
    name: &'static str,
    start: Instant,
}

impl Drop for Scope {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        if is_enabled()
            && let Ok(mut tally) = TALLY.lock()
        {
            tally.entry(self.name).or_default().record(elapsed);
        }
        log_event(
            self.name,
            format!("{:.3} ms", elapsed.as_secs_f64() * 1000.0),
        );
    }
}

#[derive(Debug)]
struct RenderLog {
    opened: Instant,
    writer: BufWriter<File>,
}

pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        start: Instant::now(),
    }
}

/// Snapshot of every scope recorded so far.
pub fn stats() -> Vec<(&'static str, ScopeStats)> {
    TALLY.lock().map_or_else(
        |_| Vec::new(),
        |tally| tally.iter().map(|(name, stats)| (*name, *stats)).collect(),
    )
}

/// One `[perf]` line per scope, slowest total first.
pub fn report() -> Vec<String> {
    let mut stats = stats();
    stats.sort_by(|a, b| b.1.total.cmp(&a.1.total).then(a.0.cmp(b.0)));
    stats
        .into_iter()
        .map(|(name, stats)| {
            let total_ms = stats.total.as_secs_f64() * 1000.0;
            let max_ms = stats.max.as_secs_f64() * 1000.0;
            format!(
                "[perf] {name}: {} calls, {total_ms:.2} ms total, {max_ms:.2} ms max",
                stats.calls
            )
        })
        .collect()
}

/// Open (or with `None`, close) the render debug log at `path`.
pub fn set_debug_log_path(path: Option<&Path>) -> std::io::Result<()> {
    let Ok(mut log) = RENDER_LOG.lock() else {
        return Ok(());
    };
    if let Some(mut previous) = log.take() {
        let _ = previous.writer.flush();
    }
    let Some(path) = path else {
        return Ok(());
    };
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "tidymark render debug log start")?;
    writer.flush()?;
    *log = Some(RenderLog {
        opened: Instant::now(),
        writer,
    });
    Ok(())
}

pub fn is_debug_log_enabled() -> bool {
    RENDER_LOG.lock().is_ok_and(|log| log.is_some())
}

/// Append `name: detail` to the render debug log, if one is open.
pub fn log_event(name: &str, detail: impl AsRef<str>) {
    let Ok(mut log) = RENDER_LOG.lock() else {
        return;
    };
    let Some(log) = log.as_mut() else {
        return;
    };
    let elapsed_ms = log.opened.elapsed().as_secs_f64() * 1000.0;
    let _ = writeln!(
        log.writer,
        "[{elapsed_ms:>10.3} ms] {name}: {}",
        detail.as_ref()
    );
    let _ = log.writer.flush();
}
