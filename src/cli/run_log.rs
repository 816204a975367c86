// Console + run-log tracing setup.
//
// Every command logs to the console. Commands that keep a run log also get a
// plain-text file, truncated at the start of each run, with one
// `[YYYY-MM-DD HH:MM:SS] message` line per event.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Local wall-clock time in brackets, matching the run log's line prefix.
struct BracketedLocalTime;

impl FormatTime for BracketedLocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "[{}]", chrono::Local::now().format(TIMESTAMP_FORMAT))
    }
}

/// A run log file that has been created and given its header line.
pub struct RunLog {
    path: PathBuf,
    file: File,
}

impl RunLog {
    /// Creates (or truncates) `dir/file_name` and writes the header line.
    pub fn start(dir: &Path, file_name: &str, title: &str) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(file_name);
        let mut file = File::create(&path)?;
        writeln!(
            file,
            "[{}] {}",
            chrono::Local::now().format(TIMESTAMP_FORMAT),
            title
        )?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Installs the global subscriber. Call once, before any command runs.
pub fn init_tracing(run_log: Option<RunLog>) {
    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        );

    let file_layer = run_log.map(|log| {
        tracing_subscriber::fmt::layer()
            .with_writer(Mutex::new(log.file))
            .with_ansi(false)
            .with_target(false)
            .with_level(false)
            .with_timer(BracketedLocalTime)
            .with_filter(EnvFilter::new("info"))
    });

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .init();
}
