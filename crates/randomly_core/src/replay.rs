//! Best-effort replay log.
//!
//! The first write of a [`ReplayLog`] truncates the file and writes a header;
//! every later write appends one line per generator instance:
//!
//! ```text
//! 2026-06-15T10:30:00.123Z | scoped("MyTest#caseA") | seed=42 runStartTime=... locale=en maybeRate=0.125
//! ```
//!
//! I/O failures are logged at `debug` and otherwise ignored; a broken log file
//! never fails a test run.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use tracing::debug;

/// Default location, relative to the working directory.
pub const DEFAULT_REPLAY_PATH: &str = "target/randomly-replay.txt";

#[derive(Debug)]
pub struct ReplayLog {
    path: PathBuf,
    initialized: Mutex<bool>,
}

impl ReplayLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            initialized: Mutex::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry. Never fails; see the module docs.
    pub fn write_entry(&self, scope_label: &str, replay_info: &str, initial_caller: &str) {
        if let Err(err) = self.try_write_entry(scope_label, replay_info, initial_caller) {
            debug!(path = ?self.path, %err, "failed to write replay log");
        }
    }

    fn try_write_entry(
        &self,
        scope_label: &str,
        replay_info: &str,
        initial_caller: &str,
    ) -> io::Result<()> {
        let mut initialized = self
            .initialized
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if !*initialized {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(&self.path, header(initial_caller))?;
            *initialized = true;
        }

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(
            file,
            "{} | {} | {}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            scope_label,
            replay_info
        )
    }
}

fn header(initial_caller: &str) -> String {
    format!(
        "# randomly_core {} - replay info\n\
         # Run started at {} | OS: {} ({})\n\
         # Initial caller: {}\n\
         # Export the settings as RANDOMLY_* variables to reproduce a run.\n\n",
        env!("CARGO_PKG_VERSION"),
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        std::env::consts::OS,
        std::env::consts::ARCH,
        initial_caller,
    )
}
