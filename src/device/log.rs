//! Per-session device log file.
//!
//! A small append-only log kept next to the application, one per opened
//! session. Records below the configured level are dropped. Every record that
//! passes the level check is also emitted as a `tracing` event.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

/// Bytes shown by [`DeviceLog::log_buffer`] before the middle is skipped.
const MAX_BUFFER_DUMP: usize = 250;

/// Severity of a log record. Lower is more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Fatal = 0,
    Error = 1,
    Message = 2,
    Debug = 3,
}

impl LogLevel {
    /// Four-character prefix written in front of each record.
    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Fatal => "FAIL",
            LogLevel::Error => "!ERR",
            LogLevel::Message => " MSG",
            LogLevel::Debug => "DBG",
        }
    }

    /// Level from its numeric value; values above 3 clamp to `Debug`.
    pub fn from_value(value: i32) -> LogLevel {
        match value {
            i32::MIN..=0 => LogLevel::Fatal,
            1 => LogLevel::Error,
            2 => LogLevel::Message,
            _ => LogLevel::Debug,
        }
    }
}

/// Append-only log file.
#[derive(Debug)]
pub struct DeviceLog {
    path: PathBuf,
    file: File,
    level: LogLevel,
    last_message: String,
}

impl DeviceLog {
    /// Open (or create) the log at `path` and write the opening banner.
    pub fn create(path: impl Into<PathBuf>, level: LogLevel) -> io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut log = DeviceLog {
            path,
            file,
            level,
            last_message: String::new(),
        };
        writeln!(
            log.file,
            "########################################### LOG OPENED ({}) ###########################################",
            timestamp()
        )?;
        Ok(log)
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current threshold.
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Change the threshold.
    pub fn set_level(&mut self, level: LogLevel) {
        self.level = level;
    }

    /// Text of the last timestamped record.
    pub fn last_message(&self) -> &str {
        &self.last_message
    }

    /// Write a timestamped record.
    pub fn log(&mut self, level: LogLevel, text: &str) -> io::Result<()> {
        if level > self.level {
            return Ok(());
        }
        emit_tracing(level, text);
        writeln!(self.file, "({}) [{}]: {}", timestamp(), level.prefix(), text)?;
        self.file.flush()?;
        self.last_message = text.to_string();
        Ok(())
    }

    /// Write `text` verbatim, without timestamp, prefix or newline.
    pub fn log_no_time(&mut self, level: LogLevel, text: &str) -> io::Result<()> {
        if level > self.level {
            return Ok(());
        }
        emit_tracing(level, text);
        self.file.write_all(text.as_bytes())?;
        self.file.flush()
    }

    /// Write a hex dump of `data` after a `label` record.
    ///
    /// Large buffers show the head and tail only.
    pub fn log_buffer(&mut self, level: LogLevel, label: &str, data: &[u8]) -> io::Result<()> {
        if level > self.level {
            return Ok(());
        }
        self.log(level, label)?;
        for line in hex_dump(data, MAX_BUFFER_DUMP) {
            writeln!(self.file, "   {}", line)?;
        }
        if data.len() > 64 {
            writeln!(self.file, "   Bytes: {}", data.len())?;
        }
        writeln!(self.file)?;
        self.file.flush()
    }
}

fn timestamp() -> String {
    Local::now().format("%d-%m-%y %H:%M:%S%.3f").to_string()
}

fn emit_tracing(level: LogLevel, text: &str) {
    match level {
        LogLevel::Fatal | LogLevel::Error => tracing::error!(target: "fpdev::device", "{}", text),
        LogLevel::Message => tracing::info!(target: "fpdev::device", "{}", text),
        LogLevel::Debug => tracing::debug!(target: "fpdev::device", "{}", text),
    }
}

/// Format `data` as 32-byte rows of hex followed by a printable transcript.
///
/// When `data` exceeds `show` bytes, only the first and last `show / 2` bytes
/// are rendered with a marker row in between.
fn hex_dump(data: &[u8], show: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let rows: Vec<&[u8]> = data.chunks(32).collect();

    let (head, tail) = if data.len() > show {
        let half_rows = (show / 2).div_ceil(32);
        (half_rows, half_rows)
    } else {
        (rows.len(), 0)
    };

    for row in rows.iter().take(head) {
        lines.push(hex_row(row));
    }
    if tail > 0 && rows.len() > head + tail {
        lines.push("----- DATA SKIPPED -----".to_string());
    }
    if tail > 0 {
        let start = rows.len().saturating_sub(tail).max(head);
        for row in &rows[start..] {
            lines.push(hex_row(row));
        }
    }
    lines
}

fn hex_row(row: &[u8]) -> String {
    let hex: Vec<String> = row.iter().map(|b| format!("{:02x}", b)).collect();
    let ascii: String = row
        .iter()
        .map(|&b| if b > 0x20 && b < 0x80 { b as char } else { '.' })
        .collect();
    format!("{:<96}| {}", hex.join(" "), ascii)
}
