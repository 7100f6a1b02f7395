//! Sentence capture log
//!
//! Records raw receiver traffic (received sentences, commands sent, notes)
//! with local timestamps, either to a file or to a bounded in-memory ring.

use crate::core::protocol::SentenceKind;
use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Capture format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Plain text, one sentence per line
    #[default]
    Text,
    /// Hex dump
    Hex,
    /// CSV with timestamp, direction, kind and text
    Csv,
    /// JSON lines
    #[serde(rename = "jsonl")]
    JsonLines,
}

impl LogFormat {
    /// Get file extension for format
    pub fn extension(&self) -> &'static str {
        match self {
            LogFormat::Text => "log",
            LogFormat::Hex => "hex",
            LogFormat::Csv => "csv",
            LogFormat::JsonLines => "jsonl",
        }
    }

    /// Get name
    pub fn name(&self) -> &'static str {
        match self {
            LogFormat::Text => "Text",
            LogFormat::Hex => "Hex Dump",
            LogFormat::Csv => "CSV",
            LogFormat::JsonLines => "JSON Lines",
        }
    }
}

/// Data direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    /// From the receiver
    Received,
    /// To the receiver
    Sent,
    /// Local annotation
    Info,
}

impl Direction {
    fn tag(self) -> &'static str {
        match self {
            Direction::Received => "RX",
            Direction::Sent => "TX",
            Direction::Info => "##",
        }
    }
}

/// A single captured line
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LogEntry {
    /// Capture time
    pub timestamp: DateTime<Local>,
    /// Traffic direction
    pub direction: Direction,
    /// Sentence kind for received lines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<SentenceKind>,
    /// Raw line bytes without terminator
    pub data: Vec<u8>,
}

impl LogEntry {
    /// Create new entry, stripping the line terminator
    pub fn new(direction: Direction, data: &[u8]) -> Self {
        let end = data
            .iter()
            .rposition(|&b| b != b'\r' && b != b'\n')
            .map_or(0, |i| i + 1);
        Self {
            timestamp: Local::now(),
            direction,
            kind: None,
            data: data[..end].to_vec(),
        }
    }

    /// Tag the entry with its sentence kind
    #[must_use]
    pub fn with_kind(mut self, kind: SentenceKind) -> Self {
        self.kind = Some(kind);
        self
    }

    fn stamp(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
    }

    /// `true` if the payload is printable ASCII
    pub fn is_text(&self) -> bool {
        self.data.iter().all(|&b| (32..127).contains(&b))
    }

    /// Format as text; binary payloads fall back to hex
    pub fn to_text(&self, show_timestamp: bool) -> String {
        if !self.is_text() {
            return self.to_hex(show_timestamp);
        }
        let text = String::from_utf8_lossy(&self.data);
        if show_timestamp {
            format!("[{}] {} {}", self.stamp(), self.direction.tag(), text)
        } else {
            format!("{} {}", self.direction.tag(), text)
        }
    }

    /// Format as hex
    pub fn to_hex(&self, show_timestamp: bool) -> String {
        let hex = hex::encode_upper(&self.data);
        if show_timestamp {
            format!("[{}] {} {}", self.stamp(), self.direction.tag(), hex)
        } else {
            format!("{} {}", self.direction.tag(), hex)
        }
    }

    /// Format as CSV
    pub fn to_csv(&self) -> String {
        let kind = self.kind.map_or("", SentenceKind::name);
        let text = String::from_utf8_lossy(&self.data).replace('"', "\"\"");
        format!(
            "\"{}\",\"{}\",\"{}\",\"{}\"",
            self.stamp(),
            self.direction.tag(),
            kind,
            text
        )
    }

    /// Format as JSON line
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Render in `format`
    pub fn render(&self, format: LogFormat, show_timestamp: bool) -> String {
        match format {
            LogFormat::Text => self.to_text(show_timestamp),
            LogFormat::Hex => self.to_hex(show_timestamp),
            LogFormat::Csv => self.to_csv(),
            LogFormat::JsonLines => self.to_json(),
        }
    }
}

const CSV_HEADER: &str = "Timestamp,Direction,Kind,Sentence";

/// Receiver traffic logger
pub struct SentenceLogger {
    file: Option<BufWriter<File>>,
    format: LogFormat,
    path: Option<PathBuf>,
    timestamps: bool,
    buffer: VecDeque<LogEntry>,
    max_buffer: usize,
    lines_logged: usize,
}

impl Default for SentenceLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl SentenceLogger {
    /// In-memory logger, not writing to a file yet
    pub fn new() -> Self {
        Self {
            file: None,
            format: LogFormat::Text,
            path: None,
            timestamps: true,
            buffer: VecDeque::new(),
            max_buffer: 1000,
            lines_logged: 0,
        }
    }

    /// Logger that appends to `path` right away
    pub fn to_file(path: &Path, format: LogFormat) -> io::Result<Self> {
        let mut logger = Self::new();
        logger.start(path.to_path_buf(), format)?;
        Ok(logger)
    }

    /// Start appending to a file
    pub fn start(&mut self, path: PathBuf, format: LogFormat) -> io::Result<()> {
        let fresh = std::fs::metadata(&path).map_or(true, |m| m.len() == 0);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = BufWriter::new(file);

        if format == LogFormat::Csv && fresh {
            writeln!(writer, "{CSV_HEADER}")?;
        }

        self.file = Some(writer);
        self.format = format;
        self.path = Some(path);
        self.lines_logged = 0;
        Ok(())
    }

    /// Stop logging to file
    pub fn stop(&mut self) {
        if let Some(ref mut file) = self.file {
            let _ = file.flush();
        }
        self.file = None;
    }

    /// Is currently logging to a file
    pub fn is_logging(&self) -> bool {
        self.file.is_some()
    }

    /// Get log path
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Record one entry
    pub fn log(&mut self, entry: LogEntry) {
        if let Some(ref mut file) = self.file {
            let line = entry.render(self.format, self.timestamps);
            if let Err(e) = writeln!(file, "{line}") {
                tracing::warn!("capture log write failed: {}", e);
            }
            self.lines_logged += 1;
            if self.lines_logged % 100 == 0 {
                let _ = file.flush();
            }
        }

        self.buffer.push_back(entry);
        while self.buffer.len() > self.max_buffer {
            self.buffer.pop_front();
        }
    }

    /// Log a received sentence
    pub fn log_rx(&mut self, line: &str, kind: SentenceKind) {
        self.log(LogEntry::new(Direction::Received, line.as_bytes()).with_kind(kind));
    }

    /// Log bytes sent to the receiver
    pub fn log_tx(&mut self, data: &[u8]) {
        self.log(LogEntry::new(Direction::Sent, data));
    }

    /// Log info message
    pub fn log_info(&mut self, message: &str) {
        self.log(LogEntry::new(Direction::Info, message.as_bytes()));
    }

    /// Entries kept in memory
    pub fn buffer(&self) -> impl Iterator<Item = &LogEntry> {
        self.buffer.iter()
    }

    /// Lines written to the file since `start`
    pub fn lines_logged(&self) -> usize {
        self.lines_logged
    }

    /// Export the in-memory ring in `format`
    pub fn export_buffer(&self, format: LogFormat) -> String {
        let mut result = String::new();
        if format == LogFormat::Csv {
            result.push_str(CSV_HEADER);
            result.push('\n');
        }
        for entry in &self.buffer {
            result.push_str(&entry.render(format, true));
            result.push('\n');
        }
        result
    }

    /// Set timestamp display
    pub fn set_timestamps(&mut self, show: bool) {
        self.timestamps = show;
    }

    /// Set max buffer size
    pub fn set_max_buffer(&mut self, size: usize) {
        self.max_buffer = size;
    }

    /// Flush to disk
    pub fn flush(&mut self) {
        if let Some(ref mut file) = self.file {
            let _ = file.flush();
        }
    }
}

impl Drop for SentenceLogger {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Generate log filename with timestamp
pub fn generate_log_filename(prefix: &str, format: LogFormat) -> String {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    format!("{}_{}.{}", prefix, timestamp, format.extension())
}
