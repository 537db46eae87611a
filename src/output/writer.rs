//! Line-oriented recorder writing to stdout or any `Write` sink

use crate::config::RecordFormat;
use crate::output::traits::{PageRecord, RecordResult, Recorder};
use std::io::{self, Write};
use std::sync::Mutex;

/// Writes one line per page that produced at least one value
///
/// - `Text`: `<uri>\t[v1 v2 ...]`
/// - `Json`: one JSON object per line (`uri`, `depth`, `values`)
pub struct LineRecorder<W: Write + Send> {
    format: RecordFormat,
    out: Mutex<W>,
}

impl LineRecorder<io::Stdout> {
    /// Recorder writing to standard output
    pub fn stdout(format: RecordFormat) -> Self {
        Self::new(format, io::stdout())
    }
}

impl<W: Write + Send> LineRecorder<W> {
    pub fn new(format: RecordFormat, out: W) -> Self {
        Self {
            format,
            out: Mutex::new(out),
        }
    }

    /// Returns the underlying writer
    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn format_line(&self, page: &PageRecord) -> RecordResult<String> {
        Ok(match self.format {
            RecordFormat::Text => format!("{}\t[{}]", page.uri, page.values.join(" ")),
            RecordFormat::Json => serde_json::to_string(page)?,
        })
    }
}

impl<W: Write + Send> Recorder for LineRecorder<W> {
    fn record(&self, page: &PageRecord) -> RecordResult<()> {
        if page.values.is_empty() {
            return Ok(());
        }

        let line = self.format_line(page)?;
        let mut out = self
            .out
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        writeln!(out, "{}", line)?;
        Ok(())
    }

    fn finish(&self) -> RecordResult<()> {
        let mut out = self
            .out
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        out.flush()?;
        Ok(())
    }
}
