//! `tracing` output for the browser console.
//!
//! Each formatted event is buffered by a [`ConsoleWriter`] and emitted as one
//! console call when the writer is dropped, routed by level so the browser's
//! own level filter applies (`error`, `warn`, `info`, `debug`). Off the web
//! the same writer goes to stderr, which keeps this module testable natively.

use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Directive used when the configured one does not parse.
pub const FALLBACK_FILTER: &str = "info";

/// Parse a filter directive, falling back to [`FALLBACK_FILTER`].
#[must_use]
pub fn filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|err| {
        tracing::warn!(%directive, %err, "invalid log filter; using default");
        EnvFilter::new(FALLBACK_FILTER)
    })
}

/// Install the global console subscriber. A second call is ignored.
pub fn init(directive: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(directive))
        .with_writer(ConsoleMakeWriter)
        .with_ansi(false)
        .without_time()
        .with_target(true)
        .try_init();
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(*meta.level())
    }
}

/// Buffers one formatted event.
#[derive(Debug)]
pub struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl ConsoleWriter {
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self {
            level,
            buf: Vec::new(),
        }
    }

    /// Buffered text without the trailing newline.
    #[must_use]
    pub fn line(&self) -> String {
        String::from_utf8_lossy(&self.buf).trim_end().to_string()
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        emit(self.level, &self.line());
    }
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, line: &str) {
    use web_sys::console;
    let value = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::ERROR => console::error_1(&value),
        Level::WARN => console::warn_1(&value),
        Level::INFO => console::info_1(&value),
        _ => console::debug_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(level: Level, line: &str) {
    eprintln!("[{level}] {line}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn writer_buffers_until_dropped() {
        let mut w = ConsoleWriter::new(Level::WARN);
        write!(w, "particle canvas ").unwrap();
        writeln!(w, "unavailable").unwrap();
        assert_eq!(w.line(), "particle canvas unavailable");
    }

    #[test]
    fn writer_takes_event_level() {
        let make = ConsoleMakeWriter;
        assert_eq!(make.make_writer().level, Level::INFO);
    }

    #[test]
    fn bad_directive_falls_back() {
        assert_eq!(filter("voors_core=loud").to_string(), FALLBACK_FILTER);
        assert_eq!(filter("voors_core=debug").to_string(), "voors_core=debug");
    }
}
