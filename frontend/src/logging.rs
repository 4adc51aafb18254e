//! Browser-console logging.
//!
//! The core logs through `tracing`; [`init`] installs a `tracing-subscriber`
//! fmt subscriber whose writer forwards each formatted line to the matching
//! `console.*` method so DevTools level filtering keeps working.  Timestamps
//! are left to the console itself (wasm32-unknown-unknown has no system
//! clock for the fmt timer).

use std::io;

use tracing::level_filters::LevelFilter;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    pub max_level: LevelFilter,
    /// Prefix lines with the module path.
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            max_level: if cfg!(debug_assertions) {
                LevelFilter::DEBUG
            } else {
                LevelFilter::INFO
            },
            with_target: true,
        }
    }
}

impl LogConfig {
    /// Accepts `"off"`, `"error"` … `"trace"`; anything else keeps the default.
    pub fn with_level_str(mut self, level: &str) -> Self {
        if let Ok(parsed) = level.trim().parse::<LevelFilter>() {
            self.max_level = parsed;
        }
        self
    }

    /// Default config adjusted by the build-time `LOG_LEVEL` variable.
    pub fn from_env() -> Self {
        match option_env!("LOG_LEVEL") {
            Some(level) => Self::default().with_level_str(level),
            None => Self::default(),
        }
    }
}

/// Install the console subscriber.  The subscriber is global for the life
/// of the page: a second call is ignored.
pub fn init(config: LogConfig) {
    let subscriber = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .with_max_level(config.max_level)
        .with_target(config.with_target)
        .without_time()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("console logger already installed");
    }
}

// ---------------------------------------------------------------------------
// Writer plumbing
// ---------------------------------------------------------------------------

struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(*meta.level())
    }
}

/// Buffers one formatted event and flushes it to the console on drop.
struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl ConsoleWriter {
    fn new(level: Level) -> Self {
        Self {
            level,
            buf: Vec::with_capacity(128),
        }
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
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
        let text = String::from_utf8_lossy(&self.buf);
        let line = JsValue::from_str(text.trim_end());
        match self.level {
            Level::ERROR => web_sys::console::error_1(&line),
            Level::WARN => web_sys::console::warn_1(&line),
            Level::INFO => web_sys::console::info_1(&line),
            _ => web_sys::console::debug_1(&line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_string_overrides_default() {
        let config = LogConfig::default().with_level_str("warn");
        assert_eq!(config.max_level, LevelFilter::WARN);
        let config = LogConfig::default().with_level_str(" TRACE ");
        assert_eq!(config.max_level, LevelFilter::TRACE);
    }

    #[test]
    fn unknown_level_keeps_default() {
        let config = LogConfig::default().with_level_str("chatty");
        assert_eq!(config.max_level, LogConfig::default().max_level);
        assert!(config.with_target);
    }
}
