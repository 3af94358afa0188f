use std::cell::RefCell;
use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{Registry, reload};

/// Routes each formatted event to the browser console method of its level.
struct ConsoleMakeWriter;

struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
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

fn console_line(buf: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(buf);
    let line = line.trim_end();
    (!line.is_empty()).then(|| line.to_string())
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let Some(line) = console_line(&self.buf) else {
            return;
        };
        let line = wasm_bindgen::JsValue::from_str(&line);
        match self.level {
            Level::ERROR => web_sys::console::error_1(&line),
            Level::WARN => web_sys::console::warn_1(&line),
            Level::INFO => web_sys::console::info_1(&line),
            _ => web_sys::console::debug_1(&line),
        }
    }
}

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            level: Level::INFO,
            buf: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            level: *meta.level(),
            buf: Vec::new(),
        }
    }
}

thread_local! {
    static LEVEL_HANDLE: RefCell<Option<reload::Handle<LevelFilter, Registry>>> =
        const { RefCell::new(None) };
}

fn level_filter(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}

/// Install the page's tracing subscriber. Safe to call more than once.
pub fn init(verbose: bool) {
    let (filter, handle) = reload::Layer::new(level_filter(verbose));
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(ConsoleMakeWriter)
                .with_ansi(false)
                .without_time()
                .with_target(false),
        )
        .try_init();
    if installed.is_ok() {
        LEVEL_HANDLE.with(|slot| *slot.borrow_mut() = Some(handle));
        tracing::debug!(verbose, "console logging ready");
    }
}

/// Switch between INFO and DEBUG without reloading the page.
pub fn set_verbose(verbose: bool) {
    LEVEL_HANDLE.with(|slot| {
        let Some(handle) = slot.borrow().as_ref().cloned() else {
            return;
        };
        if let Err(e) = handle.modify(|filter| *filter = level_filter(verbose)) {
            web_sys::console::warn_1(&format!("log level not changed: {e}").into());
        }
    });
}

#[cfg(test)]
mod tests {
    use super::{LevelFilter, console_line, level_filter};

    #[test]
    fn verbose_switches_to_debug() {
        assert_eq!(level_filter(true), LevelFilter::DEBUG);
        assert_eq!(level_filter(false), LevelFilter::INFO);
    }

    #[test]
    fn trims_trailing_newline() {
        assert_eq!(
            console_line(b" INFO lurk session started\n").as_deref(),
            Some(" INFO lurk session started")
        );
    }

    #[test]
    fn skips_blank_output() {
        assert_eq!(console_line(b"\n"), None);
        assert_eq!(console_line(b""), None);
    }
}
