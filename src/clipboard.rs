//! Clipboard sinks for the "copy" action.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub trait Clipboard: Send {
    fn copy(&mut self, text: &str) -> io::Result<()>;
}

/// Writes an OSC 52 escape sequence, which most terminal emulators (and tmux
/// with `set-clipboard on`) forward to the system clipboard.
pub struct Osc52Clipboard<W: Write + Send> {
    out: W,
}

impl Osc52Clipboard<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write + Send> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text.as_bytes()))
}

impl<W: Write + Send> Clipboard for Osc52Clipboard<W> {
    fn copy(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(osc52_sequence(text).as_bytes())?;
        self.out.flush()
    }
}

/// Keeps every copied string; clones share the same history.
#[derive(Clone, Default, Debug)]
pub struct MemoryClipboard {
    history: Arc<Mutex<Vec<String>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<String> {
        self.history().pop()
    }
}

impl Clipboard for MemoryClipboard {
    fn copy(&mut self, text: &str) -> io::Result<()> {
        let mut h = self
            .history
            .lock()
            .map_err(|_| io::Error::other("clipboard history poisoned"))?;
        h.push(text.to_string());
        Ok(())
    }
}
