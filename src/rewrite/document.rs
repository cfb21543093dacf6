//! In-memory snapshot of a line-oriented config file.
//!
//! Lines are split on `\n`; a `\r` before the break is remembered per
//! line rather than kept in the text, so a file mixing LF and CRLF
//! still yields clean values and `render(parse(text)) == text` for any
//! input.

use std::path::Path;

use super::entry::{extract_entries, ConfigEntry};
use crate::errors::Result;
use crate::files;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }

    /// CRLF if the first line break in `text` is `\r\n`.
    fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(i) if i > 0 && text.as_bytes()[i - 1] == b'\r' => Self::CrLf,
            _ => Self::Lf,
        }
    }
}

/// Where `ConfigDocument::set` put a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineUpdate {
    Replaced(usize),
    Appended(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    lines: Vec<String>,
    /// `carriage_returns[i]` is true when line `i` ended in `\r`.
    carriage_returns: Vec<bool>,
    /// Ending used for appended lines.
    ending: LineEnding,
    trailing_newline: bool,
}

impl ConfigDocument {
    /// Split `text` into lines.
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }

        let (body, trailing_newline) = match text.strip_suffix('\n') {
            Some(body) => (body, true),
            None => (text, false),
        };

        let mut lines = Vec::new();
        let mut carriage_returns = Vec::new();
        for raw in body.split('\n') {
            match raw.strip_suffix('\r') {
                Some(line) => {
                    lines.push(line.to_string());
                    carriage_returns.push(true);
                }
                None => {
                    lines.push(raw.to_string());
                    carriage_returns.push(false);
                }
            }
        }

        Self {
            lines,
            carriage_returns,
            ending: LineEnding::detect(text),
            trailing_newline,
        }
    }

    /// Join the lines back together, each with its own ending.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let last = self.lines.len().saturating_sub(1);
        for (i, (line, cr)) in self.lines.iter().zip(&self.carriage_returns).enumerate() {
            out.push_str(line);
            if *cr {
                out.push('\r');
            }
            if i < last || self.trailing_newline {
                out.push('\n');
            }
        }
        out
    }

    /// Read and parse the file at `path`.
    pub async fn load(path: &Path) -> Result<Self> {
        let text = files::read_text(path).await?;
        Ok(Self::parse(&text))
    }

    /// Write the whole document to `path` in a single atomic write.
    pub async fn save(&self, path: &Path) -> Result<()> {
        files::write_atomic(path, &self.render()).await
    }

    /// Line contents without their endings.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_ending(&self) -> LineEnding {
        self.ending
    }

    /// All `KEY=VALUE` entries, in file order.
    pub fn entries(&self) -> Vec<ConfigEntry> {
        extract_entries(&self.lines)
    }

    /// Index of the first line starting with exactly `KEY=`.
    pub fn find_key(&self, key: &str) -> Option<usize> {
        let prefix = format!("{key}=");
        self.lines.iter().position(|line| line.starts_with(&prefix))
    }

    /// Replace the first `KEY=` line with `KEY=value`, or append it.
    pub fn set(&mut self, key: &str, value: &str) -> LineUpdate {
        match self.find_key(key) {
            Some(index) => {
                self.lines[index] = format!("{key}={value}");
                LineUpdate::Replaced(index)
            }
            None => self.append(format!("{key}={value}")),
        }
    }

    /// Rewrite line `index` as `KEY=value`.
    ///
    /// Falls back to `set` when that line no longer holds `KEY=`.
    pub fn set_line(&mut self, index: usize, key: &str, value: &str) -> LineUpdate {
        let prefix = format!("{key}=");
        match self.lines.get_mut(index) {
            Some(line) if line.starts_with(&prefix) => {
                *line = format!("{prefix}{value}");
                LineUpdate::Replaced(index)
            }
            _ => self.set(key, value),
        }
    }

    fn append(&mut self, line: String) -> LineUpdate {
        let crlf = self.ending == LineEnding::CrLf;
        // The old last line gains a break, which must match the file.
        if !self.trailing_newline {
            if let Some(cr) = self.carriage_returns.last_mut() {
                *cr = crlf;
            }
        }
        self.lines.push(line);
        self.carriage_returns.push(crlf && self.trailing_newline);
        LineUpdate::Appended(self.lines.len() - 1)
    }
}
