//! Deck input source: file path or stdin pipe.

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use anyhow::Context;

/// Where the deck Markdown comes from.
pub enum InputSource {
    File(PathBuf),
    Stdin,
}

impl InputSource {
    /// Pick the source from the CLI argument (`-` or a pipe means stdin).
    pub fn from_arg(input: Option<PathBuf>) -> Option<Self> {
        if is_stdin_input(input.as_deref()) {
            return Some(InputSource::Stdin);
        }
        input.map(InputSource::File)
    }

    /// Display name for the status bar.
    pub fn display_name(&self) -> &str {
        match self {
            InputSource::File(path) => path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown"),
            InputSource::Stdin => "<stdin>",
        }
    }

    /// Read the whole deck (blocking).
    pub fn read_to_string(&self) -> anyhow::Result<String> {
        match self {
            InputSource::File(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display())),
            InputSource::Stdin => read_stdin_to_string().context("failed to read stdin"),
        }
    }
}

/// Detect whether the given CLI input argument represents stdin.
///
/// Returns `true` if input is `Some("-")`, or if input is `None` and stdin is not a terminal.
pub fn is_stdin_input(input: Option<&Path>) -> bool {
    match input {
        Some(p) => p.as_os_str() == "-",
        None => !io::stdin().is_terminal(),
    }
}

/// Read all of stdin to a string.
pub fn read_stdin_to_string() -> io::Result<String> {
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
