// src/process/filter.rs

//! Pluggable filters deciding which output lines reach a process log.
//!
//! The default drops lines that start with an ANSI escape sequence, which is
//! what interactive console tools emit for cursor/progress redraws. Tools that
//! colour their regular output should use [`AcceptAll`] instead.

use std::fmt::Debug;

use regex::Regex;

/// Decides whether a line read from a child process is kept.
pub trait LineFilter: Send + Sync + Debug {
    fn accepts(&self, line: &str) -> bool;
}

/// Keep every line.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl LineFilter for AcceptAll {
    fn accepts(&self, _line: &str) -> bool {
        true
    }
}

/// Drop lines beginning with ESC (`\x1b`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiEscapeFilter;

impl LineFilter for AnsiEscapeFilter {
    fn accepts(&self, line: &str) -> bool {
        !line.starts_with('\x1b')
    }
}

/// Drop lines matching a user-supplied regex.
#[derive(Debug, Clone)]
pub struct RegexDropFilter {
    pattern: Regex,
}

impl RegexDropFilter {
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }
}

impl LineFilter for RegexDropFilter {
    fn accepts(&self, line: &str) -> bool {
        !self.pattern.is_match(line)
    }
}
