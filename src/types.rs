use serde::Deserialize;

/// Which output lines are dropped before they reach a process log.
///
/// - `Ansi`: drop lines starting with an ANSI escape sequence (default).
/// - `None`: keep everything.
/// - `Regex`: drop lines matching `[output].drop_pattern`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Ansi,
    #[serde(rename = "none")]
    KeepAll,
    Regex,
}

impl Default for FilterKind {
    fn default() -> Self {
        FilterKind::Ansi
    }
}
