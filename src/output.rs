//! # Summary Styling
//!
//! The run summary marks each line with a [`Status`]. On capable terminals the
//! marker is an emoji; everywhere else it is a bracketed word (`[OK]`,
//! `[FAILED]`) so the summary stays greppable in CI logs.
//!
//! `--color=auto` honours `NO_COLOR`, `CLICOLOR=0`, `CLICOLOR_FORCE` and
//! `TERM=dumb` before falling back to terminal detection.

use std::env;
use std::fmt;

/// Kind of a summary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Fetching,
    Ok,
    Failed,
    Warn,
}

impl Status {
    fn emoji(self) -> &'static str {
        match self {
            Status::Fetching => "📥",
            Status::Ok => "✅",
            Status::Failed => "❌",
            Status::Warn => "⚠️",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Status::Fetching => "[FETCH]",
            Status::Ok => "[OK]",
            Status::Failed => "[FAILED]",
            Status::Warn => "[WARN]",
        }
    }
}

/// How summary lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    styled: bool,
}

impl OutputConfig {
    /// Resolves `--color` (`always`, `never` or `auto`) against the process
    /// environment and stdout.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let var = |key: &str| env::var_os(key).map(|v| v.to_string_lossy().into_owned());
        let styled = styled_for(color_flag, var, || {
            console::Term::stdout().features().colors_supported()
        });
        Self { styled }
    }

    /// Renders `message` behind the marker for `status`.
    pub fn line(&self, status: Status, message: impl fmt::Display) -> String {
        let marker = if self.styled {
            status.emoji()
        } else {
            status.label()
        };
        format!("{} {}", marker, message)
    }
}

/// Decides styling from the flag, an environment lookup and a terminal probe.
fn styled_for(
    color_flag: &str,
    var: impl Fn(&str) -> Option<String>,
    terminal_supports_color: impl FnOnce() -> bool,
) -> bool {
    match color_flag.to_lowercase().as_str() {
        "always" => return true,
        "never" => return false,
        _ => {}
    }

    // Presence alone disables, even when empty (https://no-color.org/)
    if var("NO_COLOR").is_some() {
        return false;
    }
    if var("CLICOLOR").is_some_and(|v| v == "0") {
        return false;
    }
    if var("CLICOLOR_FORCE").is_some_and(|v| !v.is_empty() && v != "0") {
        return true;
    }
    if var("TERM").is_some_and(|v| v == "dumb") {
        return false;
    }
    terminal_supports_color()
}
