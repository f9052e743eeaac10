//! Operator-facing text for the CLI commands.

use std::fmt::{self, Display};

/// Outcome marker printed in front of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Warn,
    Error,
}

impl Status {
    fn marker(self) -> &'static str {
        match self {
            Self::Ok => "✓",
            Self::Warn => "⚠",
            Self::Error => "✗",
        }
    }
}

/// Print a status line. Errors go to stderr.
pub fn status(status: Status, message: impl Display) {
    let line = format!("{} {message}", status.marker());
    match status {
        Status::Error => eprintln!("{line}"),
        Status::Ok | Status::Warn => println!("{line}"),
    }
}

/// Titled block of label/value rows, aligned on the longest label.
#[derive(Debug, Default)]
pub struct Summary {
    title: String,
    rows: Vec<(String, String)>,
}

impl Summary {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
        }
    }

    #[must_use]
    pub fn row(mut self, label: impl Into<String>, value: impl Display) -> Self {
        self.rows.push((label.into(), value.to_string()));
        self
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "─".repeat(self.title.chars().count().max(width + 12)))?;
        for (label, value) in &self.rows {
            writeln!(f, "{label:<width$}  {value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_aligns_values_on_longest_label() {
        let rendered = Summary::new("Engine")
            .row("URL", "http://127.0.0.1:2375")
            .row("Give up after", "10 failures")
            .to_string();

        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Engine");
        assert_eq!(lines[2], "URL            http://127.0.0.1:2375");
        assert_eq!(lines[3], "Give up after  10 failures");
    }

    #[test]
    fn empty_summary_renders_title_and_rule() {
        let rendered = Summary::new("Watcher").to_string();
        assert_eq!(rendered.lines().count(), 2);
    }
}
