//! Output formatting module
//!
//! A run ends with exactly one result record on stdout, rendered as text or
//! JSON. Diagnostic logging goes to stderr (see [`logging`]).

pub mod json;
pub mod logging;
pub mod styles;
pub mod text;

use std::io::Write as _;

use bootstrap_common::{ResultLevel, ResultRecord};
use clap::ValueEnum;
use console::Term;
pub use styles::Styles;

/// Rendering of the final result record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ResultFormat {
    /// `[timestamp] LEVEL - message: details`
    #[default]
    Text,
    /// Delimiter line followed by one JSON object.
    Json,
}

/// How the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failed,
}

impl Outcome {
    #[must_use]
    pub fn level(self) -> ResultLevel {
        match self {
            Self::Success => ResultLevel::Debug,
            Self::Failed => ResultLevel::Warn,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Failed => "Failed",
        }
    }
}

/// Output context carrying styling and the result format.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    pub format: ResultFormat,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(format: ResultFormat) -> Self {
        let use_colors = format == ResultFormat::Text
            && Term::stdout().is_term()
            && std::env::var("NO_COLOR").is_err();

        let mut styles = Styles::default();
        if use_colors {
            styles.colorize();
        }

        Self { styles, format }
    }

    /// Render the final record for `outcome`.
    #[must_use]
    pub fn render(&self, outcome: Outcome, message: &str, details: &str) -> String {
        let record = ResultRecord::new(outcome.level(), message, details);
        match self.format {
            ResultFormat::Text => text::render(&record, &self.styles),
            ResultFormat::Json => json::render(&record, outcome),
        }
    }

    /// Print the final record to stdout.
    pub fn report(&self, outcome: Outcome, message: &str, details: &str) {
        let rendered = self.render(outcome, message, details);
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{rendered}");
        let _ = stdout.flush();
    }
}
