//! Plain-text result record.

use bootstrap_common::{ResultLevel, ResultRecord};
use owo_colors::OwoColorize as _;

use crate::output::Styles;

/// `[<timestamp>] <LEVEL> - <message>[: <details>]`
#[must_use]
pub fn render(record: &ResultRecord, styles: &Styles) -> String {
    let level_style = match record.level {
        ResultLevel::Debug => styles.success,
        ResultLevel::Warn => styles.error,
    };
    let mut line = format!(
        "{} {} - {}",
        format!("[{}]", record.timestamp).style(styles.dim),
        record.level.style(level_style),
        record.message
    );
    if !record.details.is_empty() {
        line.push_str(": ");
        line.push_str(&record.details);
    }
    line
}
