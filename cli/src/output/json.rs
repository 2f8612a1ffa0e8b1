//! JSON result record.
//!
//! A delimiter line naming the outcome, then one undecorated JSON object:
//!
//! ```text
//! -------------------------Success-------------------------
//! {"timestamp":"...","level":"DEBUG","message":"...","details":"..."}
//! ```

use bootstrap_common::ResultRecord;

use crate::output::Outcome;

const DELIMITER: &str = "-------------------------";

#[must_use]
pub fn delimiter(outcome: Outcome) -> String {
    format!("{DELIMITER}{}{DELIMITER}", outcome.as_str())
}

#[must_use]
pub fn render(record: &ResultRecord, outcome: Outcome) -> String {
    // Only string fields: serialization cannot fail.
    let body = serde_json::to_string(record).unwrap_or_default();
    format!("{}\n{body}", delimiter(outcome))
}
