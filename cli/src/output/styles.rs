//! Output styles using owo-colors stylesheet pattern

use owo_colors::Style;

/// Centralized stylesheet for result output colors.
#[derive(Default, Clone)]
pub struct Styles {
    /// Successful result level (green)
    pub success: Style,
    /// Failed result level (red)
    pub error: Style,
    /// Timestamp
    pub dim: Style,
}

impl Styles {
    /// Apply colors to the stylesheet.
    pub fn colorize(&mut self) {
        self.success = Style::new().green().bold();
        self.error = Style::new().red().bold();
        self.dim = Style::new().dimmed();
    }
}
