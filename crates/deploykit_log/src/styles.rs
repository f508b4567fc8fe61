//! Output styles using the owo-colors stylesheet pattern.

use console::Term;
use owo_colors::Style;

/// Stylesheet for deploy console lines. `Default` is uncolored.
#[derive(Debug, Default, Clone)]
pub struct Styles {
    /// Source-missing and other skip warnings (yellow)
    pub warning: Style,
    /// Destination-creation notices
    pub dim: Style,
    /// Copy-start notices (cyan)
    pub info: Style,
    /// Success lines (green)
    pub success: Style,
    /// Per-target failures (red)
    pub error: Style,
}

impl Styles {
    /// Apply colors to the stylesheet.
    pub fn colorize(&mut self) {
        self.warning = Style::new().yellow();
        self.dim = Style::new().dimmed();
        self.info = Style::new().cyan();
        self.success = Style::new().green();
        self.error = Style::new().red();
    }

    pub fn colored() -> Self {
        let mut styles = Self::default();
        styles.colorize();
        styles
    }

    /// Colored only for a terminal stdout without `NO_COLOR` or `no_color`.
    pub fn for_stdout(no_color: bool) -> Self {
        Self::_for_term(&Term::stdout(), no_color)
    }

    /// Same rule as [`Styles::for_stdout`], checked against stderr.
    pub fn for_stderr(no_color: bool) -> Self {
        Self::_for_term(&Term::stderr(), no_color)
    }

    fn _for_term(term: &Term, no_color: bool) -> Self {
        if !no_color && term.is_term() && std::env::var_os("NO_COLOR").is_none() {
            Self::colored()
        } else {
            Self::default()
        }
    }
}
