use crate::themes::Theme;
use ratatui::text::{Line, Span};
use visa_core::formatting::{format_count, format_percent, ratio_percent};

/// Configuration controlling visual appearance of a progress bar.
pub struct ProgressBarConfig {
    /// Width in terminal columns of the bar portion (excluding label).
    pub width: u16,
    pub filled_char: char,
    pub empty_char: char,
    /// Append `(released/total)` after the percentage.
    pub show_counts: bool,
}

impl Default for ProgressBarConfig {
    fn default() -> Self {
        Self {
            width: 50,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
            show_counts: true,
        }
    }
}

// ── ReleaseRateBar ───────────────────────────────────────────────────────────

/// Horizontal bar showing the share of inspections whose establishment was
/// released, coloured by [`Theme::release_style`].
pub struct ReleaseRateBar<'a> {
    /// Release rate in percent, clamped to `[0.0, 100.0]`.
    pub percentage: f64,
    pub released: usize,
    pub total: usize,
    pub theme: &'a Theme,
    pub config: ProgressBarConfig,
}

impl<'a> ReleaseRateBar<'a> {
    pub fn new(released: usize, total: usize, theme: &'a Theme) -> Self {
        Self {
            percentage: ratio_percent(released as f64, total as f64).min(100.0),
            released,
            total,
            theme,
            config: ProgressBarConfig::default(),
        }
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.config.width = width;
        self
    }

    /// Render as `filled`, `empty` and label spans.
    pub fn to_line(&self) -> Line<'a> {
        let filled = ((self.percentage / 100.0) * self.config.width as f64) as u16;
        let empty = self.config.width.saturating_sub(filled);

        let filled_str: String =
            std::iter::repeat_n(self.config.filled_char, filled as usize).collect();
        let empty_str: String =
            std::iter::repeat_n(self.config.empty_char, empty as usize).collect();

        let mut label = format!(" {}", format_percent(self.percentage));
        if self.config.show_counts {
            label.push_str(&format!(
                " ({}/{})",
                format_count(self.released as u64),
                format_count(self.total as u64)
            ));
        }

        Line::from(vec![
            Span::styled(filled_str, self.theme.release_style(self.percentage)),
            Span::styled(empty_str, self.theme.progress_empty),
            Span::styled(label, self.theme.progress_label),
        ])
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
