//! Task status badge and progress bar

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::Widget,
};

use crate::tui::theme::Theme;
use crate::types::TaskStatus;

/// Inline badge, e.g. ` IN PROGRESS `
pub fn badge_span(status: TaskStatus, theme: Theme) -> Span<'static> {
    Span::styled(
        format!(" {} ", status.label().replace('_', " ").to_uppercase()),
        Style::default()
            .fg(Color::Black)
            .bg(theme.status(status))
            .add_modifier(Modifier::BOLD),
    )
}

/// Format a progress bar with filled/empty blocks
/// Example: 70% with width 10 → "███████░░░"
pub fn format_progress_bar(percent: u16, width: usize) -> String {
    let filled = ((percent.min(100) as f64 / 100.0) * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Status-derived progress (pending 30%, in progress 70%, settled 100%)
pub struct ProgressBar {
    status: TaskStatus,
    theme: Theme,
}

impl ProgressBar {
    pub fn new(status: TaskStatus, theme: Theme) -> Self {
        Self { status, theme }
    }
}

impl Widget for ProgressBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 8 || area.height == 0 {
            return;
        }
        let percent = self.status.progress_percent();
        let suffix = format!(" {:>3}%", percent);
        let bar_width = area.width as usize - suffix.len();
        buf.set_string(
            area.x,
            area.y,
            format_progress_bar(percent, bar_width),
            Style::default().fg(self.theme.status(self.status)),
        );
        buf.set_string(
            area.x + bar_width as u16,
            area.y,
            &suffix,
            Style::default().fg(self.theme.text()),
        );
    }
}
