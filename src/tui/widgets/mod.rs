//! TUI widgets

use ratatui::{buffer::Buffer, layout::Rect, style::Style};

use crate::tui::theme::Theme;

pub mod category_chart;
pub mod chart;
pub mod curve;
pub mod data_table;
pub mod filter_bar;
pub mod format;
pub mod help;
pub mod platform_chart;
pub mod spinner;
pub mod status_badge;
pub mod tabs;
pub mod task_details;
pub mod task_list;
pub mod time_series;

/// Full-width horizontal rule
fn render_separator(area: Rect, buf: &mut Buffer, theme: Theme) {
    let line = "─".repeat(area.width as usize);
    buf.set_string(area.x, area.y, &line, Style::default().fg(theme.muted()));
}
