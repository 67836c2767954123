//! Help popup widget - displays keyboard shortcuts

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::tui::theme::Theme;

/// Version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Width and height of the help popup
const POPUP_WIDTH: u16 = 46;
const POPUP_HEIGHT: u16 = 24;

const TASK_KEYS: [(&str, &str); 3] = [
    ("Up/Down or j/k", "Select task"),
    ("Enter", "Open task details"),
    ("Esc / Backspace", "Back to task list"),
];

const DETAIL_KEYS: [(&str, &str); 6] = [
    ("Tab / Shift+Tab", "Switch section"),
    ("1-5", "Jump to section"),
    ("c / b / p / y", "Cycle category/brand/..."),
    ("r", "Reset filters"),
    ("Left/Right", "Step chart hover"),
    ("Up/Down", "Scroll records"),
];

const GENERAL_KEYS: [(&str, &str); 2] = [("q / Ctrl+C", "Quit"), ("?", "Toggle help")];

/// Help popup widget showing keyboard shortcuts
pub struct HelpPopup {
    theme: Theme,
}

impl HelpPopup {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    /// Calculate centered popup area
    pub fn centered_area(area: Rect) -> Rect {
        let x = area.x + (area.width.saturating_sub(POPUP_WIDTH)) / 2;
        let y = area.y + (area.height.saturating_sub(POPUP_HEIGHT)) / 2;
        Rect {
            x,
            y,
            width: POPUP_WIDTH.min(area.width),
            height: POPUP_HEIGHT.min(area.height),
        }
    }

    fn render_section(
        &self,
        rows: &[Rect],
        buf: &mut Buffer,
        title: &str,
        keys: &[(&str, &str)],
    ) {
        let [header, sep, rest @ ..] = rows else {
            return;
        };
        Paragraph::new(Line::from(Span::styled(
            title.to_string(),
            Style::default()
                .fg(self.theme.date())
                .add_modifier(Modifier::BOLD),
        )))
        .render(*header, buf);
        buf.set_string(
            sep.x,
            sep.y,
            "─".repeat(sep.width as usize),
            Style::default().fg(self.theme.muted()),
        );
        for (row, (key, desc)) in rest.iter().zip(keys) {
            render_keybinding(*row, buf, key, desc, self.theme);
        }
    }
}

impl Default for HelpPopup {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl Widget for HelpPopup {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Overlay
        Clear.render(area, buf);

        let title = format!(" salesboard v{} ", VERSION);
        let block = Block::default()
            .title(title)
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent()));

        let inner = block.inner(area);
        block.render(area, buf);

        let sections: [(&str, &[(&str, &str)]); 3] = [
            ("Task list", &TASK_KEYS),
            ("Task details", &DETAIL_KEYS),
            ("General", &GENERAL_KEYS),
        ];

        // padding, then per section: header + separator + keys + padding
        let mut constraints = vec![Constraint::Length(1)];
        for (_, keys) in &sections {
            constraints.extend(std::iter::repeat_n(Constraint::Length(1), keys.len() + 3));
        }
        constraints.push(Constraint::Min(0));
        let rows = Layout::vertical(constraints).split(inner);

        let mut start = 1;
        for (title, keys) in sections {
            let end = (start + keys.len() + 2).min(rows.len());
            self.render_section(&rows[start..end], buf, title, keys);
            start = end + 1;
        }

        let hint_y = inner.y + inner.height.saturating_sub(1);
        Paragraph::new(Line::from(Span::styled(
            "Press ? to close",
            Style::default().fg(self.theme.muted()),
        )))
        .alignment(Alignment::Center)
        .render(
            Rect {
                y: hint_y,
                height: inner.height.min(1),
                ..inner
            },
            buf,
        );
    }
}

/// Render a single keybinding line
fn render_keybinding(area: Rect, buf: &mut Buffer, key: &str, desc: &str, theme: Theme) {
    let line = Line::from(vec![
        Span::styled(
            format!("  {:<18}", key),
            Style::default().fg(theme.accent()),
        ),
        Span::styled(desc.to_string(), Style::default().fg(theme.text())),
    ]);
    Paragraph::new(line)
        .alignment(Alignment::Left)
        .render(area, buf);
}
