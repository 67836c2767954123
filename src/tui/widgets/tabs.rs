//! Tab bar for the task details page

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::tui::theme::Theme;

/// Sections of a task's details page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Trend,
    Categories,
    Platforms,
    Records,
}

impl Tab {
    pub fn label(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Trend => "Trend",
            Self::Categories => "Categories",
            Self::Platforms => "Platforms",
            Self::Records => "Records",
        }
    }

    /// All tabs in display order
    pub fn all() -> &'static [Tab] {
        &[
            Tab::Overview,
            Tab::Trend,
            Tab::Categories,
            Tab::Platforms,
            Tab::Records,
        ]
    }

    fn position(self) -> usize {
        Self::all().iter().position(|&t| t == self).unwrap_or(0)
    }

    /// Next tab (wrapping)
    pub fn next(self) -> Self {
        let all = Self::all();
        all[(self.position() + 1) % all.len()]
    }

    /// Previous tab (wrapping)
    pub fn prev(self) -> Self {
        let all = Self::all();
        all[(self.position() + all.len() - 1) % all.len()]
    }

    /// Tab for a number key (1-5)
    pub fn from_number(n: u8) -> Option<Self> {
        Self::all().get((n as usize).checked_sub(1)?).copied()
    }
}

/// Tab bar widget showing available sections
pub struct TabBar {
    selected: Tab,
    theme: Theme,
}

impl TabBar {
    pub fn new(selected: Tab, theme: Theme) -> Self {
        Self { selected, theme }
    }
}

impl Widget for TabBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let total_width: u16 = Tab::all()
            .iter()
            .map(|tab| {
                let extra = if *tab == self.selected { 2 } else { 0 };
                tab.label().len() as u16 + extra + 2
            })
            .sum::<u16>()
            .saturating_sub(2);

        let mut x = area.x + (area.width.saturating_sub(total_width)) / 2;

        for tab in Tab::all() {
            let is_selected = *tab == self.selected;
            let display = if is_selected {
                format!("[{}]", tab.label())
            } else {
                tab.label().to_string()
            };

            let display_len = display.len() as u16;
            if x + display_len > area.x + area.width {
                break;
            }

            let style = if is_selected {
                Style::default()
                    .fg(self.theme.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.muted())
            };

            buf.set_string(x, area.y, &display, style);
            x += display_len + 2;
        }
    }
}
