//! Task list page

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use super::format::truncate;
use super::render_separator;
use super::status_badge::badge_span;
use crate::tui::theme::Theme;
use crate::types::Task;

/// Maximum content width (consistent with the details page)
const MAX_CONTENT_WIDTH: u16 = 140;

/// Column definitions: (label, width)
const COLUMNS: [(&str, u16); 5] = [
    ("ID", 8),       // 6 + 2 marker
    ("Name", 34),    //
    ("Status", 15),  // widest badge is " IN PROGRESS "
    ("Created", 20), //
    ("Sources", 16), //
];

const NAME_WIDTH: usize = 32;

fn table_width() -> u16 {
    COLUMNS.iter().map(|(_, w)| w).sum()
}

/// Tasks table, newest first as served
pub struct TaskListView<'a> {
    tasks: &'a [Task],
    selected: usize,
    scroll_offset: usize,
    loading: bool,
    error: Option<&'a str>,
    theme: Theme,
}

impl<'a> TaskListView<'a> {
    pub fn new(tasks: &'a [Task], selected: usize, theme: Theme) -> Self {
        Self {
            tasks,
            selected,
            scroll_offset: 0,
            loading: false,
            error: None,
            theme,
        }
    }

    pub fn with_scroll(mut self, offset: usize) -> Self {
        self.scroll_offset = offset;
        self
    }

    /// True until the first list snapshot arrives
    pub fn with_loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    pub fn with_error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }
}

/// Rows visible in the table for a terminal height
pub fn task_list_visible_rows(terminal_height: u16) -> usize {
    // padding(1) + title(1) + sep(1) + header(1) + sep(1) + status(1) + keybindings(1) = 7
    terminal_height.saturating_sub(7) as usize
}

/// Scroll offset that keeps `selected` within `visible` rows
pub fn scroll_for(selected: usize, current: usize, visible: usize) -> usize {
    if visible == 0 {
        return 0;
    }
    if selected < current {
        selected
    } else if selected >= current + visible {
        selected + 1 - visible
    } else {
        current
    }
}

impl Widget for TaskListView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let content_width = area.width.min(MAX_CONTENT_WIDTH);
        let x_offset = (area.width.saturating_sub(content_width)) / 2;
        let centered_area = Rect {
            x: area.x + x_offset,
            y: area.y,
            width: content_width,
            height: area.height,
        };

        let chunks = Layout::vertical([
            Constraint::Length(1), // 0: Top padding
            Constraint::Length(1), // 1: Title
            Constraint::Length(1), // 2: Separator
            Constraint::Length(1), // 3: Header
            Constraint::Fill(1),   // 4: Task rows
            Constraint::Length(1), // 5: Separator
            Constraint::Length(1), // 6: Status / error line
            Constraint::Length(1), // 7: Keybindings
        ])
        .split(centered_area);

        self.render_title(chunks[1], buf);
        render_separator(chunks[2], buf, self.theme);
        self.render_header(chunks[3], buf);
        self.render_rows(chunks[4], buf);
        render_separator(chunks[5], buf, self.theme);
        self.render_status(chunks[6], buf);
        self.render_keybindings(chunks[7], buf);
    }
}

impl TaskListView<'_> {
    fn render_title(&self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(Line::from(vec![
            Span::styled(
                "Sourcing Tasks",
                Style::default()
                    .fg(self.theme.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({})", self.tasks.len()),
                Style::default().fg(self.theme.muted()),
            ),
        ]))
        .alignment(Alignment::Center)
        .render(area, buf);
    }

    fn table_area(&self, area: Rect) -> Rect {
        let tw = table_width();
        Rect {
            x: area.x + area.width.saturating_sub(tw) / 2,
            y: area.y,
            width: tw.min(area.width),
            height: area.height,
        }
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let header_style = Style::default()
            .fg(self.theme.text())
            .add_modifier(Modifier::BOLD);
        let spans: Vec<Span> = COLUMNS
            .iter()
            .enumerate()
            .map(|(i, (label, width))| {
                let width = *width as usize;
                let text = if i == 0 {
                    format!("  {:<w$}", label, w = width - 2)
                } else {
                    format!("{:<width$}", label)
                };
                Span::styled(text, header_style)
            })
            .collect();
        Paragraph::new(Line::from(spans)).render(self.table_area(area), buf);
    }

    fn render_rows(&self, area: Rect, buf: &mut Buffer) {
        if self.tasks.is_empty() {
            let text = if self.loading {
                "Loading tasks…"
            } else {
                "No tasks yet. Create one with `salesboard create`."
            };
            Paragraph::new(Span::styled(text, Style::default().fg(self.theme.muted())))
                .alignment(Alignment::Center)
                .render(
                    Rect {
                        height: area.height.min(1),
                        ..area
                    },
                    buf,
                );
            return;
        }

        let table = self.table_area(area);
        for (row, (idx, task)) in self
            .tasks
            .iter()
            .enumerate()
            .skip(self.scroll_offset)
            .take(area.height as usize)
            .enumerate()
        {
            let row_area = Rect {
                y: table.y + row as u16,
                height: 1,
                ..table
            };
            self.render_row(row_area, buf, task, idx == self.selected);
        }
    }

    fn render_row(&self, area: Rect, buf: &mut Buffer, task: &Task, is_selected: bool) {
        let selection = if is_selected {
            Modifier::BOLD | Modifier::REVERSED
        } else {
            Modifier::empty()
        };
        let marker = if is_selected { "▸ " } else { "  " };
        let sources = task
            .filter_params
            .data_sources
            .iter()
            .map(|s| s.short_label())
            .collect::<Vec<_>>()
            .join(", ");
        let sources = if sources.is_empty() {
            "—".to_string()
        } else {
            sources
        };

        let badge = badge_span(task.status, self.theme);
        let badge_pad = (COLUMNS[2].1 as usize).saturating_sub(badge.content.chars().count());

        let spans = vec![
            Span::styled(
                format!("{}{:<6}", marker, task.id),
                Style::default()
                    .fg(self.theme.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{:<34}", truncate(&task.name, NAME_WIDTH)),
                Style::default()
                    .fg(self.theme.text())
                    .add_modifier(selection),
            ),
            badge,
            Span::raw(" ".repeat(badge_pad)),
            Span::styled(
                format!("{:<20}", task.created_at.format("%Y-%m-%d %H:%M")),
                Style::default()
                    .fg(self.theme.date())
                    .add_modifier(selection),
            ),
            Span::styled(
                format!("{:<16}", truncate(&sources, 16)),
                Style::default()
                    .fg(self.theme.muted())
                    .add_modifier(selection),
            ),
        ];

        Paragraph::new(Line::from(spans)).render(area, buf);
    }

    fn render_status(&self, area: Rect, buf: &mut Buffer) {
        let Some(error) = self.error else {
            return;
        };
        Paragraph::new(Span::styled(
            truncate(error, area.width as usize),
            Style::default().fg(self.theme.error()),
        ))
        .alignment(Alignment::Center)
        .render(area, buf);
    }

    fn render_keybindings(&self, area: Rect, buf: &mut Buffer) {
        let accent = Style::default().fg(self.theme.accent());
        let muted = Style::default().fg(self.theme.muted());
        Paragraph::new(Line::from(vec![
            Span::styled("↑↓", accent),
            Span::styled(": Navigate", muted),
            Span::raw("  "),
            Span::styled("Enter", accent),
            Span::styled(": Details", muted),
            Span::raw("  "),
            Span::styled("?", accent),
            Span::styled(": Help", muted),
            Span::raw("  "),
            Span::styled("q", accent),
            Span::styled(": Quit", muted),
        ]))
        .alignment(Alignment::Center)
        .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{dates, DataSource, FilterParams, TaskStatus};

    fn task(id: u64, name: &str, status: TaskStatus) -> Task {
        Task {
            id,
            name: name.to_string(),
            status,
            created_at: dates::parse_datetime("2025-03-01T09:30:00").unwrap(),
            updated_at: dates::parse_datetime("2025-03-01T09:31:00").unwrap(),
            filter_params: FilterParams {
                data_sources: vec![DataSource::SourceA, DataSource::SourceB],
                ..Default::default()
            },
        }
    }

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        (area.y..area.y + area.height)
            .map(|y| {
                (area.x..area.x + area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_visible_rows() {
        assert_eq!(task_list_visible_rows(30), 23);
        assert_eq!(task_list_visible_rows(5), 0);
    }

    #[test]
    fn test_scroll_for_keeps_selection_visible() {
        assert_eq!(scroll_for(0, 0, 10), 0);
        assert_eq!(scroll_for(12, 0, 10), 3);
        assert_eq!(scroll_for(2, 5, 10), 2);
        assert_eq!(scroll_for(7, 5, 10), 5);
        assert_eq!(scroll_for(3, 1, 0), 0);
    }

    #[test]
    fn test_renders_rows_with_badges() {
        let tasks = vec![
            task(2, "Holiday sourcing", TaskStatus::InProgress),
            task(1, "Q1 electronics", TaskStatus::Completed),
        ];
        let area = Rect::new(0, 0, 100, 12);
        let mut buf = Buffer::empty(area);
        TaskListView::new(&tasks, 1, Theme::Dark).render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("Sourcing Tasks"));
        assert!(text.contains("Holiday sourcing"));
        assert!(text.contains("IN PROGRESS"));
        assert!(text.contains("COMPLETED"));
        assert!(text.contains("2025-03-01 09:30"));
        assert!(text.contains("Online, Store"));
        assert!(text.contains("▸ 1"));
    }

    #[test]
    fn test_empty_list_messages() {
        let area = Rect::new(0, 0, 80, 10);
        let mut buf = Buffer::empty(area);
        TaskListView::new(&[], 0, Theme::Dark)
            .with_loading(true)
            .render(area, &mut buf);
        assert!(buffer_text(&buf).contains("Loading tasks"));

        let mut buf = Buffer::empty(area);
        TaskListView::new(&[], 0, Theme::Dark).render(area, &mut buf);
        assert!(buffer_text(&buf).contains("No tasks yet"));
    }

    #[test]
    fn test_error_line() {
        let area = Rect::new(0, 0, 80, 10);
        let mut buf = Buffer::empty(area);
        TaskListView::new(&[], 0, Theme::Dark)
            .with_error(Some("Failed to load tasks"))
            .render(area, &mut buf);
        assert!(buffer_text(&buf).contains("Failed to load tasks"));
    }
}
