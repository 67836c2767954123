//! Task details page: header, progress, filters and the sales views

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use super::category_chart::CategoryChart;
use super::data_table::DataTable;
use super::filter_bar::FilterBar;
use super::format::{format_currency, format_number, truncate};
use super::platform_chart::PlatformChart;
use super::render_separator;
use super::spinner::{LoadingStage, Spinner};
use super::status_badge::{badge_span, ProgressBar};
use super::tabs::{Tab, TabBar};
use super::time_series::TimeSeriesChart;
use crate::tui::theme::Theme;
use crate::types::{
    ChartData, DataSummary, FilterParams, FilterState, Task, TaskStatus, TransactionRecord,
};

const MAX_CONTENT_WIDTH: u16 = 160;

/// Width of the progress bar while waiting on the task
const PROGRESS_WIDTH: u16 = 50;

/// Fetched records and everything derived from them
pub struct DetailsData<'a> {
    pub filter: &'a FilterState,
    pub filtered: &'a [&'a TransactionRecord],
    pub total: usize,
    pub charts: &'a ChartData,
}

/// Human-readable filter parameters a task was created with
pub fn describe_params(params: &FilterParams) -> Vec<(&'static str, String)> {
    let years = match (params.year_from, params.year_to) {
        (Some(from), Some(to)) => format!("{from} – {to}"),
        (Some(from), None) => format!("from {from}"),
        (None, Some(to)) => format!("until {to}"),
        (None, None) => "Any".to_string(),
    };
    let list = |values: &Option<Vec<String>>| match values {
        Some(v) if !v.is_empty() => v.join(", "),
        _ => "All".to_string(),
    };
    let sources = if params.data_sources.is_empty() {
        "None".to_string()
    } else {
        params
            .data_sources
            .iter()
            .map(|s| s.label())
            .collect::<Vec<_>>()
            .join(", ")
    };
    vec![
        ("Years", years),
        ("Brands", list(&params.companies)),
        ("Categories", list(&params.categories)),
        ("Sources", sources),
    ]
}

pub struct TaskDetailsView<'a> {
    task: &'a Task,
    data: Option<DetailsData<'a>>,
    tab: Tab,
    cursor: Option<usize>,
    pointer: Option<(u16, u16)>,
    table_scroll: usize,
    spinner_frame: usize,
    error: Option<&'a str>,
    theme: Theme,
}

impl<'a> TaskDetailsView<'a> {
    pub fn new(task: &'a Task, theme: Theme) -> Self {
        Self {
            task,
            data: None,
            tab: Tab::default(),
            cursor: None,
            pointer: None,
            table_scroll: 0,
            spinner_frame: 0,
            error: None,
            theme,
        }
    }

    pub fn with_data(mut self, data: Option<DetailsData<'a>>) -> Self {
        self.data = data;
        self
    }

    pub fn with_tab(mut self, tab: Tab) -> Self {
        self.tab = tab;
        self
    }

    /// Keyboard hover cursor and mouse pointer for the trend chart
    pub fn with_hover(mut self, cursor: Option<usize>, pointer: Option<(u16, u16)>) -> Self {
        self.cursor = cursor;
        self.pointer = pointer;
        self
    }

    pub fn with_table_scroll(mut self, offset: usize) -> Self {
        self.table_scroll = offset;
        self
    }

    pub fn with_spinner(mut self, frame: usize) -> Self {
        self.spinner_frame = frame;
        self
    }

    pub fn with_error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }
}

/// Rows left for the records table at a terminal height
pub fn table_visible_rows(terminal_height: u16) -> usize {
    // page chrome (9) + tabs, filter bar, gap (3) + table header and note (2)
    terminal_height.saturating_sub(14) as usize
}

impl Widget for TaskDetailsView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let content_width = area.width.min(MAX_CONTENT_WIDTH);
        let centered = Rect {
            x: area.x + (area.width - content_width) / 2,
            width: content_width,
            ..area
        };

        let chunks = Layout::vertical([
            Constraint::Length(1), // 0: Top padding
            Constraint::Length(1), // 1: Name + status
            Constraint::Length(1), // 2: Timestamps
            Constraint::Length(1), // 3: Filter parameters
            Constraint::Length(1), // 4: Separator
            Constraint::Fill(1),   // 5: Body
            Constraint::Length(1), // 6: Separator
            Constraint::Length(1), // 7: Error line
            Constraint::Length(1), // 8: Keybindings
        ])
        .split(centered);

        self.render_header(chunks[1], buf);
        self.render_timestamps(chunks[2], buf);
        self.render_params(chunks[3], buf);
        render_separator(chunks[4], buf, self.theme);
        self.render_body(chunks[5], buf);
        render_separator(chunks[6], buf, self.theme);
        self.render_error(chunks[7], buf);
        self.render_keybindings(chunks[8], buf);
    }
}

impl TaskDetailsView<'_> {
    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let name = if self.task.name.is_empty() {
            format!("Task {}", self.task.id)
        } else {
            truncate(&self.task.name, 60)
        };
        Paragraph::new(Line::from(vec![
            Span::styled(
                name,
                Style::default()
                    .fg(self.theme.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  #{}  ", self.task.id),
                Style::default().fg(self.theme.muted()),
            ),
            badge_span(self.task.status, self.theme),
        ]))
        .alignment(Alignment::Center)
        .render(area, buf);
    }

    fn render_timestamps(&self, area: Rect, buf: &mut Buffer) {
        let muted = Style::default().fg(self.theme.muted());
        let date = Style::default().fg(self.theme.date());
        Paragraph::new(Line::from(vec![
            Span::styled("Created ", muted),
            Span::styled(self.task.created_at.format("%Y-%m-%d %H:%M:%S").to_string(), date),
            Span::styled("   Updated ", muted),
            Span::styled(self.task.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(), date),
        ]))
        .alignment(Alignment::Center)
        .render(area, buf);
    }

    fn render_params(&self, area: Rect, buf: &mut Buffer) {
        let mut spans = Vec::new();
        for (i, (label, value)) in describe_params(&self.task.filter_params)
            .into_iter()
            .enumerate()
        {
            if i > 0 {
                spans.push(Span::raw("   "));
            }
            spans.push(Span::styled(
                format!("{label}: "),
                Style::default().fg(self.theme.muted()),
            ));
            spans.push(Span::styled(
                truncate(&value, 40),
                Style::default().fg(self.theme.text()),
            ));
        }
        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .render(area, buf);
    }

    fn render_body(&self, area: Rect, buf: &mut Buffer) {
        match (self.task.status, &self.data) {
            (TaskStatus::Pending | TaskStatus::InProgress, _) => self.render_progress(area, buf),
            (TaskStatus::Failed, _) => {
                self.render_message(area, buf, "The task failed; no records were sourced.", true)
            }
            (TaskStatus::Completed, None) => {
                Spinner::new(self.spinner_frame, LoadingStage::Records, self.theme)
                    .compact()
                    .render(area, buf);
            }
            (TaskStatus::Completed, Some(data)) => self.render_data(area, buf, data),
        }
    }

    fn render_progress(&self, area: Rect, buf: &mut Buffer) {
        if area.height < 3 {
            return;
        }
        let mid = area.y + area.height / 2;
        let text = match self.task.status {
            TaskStatus::Pending => "Waiting for the task to start…",
            _ => "Sourcing records…",
        };
        Paragraph::new(Span::styled(text, Style::default().fg(self.theme.text())))
            .alignment(Alignment::Center)
            .render(
                Rect {
                    y: mid - 1,
                    height: 1,
                    ..area
                },
                buf,
            );
        let width = PROGRESS_WIDTH.min(area.width);
        ProgressBar::new(self.task.status, self.theme).render(
            Rect {
                x: area.x + (area.width - width) / 2,
                y: mid + 1,
                width,
                height: 1,
            },
            buf,
        );
    }

    fn render_message(&self, area: Rect, buf: &mut Buffer, text: &str, is_error: bool) {
        if area.height == 0 {
            return;
        }
        let color = if is_error {
            self.theme.error()
        } else {
            self.theme.muted()
        };
        Paragraph::new(Span::styled(text.to_string(), Style::default().fg(color)))
            .alignment(Alignment::Center)
            .render(
                Rect {
                    y: area.y + area.height / 2,
                    height: 1,
                    ..area
                },
                buf,
            );
    }

    fn render_data(&self, area: Rect, buf: &mut Buffer, data: &DetailsData) {
        let chunks = Layout::vertical([
            Constraint::Length(1), // 0: Tab bar
            Constraint::Length(1), // 1: Filter bar
            Constraint::Length(1), // 2: Gap
            Constraint::Fill(1),   // 3: Section content
        ])
        .split(area);

        TabBar::new(self.tab, self.theme).render(chunks[0], buf);
        FilterBar::new(data.filter, data.filtered.len(), data.total, self.theme)
            .render(chunks[1], buf);

        let content = chunks[3];
        if data.filtered.is_empty() && self.tab != Tab::Records {
            self.render_message(content, buf, "No records match the current filters.", false);
            return;
        }

        match self.tab {
            Tab::Overview => {
                let rows =
                    Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).split(content);
                render_summary(rows[0], buf, &data.charts.summary, self.theme);
                let cols =
                    Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                        .split(rows[1]);
                CategoryChart::new(&data.charts.categories, self.theme).render(cols[0], buf);
                PlatformChart::new(&data.charts.platforms, self.theme).render(cols[1], buf);
            }
            Tab::Trend => TimeSeriesChart::new(&data.charts.time_series, self.theme)
                .with_cursor(self.cursor)
                .with_pointer(self.pointer)
                .render(content, buf),
            Tab::Categories => {
                CategoryChart::new(&data.charts.categories, self.theme).render(content, buf)
            }
            Tab::Platforms => {
                PlatformChart::new(&data.charts.platforms, self.theme).render(content, buf)
            }
            Tab::Records => DataTable::new(data.filtered, self.theme)
                .with_scroll(self.table_scroll)
                .render(content, buf),
        }
    }

    fn render_error(&self, area: Rect, buf: &mut Buffer) {
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
        let mut spans = vec![Span::styled("Esc", accent), Span::styled(": Back", muted)];

        if self.task.status == TaskStatus::Completed && self.data.is_some() {
            spans.extend([
                Span::raw("  "),
                Span::styled("1-5", accent),
                Span::styled(": Section", muted),
                Span::raw("  "),
                Span::styled("c/b/p/y", accent),
                Span::styled(": Filter", muted),
                Span::raw("  "),
                Span::styled("r", accent),
                Span::styled(": Reset", muted),
            ]);
            match self.tab {
                Tab::Trend => spans.extend([
                    Span::raw("  "),
                    Span::styled("←→", accent),
                    Span::styled(": Hover", muted),
                ]),
                Tab::Records => spans.extend([
                    Span::raw("  "),
                    Span::styled("↑↓", accent),
                    Span::styled(": Scroll", muted),
                ]),
                _ => {}
            }
        }
        spans.extend([
            Span::raw("  "),
            Span::styled("?", accent),
            Span::styled(": Help", muted),
        ]);

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

fn render_summary(area: Rect, buf: &mut Buffer, summary: &DataSummary, theme: Theme) {
    let muted = Style::default().fg(theme.muted());
    let value = Style::default()
        .fg(theme.text())
        .add_modifier(Modifier::BOLD);
    Paragraph::new(Line::from(vec![
        Span::styled("Records ", muted),
        Span::styled(format_number(summary.record_count as u64), value),
        Span::styled("   Online store ", muted),
        Span::styled(format_number(summary.online_store_records as u64), value),
        Span::styled("   Physical store ", muted),
        Span::styled(format_number(summary.physical_store_records as u64), value),
        Span::styled("   Total value ", muted),
        Span::styled(
            format_currency(summary.total_value),
            Style::default()
                .fg(theme.money())
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .alignment(Alignment::Center)
    .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::Aggregator;
    use crate::types::{dates, DataSource, Platform};

    fn task(status: TaskStatus) -> Task {
        Task {
            id: 7,
            name: "Holiday sourcing".to_string(),
            status,
            created_at: dates::parse_datetime("2025-03-01T09:30:00").unwrap(),
            updated_at: dates::parse_datetime("2025-03-01T09:45:10").unwrap(),
            filter_params: FilterParams {
                year_from: Some(2021),
                year_to: Some(2023),
                companies: Some(vec!["Sony".into(), "Lego".into()]),
                categories: None,
                data_sources: vec![DataSource::SourceA],
            },
        }
    }

    fn record(category: &str, price: f64, platform: Platform, date: &str) -> TransactionRecord {
        TransactionRecord {
            source: DataSource::SourceA,
            category: category.to_string(),
            brand: "Sony".to_string(),
            price,
            quantity: 1,
            platform,
            purchase_date: dates::parse_datetime(date).unwrap(),
            rating: None,
            location: None,
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

    // ========== describe_params ==========

    #[test]
    fn test_describe_params() {
        let params = task(TaskStatus::Pending).filter_params;
        let described = describe_params(&params);
        assert_eq!(described[0], ("Years", "2021 – 2023".to_string()));
        assert_eq!(described[1], ("Brands", "Sony, Lego".to_string()));
        assert_eq!(described[2], ("Categories", "All".to_string()));
        assert_eq!(described[3], ("Sources", "Online Store (JSON)".to_string()));
    }

    #[test]
    fn test_describe_params_open_years() {
        let params = FilterParams {
            year_from: Some(2022),
            ..Default::default()
        };
        let described = describe_params(&params);
        assert_eq!(described[0].1, "from 2022");
        assert_eq!(described[3].1, "None");
    }

    // ========== rendering ==========

    #[test]
    fn test_pending_shows_progress() {
        let t = task(TaskStatus::Pending);
        let area = Rect::new(0, 0, 120, 20);
        let mut buf = Buffer::empty(area);
        TaskDetailsView::new(&t, Theme::Dark).render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("Holiday sourcing"));
        assert!(text.contains("PENDING"));
        assert!(text.contains("2025-03-01 09:45:10"));
        assert!(text.contains("Brands: Sony, Lego"));
        assert!(text.contains(" 30%"));
    }

    #[test]
    fn test_failed_shows_message_without_progress() {
        let t = task(TaskStatus::Failed);
        let area = Rect::new(0, 0, 120, 20);
        let mut buf = Buffer::empty(area);
        TaskDetailsView::new(&t, Theme::Dark).render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("FAILED"));
        assert!(text.contains("The task failed"));
        assert!(!text.contains('%'));
    }

    #[test]
    fn test_completed_without_records_spins() {
        let t = task(TaskStatus::Completed);
        let area = Rect::new(0, 0, 120, 20);
        let mut buf = Buffer::empty(area);
        TaskDetailsView::new(&t, Theme::Dark).render(area, &mut buf);
        assert!(buffer_text(&buf).contains("Fetching records..."));
    }

    #[test]
    fn test_completed_overview_shows_summary_and_charts() {
        let t = task(TaskStatus::Completed);
        let records = vec![
            record("Electronics", 100.0, Platform::Online, "2021-05-01"),
            record("Books", 20.0, Platform::Store, "2021-05-15"),
        ];
        let filtered: Vec<&TransactionRecord> = records.iter().collect();
        let charts = Aggregator::chart_data(&filtered);
        let filter = FilterState::default();

        let area = Rect::new(0, 0, 140, 36);
        let mut buf = Buffer::empty(area);
        TaskDetailsView::new(&t, Theme::Dark)
            .with_data(Some(DetailsData {
                filter: &filter,
                filtered: &filtered,
                total: records.len(),
                charts: &charts,
            }))
            .render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("[Overview]"));
        assert!(text.contains("Category: All"));
        assert!(text.contains("Total value"));
        assert!(text.contains("$120.00"));
        assert!(text.contains("Total Sales by Category"));
        assert!(text.contains("Platform Comparison"));
    }

    #[test]
    fn test_empty_filter_result_message() {
        let t = task(TaskStatus::Completed);
        let charts = ChartData::default();
        let filter = FilterState {
            year: Some(2020),
            ..Default::default()
        };
        let area = Rect::new(0, 0, 120, 24);
        let mut buf = Buffer::empty(area);
        TaskDetailsView::new(&t, Theme::Dark)
            .with_tab(Tab::Trend)
            .with_data(Some(DetailsData {
                filter: &filter,
                filtered: &[],
                total: 4,
                charts: &charts,
            }))
            .render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("No records match"));
        assert!(text.contains("0/4 records"));
    }

    #[test]
    fn test_table_visible_rows() {
        assert_eq!(table_visible_rows(40), 26);
        assert_eq!(table_visible_rows(10), 0);
    }
}
