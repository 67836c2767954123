//! Table of the filtered transaction records

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use super::format::{format_currency, format_number, truncate};
use crate::tui::theme::Theme;
use crate::types::TransactionRecord;

/// Rows shown at most, regardless of how many records match
pub const TABLE_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Date,
    Source,
    Category,
    Brand,
    Platform,
    Qty,
    Price,
    Total,
    Rating,
    Location,
}

impl Column {
    fn label(self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Source => "Source",
            Self::Category => "Category",
            Self::Brand => "Brand",
            Self::Platform => "Platform",
            Self::Qty => "Qty",
            Self::Price => "Price",
            Self::Total => "Total",
            Self::Rating => "Rating",
            Self::Location => "Location",
        }
    }

    fn width(self) -> usize {
        match self {
            Self::Date => 12,
            Self::Source => 8,
            Self::Category => 16,
            Self::Brand => 14,
            Self::Platform => 9,
            Self::Qty => 5,
            Self::Price => 11,
            Self::Total => 12,
            Self::Rating => 7,
            Self::Location => 14,
        }
    }

    fn right_aligned(self) -> bool {
        matches!(self, Self::Qty | Self::Price | Self::Total | Self::Rating)
    }
}

/// Columns to show; rating and location only when some record carries them
fn columns(records: &[&TransactionRecord]) -> Vec<Column> {
    let mut cols = vec![
        Column::Date,
        Column::Source,
        Column::Category,
        Column::Brand,
        Column::Platform,
        Column::Qty,
        Column::Price,
        Column::Total,
    ];
    if records.iter().any(|r| r.rating.is_some()) {
        cols.push(Column::Rating);
    }
    if records.iter().any(|r| r.location.is_some()) {
        cols.push(Column::Location);
    }
    cols
}

fn cell(record: &TransactionRecord, col: Column) -> String {
    match col {
        Column::Date => record.purchase_date.format("%Y-%m-%d").to_string(),
        Column::Source => record.source.short_label().to_string(),
        Column::Category => record.category.clone(),
        Column::Brand => record.brand.clone(),
        Column::Platform => record.platform.as_str().to_string(),
        Column::Qty => format_number(u64::from(record.quantity)),
        Column::Price => format_currency(record.price),
        Column::Total => format_currency(record.line_total()),
        Column::Rating => record
            .rating
            .map(|r| format!("{r:.1}"))
            .unwrap_or_else(|| "—".to_string()),
        Column::Location => record.location.clone().unwrap_or_else(|| "—".to_string()),
    }
}

fn pad(text: &str, col: Column) -> String {
    // One column of gap after each cell
    let w = col.width() - 1;
    let text = truncate(text, w);
    if col.right_aligned() {
        format!("{:>w$} ", text)
    } else {
        format!("{:<w$} ", text)
    }
}

/// Caption under the table
pub fn table_note(total: usize) -> String {
    if total > TABLE_LIMIT {
        format!(
            "Showing first {} of {} records",
            TABLE_LIMIT,
            format_number(total as u64)
        )
    } else {
        format!("{} records", format_number(total as u64))
    }
}

/// Filtered records, capped at [`TABLE_LIMIT`] rows
pub struct DataTable<'a> {
    records: &'a [&'a TransactionRecord],
    scroll_offset: usize,
    theme: Theme,
}

impl<'a> DataTable<'a> {
    pub fn new(records: &'a [&'a TransactionRecord], theme: Theme) -> Self {
        Self {
            records,
            scroll_offset: 0,
            theme,
        }
    }

    pub fn with_scroll(mut self, offset: usize) -> Self {
        self.scroll_offset = offset;
        self
    }

    /// Largest useful scroll offset for `visible_rows`
    pub fn max_scroll(total: usize, visible_rows: usize) -> usize {
        total.min(TABLE_LIMIT).saturating_sub(visible_rows)
    }
}

impl Widget for DataTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 3 {
            return;
        }
        let shown = &self.records[..self.records.len().min(TABLE_LIMIT)];
        let cols = columns(shown);
        let table_width: usize = cols.iter().map(|c| c.width()).sum();
        let x = area.x + area.width.saturating_sub(table_width as u16) / 2;
        let width = area.width.min(table_width as u16);

        let header_style = Style::default()
            .fg(self.theme.text())
            .add_modifier(Modifier::BOLD);
        let header: Vec<Span> = cols
            .iter()
            .map(|&c| Span::styled(pad(c.label(), c), header_style))
            .collect();
        Paragraph::new(Line::from(header)).render(
            Rect {
                x,
                y: area.y,
                width,
                height: 1,
            },
            buf,
        );

        let body_rows = (area.height - 2) as usize;
        let offset = self.scroll_offset.min(Self::max_scroll(shown.len(), body_rows));
        for (row, record) in shown.iter().skip(offset).take(body_rows).enumerate() {
            let spans: Vec<Span> = cols
                .iter()
                .map(|&c| {
                    let color = match c {
                        Column::Date => self.theme.date(),
                        Column::Price | Column::Total => self.theme.money(),
                        Column::Source | Column::Location => self.theme.muted(),
                        _ => self.theme.text(),
                    };
                    Span::styled(pad(&cell(record, c), c), Style::default().fg(color))
                })
                .collect();
            Paragraph::new(Line::from(spans)).render(
                Rect {
                    x,
                    y: area.y + 1 + row as u16,
                    width,
                    height: 1,
                },
                buf,
            );
        }

        Paragraph::new(Span::styled(
            table_note(self.records.len()),
            Style::default().fg(self.theme.muted()),
        ))
        .alignment(Alignment::Center)
        .render(
            Rect {
                y: area.y + area.height - 1,
                height: 1,
                ..area
            },
            buf,
        );
    }
}
