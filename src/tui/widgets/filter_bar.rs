//! Filter selection bar and the choices it cycles through

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::services::FilterEngine;
use crate::tui::theme::Theme;
use crate::types::{FilterState, Platform, TransactionRecord, FILTER_YEARS, PRODUCT_CATEGORIES};

/// Label shown for a wildcard field
const ALL: &str = "All";

/// Choices offered for each filter field; `None` (All) precedes them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    pub categories: Vec<String>,
    pub brands: Vec<String>,
    pub platforms: Vec<Platform>,
    pub years: Vec<i32>,
}

impl FilterOptions {
    pub fn from_records(records: &[TransactionRecord]) -> Self {
        Self {
            categories: PRODUCT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            brands: FilterEngine::unique_brands(records),
            platforms: Platform::all().to_vec(),
            years: FILTER_YEARS.collect(),
        }
    }
}

/// Step to the next choice: All → first → ... → last → All
pub fn cycle<T: Clone + PartialEq>(choices: &[T], current: Option<&T>) -> Option<T> {
    match current {
        None => choices.first().cloned(),
        Some(value) => {
            let pos = choices.iter().position(|c| c == value)?;
            choices.get(pos + 1).cloned()
        }
    }
}

/// Which filter field a key cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Category,
    Brand,
    Platform,
    Year,
}

impl FilterField {
    /// Apply one cycle step of this field to `filter`
    pub fn advance(self, filter: &mut FilterState, options: &FilterOptions) {
        match self {
            Self::Category => {
                filter.category = cycle(&options.categories, filter.category.as_ref());
            }
            Self::Brand => filter.brand = cycle(&options.brands, filter.brand.as_ref()),
            Self::Platform => {
                filter.platform = cycle(&options.platforms, filter.platform.as_ref());
            }
            Self::Year => filter.year = cycle(&options.years, filter.year.as_ref()),
        }
    }
}

/// One-line summary of the active filter with its hotkeys
pub struct FilterBar<'a> {
    filter: &'a FilterState,
    matched: usize,
    total: usize,
    theme: Theme,
}

impl<'a> FilterBar<'a> {
    pub fn new(filter: &'a FilterState, matched: usize, total: usize, theme: Theme) -> Self {
        Self {
            filter,
            matched,
            total,
            theme,
        }
    }

    fn field(
        &self,
        key: &'static str,
        name: &'static str,
        value: Option<String>,
    ) -> Vec<Span<'static>> {
        let active = value.is_some();
        let value_style = if active {
            Style::default()
                .fg(self.theme.accent())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.theme.text())
        };
        vec![
            Span::styled(key, Style::default().fg(self.theme.accent())),
            Span::styled(format!(" {name}: "), Style::default().fg(self.theme.muted())),
            Span::styled(value.unwrap_or_else(|| ALL.to_string()), value_style),
            Span::raw("   "),
        ]
    }
}

impl Widget for FilterBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let mut spans = Vec::new();
        spans.extend(self.field("c", "Category", self.filter.category.clone()));
        spans.extend(self.field("b", "Brand", self.filter.brand.clone()));
        spans.extend(self.field(
            "p",
            "Platform",
            self.filter.platform.map(|p| p.label().to_string()),
        ));
        spans.extend(self.field("y", "Year", self.filter.year.map(|y| y.to_string())));
        spans.push(Span::styled(
            format!("{}/{} records", self.matched, self.total),
            Style::default().fg(self.theme.muted()),
        ));
        if !self.filter.is_wildcard() {
            spans.push(Span::styled("  r", Style::default().fg(self.theme.accent())));
            spans.push(Span::styled(" reset", Style::default().fg(self.theme.muted())));
        }

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}
