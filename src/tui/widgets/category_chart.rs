//! Sales by category bar chart

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Clear, Widget},
};

use super::chart::{self, LabelPlacer};
use super::format::{format_currency_compact, format_currency_whole, truncate};
use crate::tui::theme::Theme;
use crate::types::CategoryAggregate;

const TITLE: &str = "Total Sales by Category";

/// Share of each slot taken by its bar
const BAR_FILL: f64 = 0.7;

/// Rows available to slanted category labels
const MAX_LABEL_ROWS: u16 = 8;

/// Horizontal extent of one bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarSlot {
    pub slot_x: u16,
    pub slot_width: u16,
    pub bar_x: u16,
    pub bar_width: u16,
}

impl BarSlot {
    pub fn center(&self) -> u16 {
        self.slot_x + self.slot_width / 2
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarLayout {
    pub plot: Rect,
    pub y_max: f64,
    pub slots: Vec<BarSlot>,
    /// Label rows below the axis; more than one means slanted labels
    pub label_rows: u16,
}

/// Split `width` columns starting at `x` into `count` equal slots
pub fn bar_slots(x: u16, width: u16, count: usize) -> Vec<BarSlot> {
    let count = count.min(width as usize);
    if count == 0 {
        return Vec::new();
    }
    let slot_width = width / count as u16;
    let bar_width = ((slot_width as f64 * BAR_FILL).round() as u16).max(1);
    (0..count as u16)
        .map(|i| {
            let slot_x = x + i * slot_width;
            BarSlot {
                slot_x,
                slot_width,
                bar_x: slot_x + (slot_width - bar_width) / 2,
                bar_width,
            }
        })
        .collect()
}

pub struct CategoryChart<'a> {
    categories: &'a [CategoryAggregate],
    theme: Theme,
}

impl<'a> CategoryChart<'a> {
    pub fn new(categories: &'a [CategoryAggregate], theme: Theme) -> Self {
        Self { categories, theme }
    }

    pub fn layout(&self, area: Rect) -> Option<BarLayout> {
        if self.categories.is_empty() {
            return None;
        }
        let y_max = self
            .categories
            .iter()
            .map(|c| c.total_sales)
            .fold(0.0, f64::max)
            * 1.1;
        let ticks = chart::value_ticks(y_max, 5);
        let gutter = chart::gutter_width(&ticks, format_currency_whole) + 1;
        if area.width < gutter + 4 || area.height < 6 {
            return None;
        }
        let plot_width = area.width - gutter;
        let slots = bar_slots(area.x + gutter, plot_width, self.categories.len());
        let slot_width = slots.first().map_or(0, |s| s.slot_width);

        let longest = self
            .categories
            .iter()
            .take(slots.len())
            .map(|c| c.category.chars().count() as u16)
            .max()
            .unwrap_or(0);
        // title + 3 plot rows + axis must remain
        let spare = area.height - 5;
        let label_rows = if longest < slot_width {
            1
        } else {
            longest.clamp(1, MAX_LABEL_ROWS).min(spare)
        };

        let plot = Rect {
            x: area.x + gutter,
            y: area.y + 1,
            width: plot_width,
            height: area.height - 2 - label_rows,
        };
        Some(BarLayout {
            plot,
            y_max,
            slots,
            label_rows,
        })
    }

    fn render_labels(&self, area: Rect, layout: &BarLayout, buf: &mut Buffer) {
        let label_y = layout.plot.y + layout.plot.height + 1;
        let style = Style::default().fg(self.theme.text());

        for (slot, cat) in layout.slots.iter().zip(self.categories) {
            if layout.label_rows == 1 {
                let text = truncate(&cat.category, slot.slot_width.saturating_sub(1) as usize);
                let width = text.chars().count() as u16;
                let x = slot.center().saturating_sub(width / 2);
                buf.set_string(x, label_y, &text, style);
                continue;
            }

            // Slanted: text rises to the right and ends under the bar
            let text = truncate(&cat.category, layout.label_rows as usize);
            for (j, ch) in text.chars().rev().enumerate() {
                let j = j as u16;
                let Some(x) = slot.center().checked_sub(j) else {
                    break;
                };
                if x < area.x {
                    break;
                }
                buf.set_string(x, label_y + j, ch.to_string(), style);
            }
        }
    }
}

impl Widget for CategoryChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(layout) = self.layout(area) else {
            return;
        };
        Clear.render(area, buf);

        let title_x = area.x + area.width.saturating_sub(TITLE.len() as u16) / 2;
        buf.set_string(
            title_x,
            area.y,
            TITLE,
            Style::default()
                .fg(self.theme.text())
                .add_modifier(Modifier::BOLD),
        );

        let plot = layout.plot;
        let muted = Style::default().fg(self.theme.muted());
        let ticks = chart::value_ticks(layout.y_max, 5);
        chart::render_value_axis(plot, buf, &ticks, layout.y_max, format_currency_whole, muted);
        let axis_y = plot.y + plot.height;
        buf.set_string(plot.x - 1, axis_y, "└", muted);
        buf.set_string(plot.x, axis_y, "─".repeat(plot.width as usize), muted);

        let mut placer = LabelPlacer::new(plot);

        for (i, (slot, cat)) in layout.slots.iter().zip(self.categories).enumerate() {
            let fraction = if layout.y_max > 0.0 {
                cat.total_sales / layout.y_max
            } else {
                0.0
            };
            let style = Style::default().fg(self.theme.bar_color(i));
            let top = chart::render_bar(plot, buf, slot.bar_x, slot.bar_width, fraction, style)
                .unwrap_or(axis_y);

            let full = format_currency_whole(cat.total_sales);
            let text = if full.chars().count() as u16 <= slot.slot_width {
                full
            } else {
                format_currency_compact(cat.total_sales)
            };
            if let Some(row) = top.checked_sub(1) {
                placer.place(
                    buf,
                    slot.center(),
                    row,
                    &text,
                    Style::default().fg(self.theme.money()),
                    1,
                );
            }
        }

        self.render_labels(area, &layout, buf);
    }
}
