//! Monthly sales line chart
//!
//! Immediate mode: every render derives axes, curve and markers from the
//! points it is handed and keeps nothing between frames. Hover comes from
//! either the mouse pointer (hit-tested against the marker cells) or a
//! keyboard cursor; the hovered marker is drawn larger with a tooltip.

use chrono::{Datelike, Months, NaiveDate};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Block, Borders, Clear, Widget,
    },
};

use super::chart::{self, CELL_PX};
use super::curve;
use super::format::{format_currency, format_currency_whole};
use crate::tui::theme::Theme;
use crate::types::TimeSeriesPoint;

const TITLE: &str = "Total Sales by Month";

/// Pixels of width per time-axis tick
const PX_PER_TICK: u32 = 120;

/// Headroom above the largest value
const Y_HEADROOM: f64 = 1.1;

const MARKER: &str = "•";
const MARKER_HOVER: &str = "●";

/// Number of time-axis ticks for a plot `width_px` wide.
/// About one per 120 px, capped by the point count, never below 2.
pub fn x_tick_count(width_px: u32, point_count: usize) -> usize {
    let by_width = (width_px / PX_PER_TICK) as usize;
    by_width.min(point_count).max(2)
}

/// Top of the value axis
pub fn y_max(points: &[TimeSeriesPoint]) -> f64 {
    points
        .iter()
        .map(|p| p.total_sales)
        .fold(0.0, f64::max)
        * Y_HEADROOM
}

/// Evenly spaced month starts between `first` and `last` inclusive
pub fn time_ticks(first: NaiveDate, last: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let span = month_index(last) - month_index(first);
    if span <= 0 || count < 2 {
        return vec![first];
    }
    let mut ticks: Vec<NaiveDate> = (0..count)
        .filter_map(|k| {
            let offset = (k as f64 * span as f64 / (count - 1) as f64).round() as u32;
            first.checked_add_months(Months::new(offset))
        })
        .collect();
    ticks.dedup();
    ticks
}

fn month_index(d: NaiveDate) -> i32 {
    d.year() * 12 + d.month0() as i32
}

/// Index of the marker within one cell of `(col, row)`, nearest first
pub fn hit_test(markers: &[(u16, u16)], col: u16, row: u16) -> Option<usize> {
    markers
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| (i, x.abs_diff(col), y.abs_diff(row)))
        .filter(|&(_, dx, dy)| dx <= 1 && dy <= 1)
        .min_by_key(|&(i, dx, dy)| (dx + dy, i))
        .map(|(i, _, _)| i)
}

/// Geometry of one render
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub plot: Rect,
    pub y_max: f64,
    /// Cell of each point's marker, in point order
    pub markers: Vec<(u16, u16)>,
}

pub struct TimeSeriesChart<'a> {
    points: &'a [TimeSeriesPoint],
    theme: Theme,
    cursor: Option<usize>,
    pointer: Option<(u16, u16)>,
}

impl<'a> TimeSeriesChart<'a> {
    pub fn new(points: &'a [TimeSeriesPoint], theme: Theme) -> Self {
        Self {
            points,
            theme,
            cursor: None,
            pointer: None,
        }
    }

    /// Keyboard hover cursor (point index)
    pub fn with_cursor(mut self, cursor: Option<usize>) -> Self {
        self.cursor = cursor;
        self
    }

    /// Last known mouse position
    pub fn with_pointer(mut self, pointer: Option<(u16, u16)>) -> Self {
        self.pointer = pointer;
        self
    }

    /// Compute the plot rectangle and marker cells for `area`.
    /// `None` when there is nothing to draw or no room to draw it.
    pub fn layout(&self, area: Rect) -> Option<ChartLayout> {
        if self.points.is_empty() {
            return None;
        }
        let y_max = y_max(self.points);
        let ticks = chart::value_ticks(y_max, 5);
        let gutter = chart::gutter_width(&ticks, format_currency_whole) + 1;

        // title, plot, axis line, month labels
        if area.height < 6 || area.width < gutter + 8 {
            return None;
        }
        let plot = Rect {
            x: area.x + gutter,
            y: area.y + 1,
            width: area.width - gutter - 1,
            height: area.height - 3,
        };

        let first = self.points[0].month;
        let last = self.points[self.points.len() - 1].month;
        let span_days = (last - first).num_days() as f64;
        let last_col = plot.width.saturating_sub(1) as f64;

        let markers = self
            .points
            .iter()
            .map(|p| {
                let frac = if span_days > 0.0 {
                    (p.month - first).num_days() as f64 / span_days
                } else {
                    0.5
                };
                let col = plot.x + (frac * last_col).round() as u16;
                let row = chart::value_row(plot, p.total_sales, y_max);
                (col, row)
            })
            .collect();

        Some(ChartLayout {
            plot,
            y_max,
            markers,
        })
    }

    /// Hovered point: pointer hit first, then the keyboard cursor
    pub fn hovered(&self, layout: &ChartLayout) -> Option<usize> {
        if let Some((col, row)) = self.pointer {
            if let Some(i) = hit_test(&layout.markers, col, row) {
                return Some(i);
            }
        }
        self.cursor.filter(|&i| i < self.points.len())
    }

    fn render_curve(&self, layout: &ChartLayout, buf: &mut Buffer) {
        let plot = layout.plot;
        let w = plot.width.saturating_sub(1) as f64;
        let h = plot.height.saturating_sub(1) as f64;

        // Canvas units are cells, so markers and curve share one grid
        let anchors: Vec<(f64, f64)> = layout
            .markers
            .iter()
            .zip(self.points)
            .map(|(&(col, _), p)| {
                let y = if layout.y_max > 0.0 {
                    p.total_sales / layout.y_max * h
                } else {
                    0.0
                };
                ((col - plot.x) as f64, y)
            })
            .collect();
        if anchors.len() < 2 {
            return;
        }

        let widest = anchors
            .windows(2)
            .map(|pair| pair[1].0 - pair[0].0)
            .fold(0.0, f64::max);
        let steps = ((widest * 2.0).ceil() as usize).max(2);
        let path = curve::sample(&anchors, steps);
        let color = self.theme.primary();

        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([0.0, w.max(1.0)])
            .y_bounds([0.0, h.max(1.0)])
            .paint(|ctx| {
                for seg in path.windows(2) {
                    ctx.draw(&CanvasLine::new(seg[0].0, seg[0].1, seg[1].0, seg[1].1, color));
                }
            })
            .render(plot, buf);
    }

    fn render_time_axis(&self, layout: &ChartLayout, buf: &mut Buffer) {
        let plot = layout.plot;
        let axis_y = plot.y + plot.height;
        let label_y = axis_y + 1;
        let style = Style::default().fg(self.theme.muted());

        buf.set_string(plot.x - 1, axis_y, "└", style);
        buf.set_string(plot.x, axis_y, "─".repeat(plot.width as usize), style);

        let first = self.points[0].month;
        let last = self.points[self.points.len() - 1].month;
        let count = x_tick_count(plot.width as u32 * CELL_PX as u32, self.points.len());
        let span_days = (last - first).num_days() as f64;
        let last_col = plot.width.saturating_sub(1) as f64;
        let right_edge = plot.x + plot.width + 1;
        let mut next_free = 0u16;

        for tick in time_ticks(first, last, count) {
            let frac = if span_days > 0.0 {
                (tick - first).num_days() as f64 / span_days
            } else {
                0.5
            };
            let col = plot.x + (frac * last_col).round() as u16;
            buf.set_string(col, axis_y, "┬", style);

            let label = tick.format("%b %Y").to_string();
            let width = label.chars().count() as u16;
            let x = col
                .saturating_sub(width / 2)
                .max(plot.x - 1)
                .min(right_edge.saturating_sub(width));
            if x < next_free {
                continue;
            }
            buf.set_string(x, label_y, &label, Style::default().fg(self.theme.date()));
            next_free = x + width + 1;
        }
    }

    fn render_markers(&self, layout: &ChartLayout, hovered: Option<usize>, buf: &mut Buffer) {
        let normal = Style::default().fg(self.theme.primary());
        let hover = Style::default()
            .fg(self.theme.accent())
            .add_modifier(Modifier::BOLD);
        for (i, &(col, row)) in layout.markers.iter().enumerate() {
            if Some(i) == hovered {
                buf.set_string(col, row, MARKER_HOVER, hover);
            } else {
                buf.set_string(col, row, MARKER, normal);
            }
        }
    }

    fn render_tooltip(&self, area: Rect, layout: &ChartLayout, index: usize, buf: &mut Buffer) {
        let point = &self.points[index];
        let (col, row) = layout.markers[index];
        let month = point.month.format("%B %Y").to_string();
        let sales = format!("Sales: {}", format_currency(point.total_sales));

        let width = (month.chars().count().max(sales.chars().count()) as u16 + 4).min(area.width);
        let height = 4u16.min(area.height);
        let right = area.x + area.width;
        let x = if col + 2 + width <= right {
            col + 2
        } else {
            col.saturating_sub(width + 1).max(area.x)
        };
        let y = row
            .saturating_sub(height)
            .clamp(area.y, area.y + area.height - height);
        let rect = Rect::new(x, y, width, height);

        Clear.render(rect, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent()));
        let inner = block.inner(rect);
        block.render(rect, buf);
        buf.set_string(
            inner.x + 1,
            inner.y,
            &month,
            Style::default()
                .fg(self.theme.text())
                .add_modifier(Modifier::BOLD),
        );
        if inner.height > 1 {
            buf.set_string(
                inner.x + 1,
                inner.y + 1,
                &sales,
                Style::default().fg(self.theme.money()),
            );
        }
    }
}

impl Widget for TimeSeriesChart<'_> {
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

        let ticks = chart::value_ticks(layout.y_max, 5);
        chart::render_value_axis(
            layout.plot,
            buf,
            &ticks,
            layout.y_max,
            format_currency_whole,
            Style::default().fg(self.theme.muted()),
        );
        self.render_time_axis(&layout, buf);
        self.render_curve(&layout, buf);

        let hovered = self.hovered(&layout);
        self.render_markers(&layout, hovered, buf);
        if let Some(i) = hovered {
            self.render_tooltip(area, &layout, i, buf);
        }
    }
}
