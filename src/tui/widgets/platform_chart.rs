//! Platform comparison chart
//!
//! Two platform groups, four metric bars each. Bar heights use the
//! normalized values so every metric shares one 0-100% axis; the labels
//! above the bars show the raw values.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Clear, Widget},
};

use super::chart::{self, LabelPlacer};
use super::format::{format_currency, format_currency_whole, format_number};
use crate::tui::theme::Theme;
use crate::types::{PlatformAggregate, PlatformMetric};

const TITLE: &str = "Platform Comparison";

/// Width of the legend column when shown beside the plot
const LEGEND_WIDTH: u16 = 20;

/// Raw metric value as shown above its bar
pub fn format_metric(metric: PlatformMetric, value: f64) -> String {
    match metric {
        PlatformMetric::TotalSales => format_currency_whole(value),
        PlatformMetric::AvgOrderValue => format_currency(value),
        PlatformMetric::TotalItems | PlatformMetric::OrderCount => {
            format_number(value.round() as u64)
        }
    }
}

fn percent_label(v: f64) -> String {
    format!("{:.0}%", v * 100.0)
}

/// Column ranges for one platform group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupLayout {
    pub x: u16,
    pub width: u16,
    /// `(x, width)` of each metric bar, in `PlatformMetric::all()` order
    pub bars: Vec<(u16, u16)>,
}

/// Lay out `groups` equal groups of `bars_per_group` bars over `width` columns
pub fn group_layout(
    x: u16,
    width: u16,
    groups: usize,
    bars_per_group: usize,
) -> Vec<GroupLayout> {
    if groups == 0 || bars_per_group == 0 {
        return Vec::new();
    }
    let band = width / groups as u16;
    let n = bars_per_group as u16;
    // Outer padding keeps the groups apart; one column between bars
    let inner = (band as f64 * 0.8).round() as u16;
    let bar_width = (inner.saturating_sub(n - 1) / n).max(1);
    let used = bar_width * n + (n - 1);

    (0..groups as u16)
        .map(|g| {
            let band_x = x + g * band;
            let start = band_x + band.saturating_sub(used) / 2;
            let bars = (0..n).map(|j| (start + j * (bar_width + 1), bar_width)).collect();
            GroupLayout {
                x: band_x,
                width: band,
                bars,
            }
        })
        .collect()
}

pub struct PlatformChart<'a> {
    platforms: &'a [PlatformAggregate],
    theme: Theme,
}

impl<'a> PlatformChart<'a> {
    pub fn new(platforms: &'a [PlatformAggregate], theme: Theme) -> Self {
        Self { platforms, theme }
    }

    fn render_legend(&self, area: Rect, buf: &mut Buffer) {
        let mut x = area.x;
        let mut y = area.y;
        let vertical = area.height >= PlatformMetric::all().len() as u16;
        for (j, metric) in PlatformMetric::all().iter().enumerate() {
            if y >= area.y + area.height {
                break;
            }
            let swatch_style = Style::default().fg(self.theme.metric_color(j));
            let label = metric.label();
            let needed = label.len() as u16 + 2;
            if !vertical && x + needed > area.x + area.width {
                break;
            }
            buf.set_string(x, y, "■", swatch_style);
            buf.set_string(x + 2, y, label, Style::default().fg(self.theme.text()));
            if vertical {
                y += 1;
            } else {
                x += needed + 2;
            }
        }
    }
}

impl Widget for PlatformChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.platforms.is_empty() {
            return;
        }
        let ticks = [0.0, 0.25, 0.5, 0.75, 1.0];
        let gutter = chart::gutter_width(&ticks, percent_label) + 1;
        let side_legend = area.width >= gutter + LEGEND_WIDTH + 24;
        // title, plot (>= 4), axis, platform labels, optional legend row
        let min_height = if side_legend { 7 } else { 8 };
        if area.height < min_height || area.width < gutter + 12 {
            return;
        }
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

        let legend_rows = if side_legend { 0 } else { 1 };
        let legend_cols = if side_legend { LEGEND_WIDTH } else { 0 };
        // Two rows above the bars keep room for staggered value labels
        let plot = Rect {
            x: area.x + gutter,
            y: area.y + 3,
            width: area.width - gutter - legend_cols,
            height: area.height - 5 - legend_rows,
        };

        let muted = Style::default().fg(self.theme.muted());
        chart::render_value_axis(plot, buf, &ticks, 1.0, percent_label, muted);
        let axis_y = plot.y + plot.height;
        buf.set_string(plot.x - 1, axis_y, "└", muted);
        buf.set_string(plot.x, axis_y, "─".repeat(plot.width as usize), muted);

        let metrics = PlatformMetric::all();
        let groups = group_layout(plot.x, plot.width, self.platforms.len(), metrics.len());
        let label_area = Rect {
            x: plot.x,
            y: area.y + 1,
            width: plot.width,
            height: plot.height + 2,
        };
        let mut placer = LabelPlacer::new(label_area);

        for (group, platform) in groups.iter().zip(self.platforms) {
            for (j, (&(x, width), &metric)) in group.bars.iter().zip(metrics).enumerate() {
                let style = Style::default().fg(self.theme.metric_color(j));
                let fraction = platform.normalized(metric);
                let top = chart::render_bar(plot, buf, x, width, fraction, style).unwrap_or(axis_y);

                let raw = platform.raw(metric);
                if raw > 0.0 {
                    let text = format_metric(metric, raw);
                    placer.place(
                        buf,
                        x + width / 2,
                        top - 1,
                        &text,
                        Style::default()
                            .fg(self.theme.text())
                            .add_modifier(Modifier::BOLD),
                        2,
                    );
                }
            }

            let name = platform.platform.as_str();
            let name_x = group.x + group.width.saturating_sub(name.len() as u16) / 2;
            buf.set_string(
                name_x,
                axis_y + 1,
                name,
                Style::default()
                    .fg(self.theme.accent())
                    .add_modifier(Modifier::BOLD),
            );
        }

        let legend_area = if side_legend {
            Rect {
                x: plot.x + plot.width + 2,
                y: plot.y,
                width: LEGEND_WIDTH - 2,
                height: plot.height,
            }
        } else {
            Rect {
                x: area.x + 1,
                y: area.y + area.height - 1,
                width: area.width - 1,
                height: 1,
            }
        };
        self.render_legend(legend_area, buf);
    }
}
