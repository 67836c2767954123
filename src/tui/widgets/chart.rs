//! Drawing primitives shared by the chart views: value axis ticks,
//! vertical bars with eighth-block precision, and collision-free labels.

use ratatui::{buffer::Buffer, layout::Rect, style::Style};

/// Nominal pixel width of one terminal cell, for pixel-based density rules
pub const CELL_PX: u16 = 8;

/// Partial blocks, one to seven eighths
const EIGHTHS: [&str; 7] = ["▁", "▂", "▃", "▄", "▅", "▆", "▇"];

/// Step between ticks: 1, 2 or 5 times a power of ten, about `count` ticks over `max`
pub fn tick_step(max: f64, count: usize) -> f64 {
    if max <= 0.0 || count == 0 {
        return 0.0;
    }
    let raw = max / count as f64;
    let power = 10f64.powf(raw.log10().floor());
    let error = raw / power;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * power
}

/// Tick values from zero up to `max` inclusive
pub fn value_ticks(max: f64, count: usize) -> Vec<f64> {
    let step = tick_step(max, count);
    if step <= 0.0 {
        return vec![0.0];
    }
    let n = (max / step).floor() as usize;
    (0..=n).map(|i| i as f64 * step).collect()
}

/// Row of `value` in a plot of `plot` height scaled to `[0, max]`
pub fn value_row(plot: Rect, value: f64, max: f64) -> u16 {
    let bottom = plot.y + plot.height.saturating_sub(1);
    if max <= 0.0 || plot.height == 0 {
        return bottom;
    }
    let frac = (value / max).clamp(0.0, 1.0);
    bottom - (frac * plot.height.saturating_sub(1) as f64).round() as u16
}

/// Draw tick labels right-aligned left of `plot`, with a `┤` on the axis
pub fn render_value_axis<F>(
    plot: Rect,
    buf: &mut Buffer,
    ticks: &[f64],
    max: f64,
    label: F,
    style: Style,
) where
    F: Fn(f64) -> String,
{
    if plot.x == 0 {
        return;
    }
    let axis_x = plot.x - 1;
    for y in plot.y..plot.y + plot.height {
        buf.set_string(axis_x, y, "│", style);
    }
    for &tick in ticks {
        let y = value_row(plot, tick, max);
        let text = label(tick);
        let width = text.chars().count() as u16;
        buf.set_string(axis_x, y, "┤", style);
        let x = axis_x.saturating_sub(width);
        buf.set_string(x, y, &text, style);
    }
}

/// Widest tick label, used to size the axis gutter
pub fn gutter_width<F: Fn(f64) -> String>(ticks: &[f64], label: F) -> u16 {
    ticks
        .iter()
        .map(|&t| label(t).chars().count() as u16)
        .max()
        .unwrap_or(0)
        + 1
}

/// Draw a vertical bar filling `fraction` of `plot`'s height over columns
/// `x..x+width`. Returns the topmost row touched, or `None` for a zero bar.
pub fn render_bar(
    plot: Rect,
    buf: &mut Buffer,
    x: u16,
    width: u16,
    fraction: f64,
    style: Style,
) -> Option<u16> {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let eighths = (fraction * plot.height as f64 * 8.0).round() as u16;
    if eighths == 0 || width == 0 {
        return None;
    }
    let full = eighths / 8;
    let partial = eighths % 8;
    let bottom = plot.y + plot.height - 1;
    let right = (x + width).min(plot.x + plot.width);

    for row in 0..full {
        for col in x..right {
            buf.set_string(col, bottom - row, "█", style);
        }
    }
    let mut top = bottom + 1 - full;
    if partial > 0 && full < plot.height {
        top = bottom - full;
        for col in x..right {
            buf.set_string(col, top, EIGHTHS[partial as usize - 1], style);
        }
    }
    Some(top)
}

/// Places single-line labels without overwriting earlier ones; a label
/// that would collide is nudged upward, then dropped.
#[derive(Debug)]
pub struct LabelPlacer {
    area: Rect,
    taken: Vec<(u16, u16, u16)>,
}

impl LabelPlacer {
    /// Labels are kept inside `area`
    pub fn new(area: Rect) -> Self {
        Self {
            area,
            taken: Vec::new(),
        }
    }

    fn collides(&self, y: u16, x0: u16, x1: u16) -> bool {
        self.taken
            .iter()
            .any(|&(ty, tx0, tx1)| ty == y && x0 < tx1 && tx0 < x1)
    }

    /// Center `text` on `center_x` at row `y` or up to `max_lift` rows
    /// above. Returns the row used.
    pub fn place(
        &mut self,
        buf: &mut Buffer,
        center_x: u16,
        y: u16,
        text: &str,
        style: Style,
        max_lift: u16,
    ) -> Option<u16> {
        let area = self.area;
        let width = text.chars().count() as u16;
        if width == 0 || width > area.width {
            return None;
        }
        let left = center_x
            .saturating_sub(width / 2)
            .clamp(area.x, area.x + area.width - width);
        let right = left + width;

        for lift in 0..=max_lift {
            let Some(row) = y.checked_sub(lift) else {
                break;
            };
            if row < area.y || row >= area.y + area.height {
                break;
            }
            if !self.collides(row, left, right) {
                buf.set_string(left, row, text, style);
                self.taken.push((row, left, right));
                return Some(row);
            }
        }
        None
    }
}
