//! Terminal theme detection and color definitions

use ratatui::style::Color;

use crate::services::ThemeChoice;
use crate::types::TaskStatus;

/// Terminal color scheme (dark or light background)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Auto-detect terminal theme from background luminance.
    /// Must be called **before** entering raw mode (ratatui::init).
    /// Falls back to Dark if detection fails.
    pub fn detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.6 => Self::Light,
            _ => Self::Dark,
        }
    }

    /// Resolve a configured preference; `Auto` probes the terminal
    pub fn resolve(choice: ThemeChoice) -> Self {
        match choice {
            ThemeChoice::Auto => Self::detect(),
            ThemeChoice::Dark => Self::Dark,
            ThemeChoice::Light => Self::Light,
        }
    }

    /// Primary text color (headers, body text)
    pub fn text(self) -> Color {
        match self {
            Self::Dark => Color::White,
            Self::Light => Color::Black,
        }
    }

    /// Selection, keybinding keys, focused filter
    pub fn accent(self) -> Color {
        match self {
            Self::Dark => Color::Cyan,
            Self::Light => Color::Indexed(25), // dark blue (ANSI 256)
        }
    }

    /// Separators, axes, hints
    pub fn muted(self) -> Color {
        match self {
            Self::Dark => Color::DarkGray,
            Self::Light => Color::Gray,
        }
    }

    /// Month and date labels
    pub fn date(self) -> Color {
        match self {
            Self::Dark => Color::Yellow,
            Self::Light => Color::Indexed(130),
        }
    }

    /// Currency values
    pub fn money(self) -> Color {
        match self {
            Self::Dark => Color::Magenta,
            Self::Light => Color::Indexed(90),
        }
    }

    pub fn error(self) -> Color {
        match self {
            Self::Dark => Color::Red,
            Self::Light => Color::Indexed(124),
        }
    }

    pub fn primary(self) -> Color {
        match self {
            Self::Dark => Color::Indexed(69),
            Self::Light => Color::Indexed(25),
        }
    }

    pub fn primary_light(self) -> Color {
        match self {
            Self::Dark => Color::Indexed(111),
            Self::Light => Color::Indexed(68),
        }
    }

    pub fn info(self) -> Color {
        match self {
            Self::Dark => Color::Cyan,
            Self::Light => Color::Indexed(30),
        }
    }

    pub fn success(self) -> Color {
        match self {
            Self::Dark => Color::Green,
            Self::Light => Color::Indexed(22),
        }
    }

    pub fn warning(self) -> Color {
        match self {
            Self::Dark => Color::Indexed(214),
            Self::Light => Color::Indexed(166),
        }
    }

    pub fn secondary(self) -> Color {
        match self {
            Self::Dark => Color::Indexed(246),
            Self::Light => Color::Indexed(240),
        }
    }

    /// Cyclic bar palette; bar `i` takes `bar_color(i)`
    pub fn bar_color(self, index: usize) -> Color {
        let palette = [
            self.primary(),
            self.primary_light(),
            self.info(),
            self.success(),
            self.warning(),
            self.secondary(),
            self.error(),
        ];
        palette[index % palette.len()]
    }

    /// One color per platform metric, in `PlatformMetric::all()` order
    pub fn metric_color(self, index: usize) -> Color {
        let palette = [self.primary(), self.info(), self.success(), self.warning()];
        palette[index % palette.len()]
    }

    /// Status badge color
    pub fn status(self, status: TaskStatus) -> Color {
        match status {
            TaskStatus::Pending => self.warning(),
            TaskStatus::InProgress => self.info(),
            TaskStatus::Completed => self.success(),
            TaskStatus::Failed => self.error(),
        }
    }
}
