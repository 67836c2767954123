//! Loading spinner widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::tui::theme::Theme;

/// Spinner animation frames
const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// App branding
const APP_NAME: &str = "salesboard";
const TAGLINE: &str = "Sourcing task dashboard";

/// What the app is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingStage {
    Tasks,
    Task,
    Records,
}

impl LoadingStage {
    pub fn message(self) -> &'static str {
        match self {
            Self::Tasks => "Loading tasks...",
            Self::Task => "Loading task...",
            Self::Records => "Fetching records...",
        }
    }
}

/// Loading spinner widget
pub struct Spinner {
    frame: usize,
    stage: LoadingStage,
    theme: Theme,
    branded: bool,
}

impl Spinner {
    pub fn new(frame: usize, stage: LoadingStage, theme: Theme) -> Self {
        Self {
            frame,
            stage,
            theme,
            branded: true,
        }
    }

    /// Only the spinner line, without name and tagline
    pub fn compact(mut self) -> Self {
        self.branded = false;
        self
    }

    /// Get the current spinner character
    pub fn current_char(&self) -> char {
        SPINNER_FRAMES[self.frame % SPINNER_FRAMES.len()]
    }

    /// Advance to next frame, returning the new frame index
    pub fn next_frame(frame: usize) -> usize {
        (frame + 1) % SPINNER_FRAMES.len()
    }
}

impl Widget for Spinner {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let spinner_text = format!("{} {}", self.current_char(), self.stage.message());
        let spinner_style = Style::default().fg(self.theme.accent());

        if !self.branded {
            if area.height == 0 {
                return;
            }
            let y = area.y + area.height / 2;
            let x = area.x + area.width.saturating_sub(spinner_text.chars().count() as u16) / 2;
            buf.set_string(x, y, &spinner_text, spinner_style);
            return;
        }

        if area.height < 5 || area.width < 35 {
            return;
        }

        // name, tagline, blank, spinner
        let center_y = area.y + area.height / 2;

        let name_y = center_y.saturating_sub(2);
        let name_x = area.x + (area.width.saturating_sub(APP_NAME.len() as u16)) / 2;
        buf.set_string(
            name_x,
            name_y,
            APP_NAME,
            Style::default()
                .fg(self.theme.text())
                .add_modifier(Modifier::BOLD),
        );

        let tag_y = name_y + 1;
        let tag_x = area.x + (area.width.saturating_sub(TAGLINE.len() as u16)) / 2;
        buf.set_string(
            tag_x,
            tag_y,
            TAGLINE,
            Style::default().fg(self.theme.muted()),
        );

        let spinner_y = tag_y + 2;
        let spinner_x =
            area.x + (area.width.saturating_sub(spinner_text.chars().count() as u16)) / 2;
        buf.set_string(spinner_x, spinner_y, &spinner_text, spinner_style);
    }
}
