//! Colors and styles for the session screens.

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct RecallTheme {
    pub background: Color,
    pub foreground: Color,
    pub border: Color,
    pub border_focused: Color,

    /// Meaning shown during exposure.
    pub meaning: Color,
    /// Stimulus frame (sign video, sound indicator).
    pub stimulus: Color,
    pub prompt: Color,
    pub answer: Color,
    pub placeholder: Color,
    pub error: Color,
}

impl Default for RecallTheme {
    fn default() -> Self {
        Self {
            background: Color::Reset,
            foreground: Color::White,
            border: Color::DarkGray,
            border_focused: Color::Cyan,

            meaning: Color::White,
            stimulus: Color::LightBlue,
            prompt: Color::Yellow,
            answer: Color::Cyan,
            placeholder: Color::DarkGray,
            error: Color::LightRed,
        }
    }
}

impl RecallTheme {
    pub fn text_style(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }

    pub fn meaning_style(&self) -> Style {
        Style::default()
            .fg(self.meaning)
            .add_modifier(Modifier::BOLD)
    }

    pub fn stimulus_style(&self) -> Style {
        Style::default().fg(self.stimulus)
    }

    pub fn prompt_style(&self) -> Style {
        Style::default().fg(self.prompt)
    }

    pub fn answer_style(&self) -> Style {
        Style::default().fg(self.answer).add_modifier(Modifier::BOLD)
    }

    /// Grey hint text shown in an empty input field.
    pub fn placeholder_style(&self) -> Style {
        Style::default()
            .fg(self.placeholder)
            .add_modifier(Modifier::DIM)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.border_focused)
        } else {
            Style::default().fg(self.border)
        }
    }
}
