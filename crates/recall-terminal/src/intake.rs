//! Participant intake dialog.
//!
//! Asks for the participant id and hearing status before a session starts.
//! Enter on the id field moves to the hearing field; enter there submits.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use recall_core::model::{Hearing, Participant};

use crate::render::render_input;
use crate::theme::RecallTheme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Hearing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeOutcome {
    Editing,
    Submitted(Participant),
    Cancelled,
}

/// State of the intake dialog.
#[derive(Debug, Clone)]
pub struct IntakeForm {
    id: String,
    hearing: Hearing,
    focus: Field,
    error: Option<String>,
}

impl Default for IntakeForm {
    fn default() -> Self {
        Self::new()
    }
}

impl IntakeForm {
    pub fn new() -> Self {
        Self {
            id: String::new(),
            hearing: Hearing::Hearing,
            focus: Field::Id,
            error: None,
        }
    }

    /// Pre-fill the id, e.g. from the command line.
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn hearing(&self) -> Hearing {
        self.hearing
    }

    pub fn focus(&self) -> Field {
        self.focus
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> IntakeOutcome {
        if key.kind != KeyEventKind::Press {
            return IntakeOutcome::Editing;
        }
        let ctrl_c =
            key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
        if key.code == KeyCode::Esc || ctrl_c {
            return IntakeOutcome::Cancelled;
        }

        match (self.focus, key.code) {
            (_, KeyCode::Tab | KeyCode::Down | KeyCode::Up | KeyCode::BackTab) => {
                self.toggle_focus()
            }
            (Field::Id, KeyCode::Char(c)) => {
                self.id.push(c);
                self.error = None;
            }
            (Field::Id, KeyCode::Backspace) => {
                self.id.pop();
                self.error = None;
            }
            (Field::Id, KeyCode::Enter) => self.focus = Field::Hearing,
            (Field::Hearing, KeyCode::Char('y' | 'Y')) => self.hearing = Hearing::Hearing,
            (Field::Hearing, KeyCode::Char('n' | 'N')) => self.hearing = Hearing::Deaf,
            (Field::Hearing, KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')) => {
                self.hearing = match self.hearing {
                    Hearing::Hearing => Hearing::Deaf,
                    Hearing::Deaf => Hearing::Hearing,
                }
            }
            (Field::Hearing, KeyCode::Enter) => return self.submit(),
            _ => {}
        }
        IntakeOutcome::Editing
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Field::Id => Field::Hearing,
            Field::Hearing => Field::Id,
        };
    }

    fn submit(&mut self) -> IntakeOutcome {
        match Participant::new(&self.id, self.hearing) {
            Ok(participant) => IntakeOutcome::Submitted(participant),
            Err(e) => {
                self.error = Some(e.to_string());
                self.focus = Field::Id;
                IntakeOutcome::Editing
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, theme: &RecallTheme) {
        let area = frame.area();
        frame.render_widget(Clear, area);

        let dialog = dialog_area(area);
        let block = Block::default()
            .title(" Participant ")
            .borders(Borders::ALL)
            .border_style(theme.border_style(true));
        let inner = block.inner(dialog);
        frame.render_widget(block, dialog);

        let [id_label, id_input, hearing_row, error_row, help_row] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .areas(inner);

        frame.render_widget(
            Paragraph::new(Span::styled("PID", theme.prompt_style())),
            id_label,
        );
        render_input(frame, id_input, &self.id, "participant id", theme);

        let option = |label: &'static str, value: Hearing| {
            let style = if self.hearing == value {
                theme.answer_style()
            } else {
                theme.placeholder_style()
            };
            let marker = if self.hearing == value { "(x) " } else { "( ) " };
            Span::styled(format!("{marker}{label}"), style)
        };
        let label_style = theme.border_style(self.focus == Field::Hearing);
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("Hearing: ", label_style),
                option("yes", Hearing::Hearing),
                Span::raw("  "),
                option("no", Hearing::Deaf),
            ])),
            hearing_row,
        );

        if let Some(error) = &self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(error.clone(), theme.error_style())),
                error_row,
            );
        }

        frame.render_widget(
            Paragraph::new("Tab: switch field  Enter: continue  Esc: quit")
                .style(theme.placeholder_style())
                .alignment(Alignment::Center),
            help_row,
        );
    }
}

fn dialog_area(area: Rect) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(11),
        Constraint::Fill(1),
    ])
    .areas(area);
    let [_, center, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(56),
        Constraint::Fill(1),
    ])
    .areas(middle);
    center
}
