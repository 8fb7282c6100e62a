//! Scene rendering.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use recall_core::display::{Scene, ANSWER_PLACEHOLDER};
use recall_core::model::StimulusKind;

use crate::theme::RecallTheme;

/// Draw one scene over the whole frame.
pub fn render_scene(frame: &mut Frame, scene: &Scene<'_>, theme: &RecallTheme) {
    let area = frame.area();
    frame.render_widget(Clear, area);
    frame.render_widget(Block::default().style(theme.text_style()), area);

    match scene {
        Scene::Message { text, .. } => render_message(frame, area, text, theme),
        Scene::WordExposure { meaning, sound } => {
            let [stimulus, label] = stacked(area, 3);
            render_stimulus(frame, stimulus, &format!("♪ {sound}"), false, theme);
            render_meaning(frame, label, meaning, theme);
        }
        Scene::SignExposure { meaning, video } => {
            let [stimulus, label] = stacked(area, 7);
            render_stimulus(frame, stimulus, &format!("▶ {video}"), true, theme);
            render_meaning(frame, label, meaning, theme);
        }
        Scene::Recall {
            kind,
            stimulus,
            prompt,
            answer,
        } => render_recall(frame, area, *kind, stimulus, prompt, answer, theme),
    }
}

/// Split a centered column into a stimulus box of `height` rows and a
/// three-row label below it.
fn stacked(area: Rect, height: u16) -> [Rect; 2] {
    let column = centered(area, 60, height + 4);
    Layout::vertical([Constraint::Length(height), Constraint::Min(3)]).areas(column)
}

/// A `width_pct` wide, `height` tall rectangle in the middle of `area`.
fn centered(area: Rect, width_pct: u16, height: u16) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height),
        Constraint::Fill(1),
    ])
    .areas(area);
    let side = (100 - width_pct.min(100)) / 2;
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage(side),
        Constraint::Percentage(width_pct),
        Constraint::Percentage(side),
    ])
    .areas(middle);
    center
}

fn render_message(frame: &mut Frame, area: Rect, text: &str, theme: &RecallTheme) {
    let paragraph = Paragraph::new(text.to_string())
        .style(theme.text_style())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, centered(area, 70, 8));
}

fn render_stimulus(frame: &mut Frame, area: Rect, label: &str, framed: bool, theme: &RecallTheme) {
    let block = if framed {
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(true))
    } else {
        Block::default()
    };
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [_, row, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(inner);
    frame.render_widget(
        Paragraph::new(Span::styled(label.to_string(), theme.stimulus_style()))
            .alignment(Alignment::Center),
        row,
    );
}

fn render_meaning(frame: &mut Frame, area: Rect, meaning: &str, theme: &RecallTheme) {
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            meaning.to_string(),
            theme.meaning_style(),
        )))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true }),
        area,
    );
}

fn render_recall(
    frame: &mut Frame,
    area: Rect,
    kind: StimulusKind,
    stimulus: &str,
    prompt: &str,
    answer: &str,
    theme: &RecallTheme,
) {
    let column = centered(area, 60, 14);
    let [stimulus_area, prompt_area, input_area] = Layout::vertical([
        Constraint::Length(7),
        Constraint::Length(2),
        Constraint::Length(3),
    ])
    .areas(column);

    match kind {
        StimulusKind::Sign => {
            render_stimulus(frame, stimulus_area, &format!("▶ {stimulus}"), true, theme)
        }
        StimulusKind::Word => render_stimulus(frame, stimulus_area, "♪ listen", false, theme),
    }

    frame.render_widget(
        Paragraph::new(Span::styled(prompt.to_string(), theme.prompt_style()))
            .alignment(Alignment::Center),
        prompt_area,
    );
    render_input(frame, input_area, answer, ANSWER_PLACEHOLDER, theme);
}

/// A bordered single-line input with a placeholder while empty.
pub fn render_input(
    frame: &mut Frame,
    area: Rect,
    content: &str,
    placeholder: &str,
    theme: &RecallTheme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style(true));

    let line = if content.is_empty() {
        Line::from(vec![
            Span::styled("> ", theme.prompt_style()),
            Span::styled(placeholder.to_string(), theme.placeholder_style()),
        ])
    } else {
        Line::from(vec![
            Span::styled("> ", theme.prompt_style()),
            Span::styled(content.to_string(), theme.answer_style()),
            Span::styled("_", Style::default().fg(theme.answer)),
        ])
    };
    frame.render_widget(Paragraph::new(line).block(block), area);
}
