use super::input::{InputResult, TextInput};
use super::{percent_of, KeyResult};
use blogdesk::blog::BlogForm;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

const LABELS: [&str; 5] = [
  "Title",
  "Categories (comma separated)",
  "Description",
  "Content",
  "Cover image URL",
];

/// Events emitted by the create form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
  Submit(BlogForm),
  Cancel,
}

/// Modal form for a new blog
#[derive(Debug, Clone, Default)]
pub struct BlogFormInput {
  fields: [TextInput; 5],
  focus: usize,
  error: Option<String>,
  submitting: bool,
}

impl BlogFormInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn focus(&self) -> usize {
    self.focus
  }

  pub fn form(&self) -> BlogForm {
    BlogForm {
      title: self.fields[0].value().to_string(),
      category: self.fields[1].value().to_string(),
      description: self.fields[2].value().to_string(),
      content: self.fields[3].value().to_string(),
      cover_image: self.fields[4].value().to_string(),
    }
  }

  /// Show an error inside the form; the entered values are kept
  pub fn set_error(&mut self, error: impl Into<String>) {
    self.error = Some(error.into());
    self.submitting = false;
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  pub fn set_submitting(&mut self) {
    self.submitting = true;
    self.error = None;
  }

  fn next_field(&mut self) {
    self.focus = (self.focus + 1) % self.fields.len();
  }

  fn previous_field(&mut self) {
    self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FormEvent> {
    if self.submitting {
      return KeyResult::Handled;
    }

    match key.code {
      KeyCode::Tab | KeyCode::Down => {
        self.next_field();
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.previous_field();
        return KeyResult::Handled;
      }
      _ => {}
    }

    match self.fields[self.focus].handle_key(key) {
      InputResult::Cancelled => KeyResult::Event(FormEvent::Cancel),
      InputResult::Submitted(_) if self.focus + 1 == self.fields.len() => {
        KeyResult::Event(FormEvent::Submit(self.form()))
      }
      InputResult::Submitted(_) => {
        self.next_field();
        KeyResult::Handled
      }
      InputResult::Consumed => KeyResult::Handled,
      InputResult::NotHandled => KeyResult::NotHandled,
    }
  }

  pub fn render(&self, frame: &mut Frame, area: Rect) {
    let width = percent_of(area.width, 70).clamp(40, 90).min(area.width);
    let height = (LABELS.len() as u16 * 2 + 5).min(area.height);
    let popup = Rect::new(
      area.x + (area.width - width) / 2,
      area.y + (area.height - height) / 2,
      width,
      height,
    );

    frame.render_widget(Clear, popup);
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Cyan))
      .title(" New blog ")
      .title_bottom(Line::from(" Tab next  Shift-Tab prev  Enter on last field publishes  Esc cancel ").centered());
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let mut lines = Vec::new();
    for (i, (label, field)) in LABELS.iter().zip(self.fields.iter()).enumerate() {
      let focused = i == self.focus;
      let label_style = if focused {
        Style::default().fg(Color::Cyan).bold()
      } else {
        Style::default().fg(Color::DarkGray)
      };
      lines.push(Line::from(Span::styled(*label, label_style)));

      let mut value = vec![Span::raw(" "), Span::raw(field.value())];
      if focused {
        value.push(Span::styled("_", Style::default().fg(Color::Cyan)));
      }
      lines.push(Line::from(value));
    }

    lines.push(Line::raw(""));
    if self.submitting {
      lines.push(Line::from(Span::styled(
        "Publishing...",
        Style::default().fg(Color::Yellow),
      )));
    } else if let Some(error) = &self.error {
      lines.push(Line::from(Span::styled(
        error.as_str(),
        Style::default().fg(Color::Red),
      )));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
  }
}
