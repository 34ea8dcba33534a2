use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the status bar: a message on the left, context hints after it
pub fn draw_status_bar(
  frame: &mut Frame,
  area: Rect,
  message: Option<&str>,
  fetching: bool,
  hints: &[(&str, &str)],
) {
  let mut spans = vec![Span::raw(" ")];

  if fetching {
    spans.push(Span::styled("syncing ", Style::default().fg(Color::Yellow)));
  }
  if let Some(message) = message {
    spans.push(Span::styled(message.to_string(), Style::default().fg(Color::White).bold()));
    spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
  }

  for (i, (key, desc)) in hints.iter().enumerate() {
    if i > 0 {
      spans.push(Span::raw("  "));
    }
    spans.push(Span::styled(key.to_string(), Style::default().fg(Color::Cyan)));
    spans.push(Span::styled(format!(":{}", desc), Style::default().fg(Color::DarkGray)));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}
