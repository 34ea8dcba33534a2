use blogdesk::blog::{format_date, read_minutes, Blog, DateStyle};
use blogdesk::browser::DetailView;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::ui::renderfns::category_color;

/// Draw the detail pane for the selected blog
pub fn draw_blog_detail(frame: &mut Frame, area: Rect, view: &DetailView, focused: bool, scroll: u16) {
  let title = match view {
    DetailView::Ready(blog) => format!(" {} ", blog.title),
    DetailView::Loading => " Blog (loading...) ".to_string(),
    _ => " Blog ".to_string(),
  };

  let border = if focused { Color::Blue } else { Color::DarkGray };
  let block = Block::default()
    .title(title)
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let (lines, scroll) = match view {
    DetailView::Ready(blog) => (blog_lines(blog, area.width), scroll),
    DetailView::Unselected => (dim("Select a blog to read it."), 0),
    DetailView::Loading => (dim("Loading blog..."), 0),
    DetailView::NotFound => (
      vec![
        Line::from(Span::styled("Blog not found", Style::default().fg(Color::Yellow).bold())),
        Line::raw(""),
        Line::from(Span::styled(
          "It may have been removed. Press Esc to go back.",
          Style::default().fg(Color::DarkGray),
        )),
      ],
      0,
    ),
    DetailView::Failed(e) => (
      vec![
        Line::from(Span::styled(format!("Error: {}", e), Style::default().fg(Color::Red))),
        Line::raw(""),
        Line::from(Span::styled("Press 'r' to retry.", Style::default().fg(Color::DarkGray))),
      ],
      0,
    ),
  };

  let paragraph = Paragraph::new(lines)
    .block(block)
    .wrap(Wrap { trim: false })
    .scroll((scroll, 0));
  frame.render_widget(paragraph, area);
}

fn dim(text: &str) -> Vec<Line<'static>> {
  vec![Line::from(Span::styled(
    text.to_string(),
    Style::default().fg(Color::DarkGray),
  ))]
}

fn blog_lines(blog: &Blog, width: u16) -> Vec<Line<'static>> {
  let mut lines = Vec::new();

  let mut tags: Vec<Span> = Vec::new();
  for category in &blog.category {
    tags.push(Span::styled(
      format!("[{}] ", category.to_uppercase()),
      Style::default().fg(category_color(category)).bold(),
    ));
  }
  lines.push(Line::from(tags));

  lines.push(Line::from(vec![
    Span::styled(
      format_date(&blog.date, DateStyle::Long),
      Style::default().fg(Color::Gray),
    ),
    Span::styled(
      format!("  ·  {} min read", read_minutes(&blog.content)),
      Style::default().fg(Color::DarkGray),
    ),
  ]));

  if !blog.cover_image.is_empty() {
    lines.push(Line::from(vec![
      Span::styled("Cover: ", Style::default().fg(Color::DarkGray)),
      Span::styled(blog.cover_image.clone(), Style::default().fg(Color::Blue).underlined()),
    ]));
  }

  lines.push(Line::raw(""));
  if !blog.description.is_empty() {
    lines.push(Line::from(vec![
      Span::styled("│ ", Style::default().fg(Color::Cyan)),
      Span::styled(blog.description.clone(), Style::default().italic()),
    ]));
    lines.push(Line::raw(""));
  }

  lines.push(Line::from(Span::styled(
    "─".repeat(width.saturating_sub(2) as usize),
    Style::default().fg(Color::DarkGray),
  )));

  // Keep paragraph breaks from the stored content
  for paragraph in blog.content.lines() {
    lines.push(Line::raw(paragraph.to_string()));
  }

  lines
}
