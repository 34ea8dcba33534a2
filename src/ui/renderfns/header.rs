use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use url::Url;

/// Draw the header bar with title, store host, and shortcuts
pub fn draw_header(frame: &mut Frame, area: Rect, title: &str, store_url: &str, query: &str) {
  let host = extract_host(store_url);

  let mut spans = vec![
    Span::styled(format!(" {} ", title), Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", host), Style::default().fg(Color::White)),
  ];
  if !query.is_empty() {
    spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(
      format!(" /{} ", query),
      Style::default().fg(Color::Yellow).bold(),
    ));
  }
  spans.push(Span::raw("  "));

  // Keys highlighted, descriptions dimmed
  for (key, desc) in [("</>", "search"), ("<n>", "new"), ("<r>", "refresh"), ("<q>", "quit")] {
    spans.push(Span::styled(key, Style::default().fg(Color::Cyan)));
    spans.push(Span::styled(format!(" {}   ", desc), Style::default().fg(Color::DarkGray)));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

/// Host (and port) part of the store URL, or the raw text if it doesn't parse
fn extract_host(store_url: &str) -> String {
  let Ok(url) = Url::parse(store_url) else {
    return store_url.to_string();
  };
  match (url.host_str(), url.port()) {
    (Some(host), Some(port)) => format!("{}:{}", host, port),
    (Some(host), None) => host.to_string(),
    (None, _) => store_url.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_extract_host() {
    assert_eq!(extract_host("http://localhost:3001"), "localhost:3001");
    assert_eq!(extract_host("https://api.example.com/v1"), "api.example.com");
    assert_eq!(extract_host("https://api.example.com:443/"), "api.example.com");
    assert_eq!(extract_host("HTTP://User@Blogs.Example:8080"), "blogs.example:8080");
    assert_eq!(extract_host("blogs.internal"), "blogs.internal");
  }
}
