use blogdesk::blog::{format_date, read_minutes, Blog, DateStyle};
use blogdesk::browser::ListView;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{category_color, truncate};

/// Draw the blog list pane
pub fn draw_blog_list(
  frame: &mut Frame,
  area: Rect,
  view: &ListView,
  list_state: &mut ListState,
  focused: bool,
) {
  let title = match view {
    ListView::Loading => " Blogs (loading...) ".to_string(),
    ListView::Failed(_) => " Blogs (error) ".to_string(),
    ListView::Empty { .. } => " Blogs (0) ".to_string(),
    ListView::Ready(blogs) => format!(" Blogs ({}) ", blogs.len()),
  };

  let border = if focused { Color::Blue } else { Color::DarkGray };
  let block = Block::default()
    .title(title)
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let blogs = match view {
    ListView::Ready(blogs) => blogs,
    other => {
      let (content, color) = match other {
        ListView::Loading => ("Loading blogs...".to_string(), Color::DarkGray),
        ListView::Failed(e) => (
          format!("Failed to load blogs: {}\n\nPress 'r' to retry.", e),
          Color::Red,
        ),
        ListView::Empty { searching: true } => {
          ("No blogs match your search.".to_string(), Color::DarkGray)
        }
        _ => ("No blogs yet. Press 'n' to write one.".to_string(), Color::DarkGray),
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(color));
      frame.render_widget(paragraph, area);
      return;
    }
  };

  ensure_valid_selection(list_state, blogs.len());

  let width = area.width.saturating_sub(4) as usize;
  let items: Vec<ListItem> = blogs.iter().map(|blog| blog_item(blog, width)).collect();

  let list = List::new(items)
    .block(block)
    .highlight_style(
      Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

  frame.render_stateful_widget(list, area, list_state);
}

fn blog_item(blog: &Blog, width: usize) -> ListItem<'static> {
  let mut meta: Vec<Span> = Vec::new();
  for category in &blog.category {
    meta.push(Span::styled(
      format!("{} ", category.to_uppercase()),
      Style::default().fg(category_color(category)),
    ));
  }
  meta.push(Span::styled(
    format!(
      "· {} · {} min",
      format_date(&blog.date, DateStyle::Short),
      read_minutes(&blog.content)
    ),
    Style::default().fg(Color::DarkGray),
  ));

  ListItem::new(vec![
    Line::from(Span::styled(
      truncate(&blog.title, width),
      Style::default().fg(Color::White).bold(),
    )),
    Line::from(meta),
    Line::from(Span::styled(
      truncate(&blog.description, width),
      Style::default().fg(Color::Gray),
    )),
  ])
}
