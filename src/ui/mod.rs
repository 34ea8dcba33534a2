pub mod components;
mod renderfns;
mod views;

use crate::app::{App, Mode};
use ratatui::prelude::*;
use ratatui::widgets::ListState;

/// Below this width only one pane is shown
const SPLIT_MIN_WIDTH: u16 = 100;

/// Clamp the list selection to `len` items, selecting the first when unset
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  match state.selected() {
    _ if len == 0 => state.select(None),
    Some(i) if i >= len => state.select(Some(len - 1)),
    None => state.select(Some(0)),
    _ => {}
  }
}

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Panes
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  renderfns::draw_header(
    frame,
    chunks[0],
    app.title(),
    app.store_url(),
    app.browser().search_query(),
  );

  let list = app.browser().list_view();
  let detail = app.browser().detail_view();
  let detail_focused = app.browser().is_detail_focused();
  let scroll = app.detail_scroll();

  if chunks[1].width >= SPLIT_MIN_WIDTH {
    let panes = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
      .split(chunks[1]);
    views::draw_blog_list(frame, panes[0], &list, app.list_state_mut(), !detail_focused);
    views::draw_blog_detail(frame, panes[1], &detail, detail_focused, scroll);
  } else if detail_focused {
    views::draw_blog_detail(frame, chunks[1], &detail, true, scroll);
  } else {
    views::draw_blog_list(frame, chunks[1], &list, app.list_state_mut(), true);
  }

  let hints: &[(&str, &str)] = match app.mode() {
    Mode::Normal if detail_focused => &[("j/k", "scroll"), ("Esc", "back"), ("r", "refresh"), ("q", "quit")],
    Mode::Normal => &[("j/k", "nav"), ("Enter", "read"), ("/", "search"), ("n", "new"), ("q", "quit")],
    Mode::Search => &[("Enter", "keep filter"), ("Esc", "clear")],
    Mode::Create => &[("Tab", "next field"), ("Esc", "cancel")],
  };
  renderfns::draw_status_bar(
    frame,
    chunks[2],
    app.status_message(),
    app.browser().is_fetching(),
    hints,
  );

  app.search().render_overlay(frame, chunks[1]);
  if *app.mode() == Mode::Create {
    app.form().render(frame, chunks[1]);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_ensure_valid_selection() {
    let mut state = ListState::default();
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(0));

    state.select(Some(5));
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(2));

    ensure_valid_selection(&mut state, 0);
    assert_eq!(state.selected(), None);
  }
}
