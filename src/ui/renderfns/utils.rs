use ratatui::prelude::Color;

const CATEGORY_COLORS: [Color; 6] = [
  Color::Cyan,
  Color::Magenta,
  Color::Green,
  Color::Yellow,
  Color::Blue,
  Color::LightRed,
];

/// Truncate a string to a maximum number of chars, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Stable color for a category tag, independent of case
pub fn category_color(category: &str) -> Color {
  let sum = category
    .chars()
    .flat_map(char::to_lowercase)
    .fold(0usize, |acc, c| acc.wrapping_add(c as usize));
  CATEGORY_COLORS[sum % CATEGORY_COLORS.len()]
}
