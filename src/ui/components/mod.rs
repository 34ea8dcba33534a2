mod blog_form;
mod input;
mod key_result;
mod search_input;

pub use blog_form::{BlogFormInput, FormEvent};
pub use key_result::KeyResult;
pub use search_input::{SearchEvent, SearchInput};

/// `percent`% of a terminal dimension, without overflowing on wide terminals
fn percent_of(dimension: u16, percent: u16) -> u16 {
  (u32::from(dimension) * u32::from(percent) / 100) as u16
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_percent_of_wide_terminal() {
    assert_eq!(percent_of(100, 70), 70);
    assert_eq!(percent_of(1000, 70), 700);
    assert_eq!(percent_of(u16::MAX, 60), 39321);
  }
}
