pub mod footer;
pub mod header;
pub mod utils;

pub use footer::draw_status_bar;
pub use header::draw_header;
pub use utils::{category_color, truncate};
