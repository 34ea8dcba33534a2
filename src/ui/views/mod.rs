mod blog_detail;
mod blog_list;

pub use blog_detail::draw_blog_detail;
pub use blog_list::draw_blog_list;
