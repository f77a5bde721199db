//! Page and terminal rendering

pub mod home;
pub mod html;
pub mod text;

pub use home::home_page;
pub use html::{comparison_page, index_page, search_page};
pub use text::render_comparison;
