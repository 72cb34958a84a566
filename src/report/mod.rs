//! Paginated conversation-summary documents.

pub mod layout;
pub mod render;

pub use layout::{PageCursor, LINE_HEIGHT, MARGIN, PAGE_HEIGHT, PAGE_WIDTH, WRAP_COLS};
pub use render::{render_report, report_filename, RenderError, RenderedReport};
