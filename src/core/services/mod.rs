pub mod long_poll_controller;
pub mod overlay_renderer;
pub mod report_formatter;

pub use long_poll_controller::{LongPollController, PollPolicy, PollState};
pub use overlay_renderer::{render_overlay, OverlayStyle};
pub use report_formatter::{format_analysis, format_text_lines, format_text_operation};
