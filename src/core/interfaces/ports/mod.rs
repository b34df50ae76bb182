mod display_surface;
mod image_source;
mod sleeper;

pub use display_surface::DisplaySurface;
pub use image_source::ImageSource;
pub use sleeper::Sleeper;
