pub mod file_display_surface;
pub mod file_image_source;
pub mod rest_vision_client;
pub mod tokio_sleeper;

pub use file_display_surface::FileDisplaySurface;
pub use file_image_source::FileImageSource;
pub use rest_vision_client::{RestRoutes, RestVisionConnector};
pub use tokio_sleeper::TokioSleeper;
