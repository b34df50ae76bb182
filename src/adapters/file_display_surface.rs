use std::path::PathBuf;

use anyhow::{Context, Result};
use image::ImageFormat;

use crate::core::interfaces::ports::DisplaySurface;
use crate::core::models::ImageHandle;

/// Presents an overlay by writing it to a PNG file and, when asked, handing
/// the file to the desktop's default viewer.
pub struct FileDisplaySurface {
    output_path: PathBuf,
    open_in_viewer: bool,
}

impl FileDisplaySurface {
    pub fn new(output_path: PathBuf, open_in_viewer: bool) -> Self {
        Self {
            output_path,
            open_in_viewer,
        }
    }

    pub fn output_path(&self) -> &std::path::Path {
        &self.output_path
    }
}

impl DisplaySurface for FileDisplaySurface {
    fn present(&self, image: &ImageHandle) -> Result<()> {
        log::debug!(
            "[DISPLAY] writing {}x{} overlay to {:?}",
            image.width,
            image.height,
            self.output_path
        );

        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        image
            .pixels()
            .save_with_format(&self.output_path, ImageFormat::Png)
            .with_context(|| format!("Failed to write {}", self.output_path.display()))?;

        log::info!("[DISPLAY] overlay saved to {:?}", self.output_path);

        if self.open_in_viewer {
            open::that(&self.output_path).with_context(|| {
                format!("Failed to open {} in viewer", self.output_path.display())
            })?;
        }

        Ok(())
    }
}
