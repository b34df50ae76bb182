use anyhow::Result;

use crate::core::models::ImageHandle;

pub trait DisplaySurface: Send + Sync {
    fn present(&self, image: &ImageHandle) -> Result<()>;
}
