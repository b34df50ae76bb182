use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use crate::core::models::ImageHandle;

#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn load_image(&self, path: &Path) -> Result<ImageHandle>;
}
