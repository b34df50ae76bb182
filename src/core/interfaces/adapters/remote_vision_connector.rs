use std::sync::Arc;

use anyhow::Result;

use super::RemoteVisionClient;
use crate::core::models::ServiceCredentials;

pub trait RemoteVisionConnector: Send + Sync {
    fn connect(&self, credentials: &ServiceCredentials) -> Result<Arc<dyn RemoteVisionClient>>;
}
