use anyhow::Result;
use async_trait::async_trait;

use crate::core::models::{
    AnalysisResult, OperationHandle, OperationSnapshot, TextRecognitionMode, TextSubmission,
    VisualFeature,
};

#[async_trait]
pub trait RemoteVisionClient: Send + Sync {
    async fn analyze(
        &self,
        image_bytes: &[u8],
        features: &[VisualFeature],
    ) -> Result<AnalysisResult>;

    async fn submit_text_recognition(
        &self,
        image_bytes: &[u8],
        mode: TextRecognitionMode,
    ) -> Result<TextSubmission>;

    async fn get_operation_status(&self, handle: &OperationHandle) -> Result<OperationSnapshot>;
}
