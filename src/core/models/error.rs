use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum VisionError {
    #[error("no API key configured")]
    MissingCredential,

    #[error("no service endpoint configured")]
    MissingEndpoint,

    #[error("no image selected")]
    NoImageSelected,

    #[error("unable to open or read image: {0}")]
    ImageUnreadable(String),

    #[error("remote service rejected the request: {0}")]
    SubmissionError(String),

    #[error("remote operation failed: {}", .0.as_deref().unwrap_or("no reason given"))]
    RemoteOperationFailed(Option<String>),

    #[error("invalid detection region: {0}")]
    InvalidRegion(String),

    #[error("scale factor must be positive and finite, got {0}")]
    InvalidScale(f64),

    #[error("operation status query failed: {0}")]
    StatusQueryFailed(String),

    #[error("overlay of {width}x{height} pixels is too large to render")]
    OverlayTooLarge { width: u64, height: u64 },

    #[error("another operation is already in progress")]
    OperationInProgress,

    #[error("operation cancelled")]
    Cancelled,

    #[error("invalid operation state: {0}")]
    InvalidOperationState(String),
}

impl VisionError {
    /// Sentence shown to the user in the status area.
    pub fn user_message(&self) -> String {
        match self {
            VisionError::MissingCredential => "Please enter a Computer Vision API Key.".to_string(),
            VisionError::MissingEndpoint => "Please enter a Computer Vision endpoint.".to_string(),
            VisionError::NoImageSelected => "Please upload an image.".to_string(),
            VisionError::ImageUnreadable(path) => {
                format!("Unable to open or read Image Path: {}", path)
            }
            VisionError::OverlayTooLarge { .. } => {
                "The target DPI is too high for this image.".to_string()
            }
            VisionError::OperationInProgress => {
                "Please wait for the current request to finish.".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn is_precondition_failure(&self) -> bool {
        matches!(
            self,
            VisionError::MissingCredential
                | VisionError::MissingEndpoint
                | VisionError::NoImageSelected
                | VisionError::ImageUnreadable(_)
        )
    }
}
