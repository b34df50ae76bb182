mod analysis;
mod credentials;
mod error;
mod geometry;
mod image_handle;
mod operation;
mod report;
mod user_settings;

pub use analysis::{
    AnalysisResult, Category, ColorFacet, DescriptionFacet, FaceRegion, ImageTag, ImageTypeFacet,
    TextLine, TextRecognitionMode, VisualFeature,
};
#[cfg(test)]
pub use analysis::{Caption, CategoryDetail, Celebrity, Landmark};
pub use credentials::ServiceCredentials;
pub use error::VisionError;
pub use geometry::{to_display_rect, DetectionRegion, DisplayRect, ScaleFactor};
pub use image_handle::ImageHandle;
pub use operation::{OperationHandle, OperationSnapshot, OperationStatus, TextSubmission};
pub use report::{FormattedTextLine, ReportEntry, ReportSection, SectionKind};
#[cfg(test)]
pub use report::ReportDetail;
pub use user_settings::UserSettings;
