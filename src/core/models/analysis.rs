use std::fmt;

use serde::{Deserialize, Serialize};

use super::DetectionRegion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualFeature {
    ImageType,
    Color,
    Categories,
    Description,
    Tags,
    Faces,
}

impl VisualFeature {
    pub fn as_query_value(&self) -> &'static str {
        match self {
            VisualFeature::ImageType => "image_type",
            VisualFeature::Color => "color",
            VisualFeature::Categories => "categories",
            VisualFeature::Description => "description",
            VisualFeature::Tags => "tags",
            VisualFeature::Faces => "faces",
        }
    }

    pub fn default_set() -> Vec<VisualFeature> {
        vec![
            VisualFeature::Categories,
            VisualFeature::Description,
            VisualFeature::Faces,
            VisualFeature::ImageType,
            VisualFeature::Tags,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextRecognitionMode {
    #[default]
    Printed,
    Handwritten,
}

impl fmt::Display for TextRecognitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextRecognitionMode::Printed => write!(f, "printed"),
            TextRecognitionMode::Handwritten => write!(f, "handwritten"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageTypeFacet {
    pub clip_art_type: i32,
    #[serde(default)]
    pub line_drawing_type: i32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorFacet {
    pub dominant_color_foreground: Option<String>,
    pub dominant_color_background: Option<String>,
    pub dominant_colors: Vec<String>,
    pub accent_color: Option<String>,
    pub is_black_and_white: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Celebrity {
    pub name: String,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub name: String,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryDetail {
    pub celebrities: Option<Vec<Celebrity>>,
    pub landmarks: Option<Vec<Landmark>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub detail: Option<CategoryDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    pub text: String,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptionFacet {
    pub captions: Vec<Caption>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageTag {
    pub name: String,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceRegion {
    pub region: DetectionRegion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    pub bounding_box: DetectionRegion,
}

/// Findings returned by the remote service. Facets that were not requested
/// (or that the service omitted) are `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    pub image_type: Option<ImageTypeFacet>,
    pub color: Option<ColorFacet>,
    pub categories: Option<Vec<Category>>,
    pub description: Option<DescriptionFacet>,
    pub tags: Option<Vec<ImageTag>>,
    pub faces: Option<Vec<FaceRegion>>,
    pub text_lines: Option<Vec<TextLine>>,
}

impl AnalysisResult {
    pub fn face_regions(&self) -> impl Iterator<Item = &DetectionRegion> {
        self.faces
            .iter()
            .flatten()
            .map(|face| &face.region)
    }
}
