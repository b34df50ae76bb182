use std::fmt;

use super::DisplayRect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    ImageType,
    Color,
    Categories,
    Description,
    Tags,
    Faces,
    Text,
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionKind::ImageType => write!(f, "Image Type"),
            SectionKind::Color => write!(f, "Color"),
            SectionKind::Categories => write!(f, "Categories"),
            SectionKind::Description => write!(f, "Description"),
            SectionKind::Tags => write!(f, "Tags"),
            SectionKind::Faces => write!(f, "Faces"),
            SectionKind::Text => write!(f, "Text"),
        }
    }
}

/// A labelled sub-list under a report entry. An empty `values` list renders
/// as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDetail {
    pub label: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub label: String,
    pub value: String,
    pub details: Vec<ReportDetail>,
}

impl ReportEntry {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            details: Vec::new(),
        }
    }

    pub fn with_detail(mut self, label: impl Into<String>, values: Vec<String>) -> Self {
        self.details.push(ReportDetail {
            label: label.into(),
            values,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub kind: SectionKind,
    pub entries: Vec<ReportEntry>,
}

/// A recognized text line paired with its overlay rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedTextLine {
    pub text: String,
    pub bounds: DisplayRect,
}
