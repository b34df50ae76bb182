use crate::core::models::{
    to_display_rect, AnalysisResult, Category, ColorFacet, DescriptionFacet, FaceRegion,
    FormattedTextLine, ImageTag, ImageTypeFacet, OperationSnapshot, ReportEntry, ReportSection,
    ScaleFactor, SectionKind, TextLine, VisionError,
};

const NONE_LABEL: &str = "None";
const LIST_SEPARATOR: &str = ", ";

pub fn clip_art_label(code: i32) -> &'static str {
    match code {
        1 => "Ambiguous",
        2 => "Normal",
        3 => "Good",
        _ => "Non-Clipart",
    }
}

pub fn line_drawing_label(code: i32) -> &'static str {
    match code {
        1 => "Yes",
        _ => "No",
    }
}

/// Builds the report for an analysis. Sections follow a fixed order and
/// absent facets produce no section at all.
pub fn format_analysis(result: &AnalysisResult) -> Vec<ReportSection> {
    let mut sections = Vec::new();

    if let Some(image_type) = &result.image_type {
        sections.push(image_type_section(image_type));
    }
    if let Some(color) = &result.color {
        sections.push(color_section(color));
    }
    if let Some(categories) = &result.categories {
        sections.push(categories_section(categories));
    }
    if let Some(description) = &result.description {
        sections.push(description_section(description));
    }
    if let Some(tags) = &result.tags {
        sections.push(tags_section(tags));
    }
    if let Some(faces) = &result.faces {
        sections.push(faces_section(faces));
    }

    log::debug!("[FORMATTER] built {} report sections", sections.len());
    sections
}

/// Pairs each recognized line with its overlay rectangle, keeping the
/// order the service returned.
pub fn format_text_lines(
    lines: &[TextLine],
    scale: ScaleFactor,
) -> Result<Vec<FormattedTextLine>, VisionError> {
    lines
        .iter()
        .map(|line| {
            Ok(FormattedTextLine {
                text: line.text.clone(),
                bounds: to_display_rect(&line.bounding_box, scale)?,
            })
        })
        .collect()
}

pub fn format_text_operation(snapshot: &OperationSnapshot, attempts: u32) -> ReportSection {
    if !snapshot.status.is_terminal() {
        return ReportSection {
            kind: SectionKind::Text,
            entries: vec![ReportEntry::new(
                "Status",
                format!(
                    "Recognition did not finish after {} status checks (last status: {})",
                    attempts, snapshot.status
                ),
            )],
        };
    }

    let entries = snapshot
        .result
        .as_ref()
        .and_then(|result| result.text_lines.as_ref())
        .map(|lines| {
            lines
                .iter()
                .enumerate()
                .map(|(index, line)| ReportEntry::new(format!("Line {}", index + 1), &line.text))
                .collect()
        })
        .unwrap_or_default();

    ReportSection {
        kind: SectionKind::Text,
        entries,
    }
}

fn image_type_section(image_type: &ImageTypeFacet) -> ReportSection {
    ReportSection {
        kind: SectionKind::ImageType,
        entries: vec![
            ReportEntry::new("Clip Art Type", clip_art_label(image_type.clip_art_type)),
            ReportEntry::new(
                "Line Drawing",
                line_drawing_label(image_type.line_drawing_type),
            ),
        ],
    }
}

fn color_section(color: &ColorFacet) -> ReportSection {
    let or_none = |value: &Option<String>| value.clone().unwrap_or_else(|| NONE_LABEL.to_string());

    ReportSection {
        kind: SectionKind::Color,
        entries: vec![
            ReportEntry::new("Foreground", or_none(&color.dominant_color_foreground)),
            ReportEntry::new("Background", or_none(&color.dominant_color_background)),
            ReportEntry::new("Dominant", join_or_none(&color.dominant_colors)),
            ReportEntry::new("Accent", or_none(&color.accent_color)),
            ReportEntry::new(
                "Black and White",
                if color.is_black_and_white { "Yes" } else { "No" },
            ),
        ],
    }
}

fn categories_section(categories: &[Category]) -> ReportSection {
    let entries = categories
        .iter()
        .map(|category| {
            let detail = category.detail.as_ref();
            let celebrities: Vec<String> = detail
                .and_then(|detail| detail.celebrities.as_ref())
                .map(|items| items.iter().map(|item| item.name.clone()).collect())
                .unwrap_or_default();
            let landmarks: Vec<String> = detail
                .and_then(|detail| detail.landmarks.as_ref())
                .map(|items| items.iter().map(|item| item.name.clone()).collect())
                .unwrap_or_default();

            ReportEntry::new(
                "Category",
                format!("{} (score {:.2})", category.name, category.score),
            )
            .with_detail("Celebrities", celebrities)
            .with_detail("Landmarks", landmarks)
        })
        .collect();

    ReportSection {
        kind: SectionKind::Categories,
        entries,
    }
}

fn description_section(description: &DescriptionFacet) -> ReportSection {
    let captions: Vec<String> = description
        .captions
        .iter()
        .map(|caption| format!("{} ({:.2})", caption.text, caption.confidence))
        .collect();

    ReportSection {
        kind: SectionKind::Description,
        entries: vec![
            ReportEntry::new("Captions", join_or_none(&captions)),
            ReportEntry::new("Tags", join_or_none(&description.tags)),
        ],
    }
}

fn tags_section(tags: &[ImageTag]) -> ReportSection {
    let names: Vec<String> = tags.iter().map(|tag| tag.name.clone()).collect();

    ReportSection {
        kind: SectionKind::Tags,
        entries: vec![ReportEntry::new("Tags", join_or_none(&names))],
    }
}

fn faces_section(faces: &[FaceRegion]) -> ReportSection {
    let entries = faces
        .iter()
        .enumerate()
        .map(|(index, face)| {
            ReportEntry::new(format!("Face {}", index + 1), describe_region(face))
        })
        .collect();

    ReportSection {
        kind: SectionKind::Faces,
        entries,
    }
}

fn describe_region(face: &FaceRegion) -> String {
    match to_display_rect(&face.region, ScaleFactor::identity()) {
        Ok(rect) => format!(
            "left={} top={} width={} height={}",
            rect.x, rect.y, rect.width, rect.height
        ),
        Err(error) => format!("unusable region ({})", error),
    }
}

fn join_or_none(values: &[String]) -> String {
    if values.is_empty() {
        NONE_LABEL.to_string()
    } else {
        values.join(LIST_SEPARATOR)
    }
}
