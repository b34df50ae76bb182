use serde::{Deserialize, Serialize};

use super::VisionError;

const POLYGON_VALUE_COUNT: usize = 8;

/// A detection area reported by the remote service, in source image pixels.
///
/// Polygons carry four points clockwise from the top-left corner, flattened
/// as `[x0, y0, x1, y1, x2, y2, x3, y3]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectionRegion {
    AxisAligned {
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    },
    Polygon {
        points: Vec<f64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    pub fn new(value: f64) -> Result<Self, VisionError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(VisionError::InvalidScale(value));
        }
        Ok(Self(value))
    }

    pub fn from_dpi(target_dpi: f64, source_dpi: f64) -> Result<Self, VisionError> {
        log::debug!(
            "[GEOMETRY] computing scale for target_dpi={} source_dpi={}",
            target_dpi,
            source_dpi
        );
        Self::new(target_dpi / source_dpi)
    }

    pub fn identity() -> Self {
        Self(1.0)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    #[cfg(test)]
    pub fn intersects(&self, other: &DisplayRect) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// Maps a source-space region onto the display raster.
///
/// Degenerate results are returned as-is; callers drawing them decide what
/// to skip.
pub fn to_display_rect(
    region: &DetectionRegion,
    scale: ScaleFactor,
) -> Result<DisplayRect, VisionError> {
    let s = scale.value();

    match region {
        DetectionRegion::AxisAligned {
            left,
            top,
            width,
            height,
        } => {
            ensure_finite(&[*left, *top, *width, *height])?;
            Ok(DisplayRect::new(left * s, top * s, width * s, height * s))
        }
        DetectionRegion::Polygon { points } => {
            if points.len() < POLYGON_VALUE_COUNT {
                return Err(VisionError::InvalidRegion(format!(
                    "polygon needs {} values, got {}",
                    POLYGON_VALUE_COUNT,
                    points.len()
                )));
            }
            let corners = &points[..POLYGON_VALUE_COUNT];
            ensure_finite(corners)?;

            let (x0, y0) = (corners[0], corners[1]);
            let y1 = corners[3];
            let (x2, y2) = (corners[4], corners[5]);

            Ok(DisplayRect::new(x0 * s, y0 * s, (x2 - x0) * s, (y2 - y1) * s))
        }
    }
}

fn ensure_finite(values: &[f64]) -> Result<(), VisionError> {
    if values.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(VisionError::InvalidRegion(format!(
            "non-finite coordinate in {:?}",
            values
        )))
    }
}
