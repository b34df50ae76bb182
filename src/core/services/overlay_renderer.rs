use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::core::models::{DisplayRect, ImageHandle, ScaleFactor, VisionError};
use crate::global_constants;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub color: [u8; 4],
    pub stroke_width: u32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            color: global_constants::DEFAULT_OVERLAY_COLOR,
            stroke_width: global_constants::DEFAULT_OVERLAY_STROKE_WIDTH,
        }
    }
}

/// Destination raster size for `base` displayed at `scale`. Canvases larger
/// than `MAX_OVERLAY_PIXELS` are rejected before anything is allocated.
pub fn destination_size(base: &ImageHandle, scale: ScaleFactor) -> Result<(u32, u32), VisionError> {
    let scaled = |pixels: u32| (pixels as f64 * scale.value()).round().max(1.0);
    let (width, height) = (scaled(base.width), scaled(base.height));

    if width * height > global_constants::MAX_OVERLAY_PIXELS as f64 {
        log::warn!(
            "[OVERLAY] refusing {}x{} canvas at scale {}",
            width,
            height,
            scale.value()
        );
        return Err(VisionError::OverlayTooLarge {
            width: width as u64,
            height: height as u64,
        });
    }

    Ok((width as u32, height as u32))
}

/// Draws `rects` (already in display space) over `base` rescaled by `scale`.
///
/// With no rectangles the base handle itself is returned, so the displayed
/// image stays pixel-identical to the loaded one.
pub fn render_overlay(
    base: &ImageHandle,
    rects: &[DisplayRect],
    scale: ScaleFactor,
    style: &OverlayStyle,
) -> Result<ImageHandle, VisionError> {
    if rects.is_empty() {
        log::debug!("[OVERLAY] nothing to draw, returning base image");
        return Ok(base.clone());
    }

    let (width, height) = destination_size(base, scale)?;
    log::info!(
        "[OVERLAY] rendering {} rectangles on {}x{} canvas (scale={})",
        rects.len(),
        width,
        height,
        scale.value()
    );

    let source = base.pixels().to_rgba8();
    let mut canvas = if (width, height) == (base.width, base.height) {
        source
    } else {
        image::imageops::resize(&source, width, height, FilterType::Triangle)
    };

    for (index, rect) in rects.iter().enumerate() {
        if rect.is_degenerate() {
            log::debug!("[OVERLAY] skipping degenerate rect {}: {:?}", index, rect);
            continue;
        }
        stroke_rect(&mut canvas, rect, style);
    }

    Ok(ImageHandle::build_from_pixels(
        DynamicImage::ImageRgba8(canvas),
        base.dpi * scale.value(),
    ))
}

fn stroke_rect(canvas: &mut RgbaImage, rect: &DisplayRect, style: &OverlayStyle) {
    let stroke = style.stroke_width.max(1) as i64;

    // Edges past the canvas are pulled to just outside it so they stay invisible.
    let clamp_x = |value: f64| (value.round() as i64).clamp(-stroke, canvas.width() as i64 + stroke);
    let clamp_y =
        |value: f64| (value.round() as i64).clamp(-stroke, canvas.height() as i64 + stroke);

    let left = clamp_x(rect.x);
    let right = clamp_x(rect.x + rect.width);
    let top = clamp_y(rect.y);
    let bottom = clamp_y(rect.y + rect.height);

    let color = Rgba(style.color);

    for inset in 0..stroke {
        let inner_width = right - left - 2 * inset;
        let inner_height = bottom - top - 2 * inset;
        if inner_width <= 0 || inner_height <= 0 {
            break;
        }

        let outline = Rect::at((left + inset) as i32, (top + inset) as i32)
            .of_size(inner_width as u32, inner_height as u32);
        draw_hollow_rect_mut(canvas, outline, color);
    }
}
