// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page render pipeline: load → crop → rotate → scale → place on background.
//
// Page dimensions are in points and rendered at 72 DPI, so one point is one
// pixel. Every step after loading is a total function over clamped inputs;
// only decoding the source can fail.

use bildwerk_core::error::Result;
use bildwerk_core::{CropRect, ImageEntry, Rgb};
use image::{RgbImage, imageops};
use tracing::{debug, instrument, warn};

use super::processor::ImageProcessor;

/// Ceiling on the pixel area of a scaled image (16 Mpx, 48 MiB as RGB).
///
/// Larger targets are shrunk uniformly, keeping the aspect ratio, so an
/// extreme scale still renders a page instead of exhausting memory.
pub const MAX_TARGET_PIXELS: u64 = 1 << 24;

/// Scales above this are treated as this value before sizing.
const MAX_SCALE: f64 = 1.0e6;

/// Pixel bounds of a crop, `left..right` by `top..bottom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBounds {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropBounds {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

/// Convert a normalised crop to pixel bounds inside a `width` x `height` image.
///
/// Coordinates are truncated toward zero, then clamped so that
/// `left <= right <= width` and `top <= bottom <= height` always hold.
pub fn crop_bounds(crop: &CropRect, width: u32, height: u32) -> CropBounds {
    // `as u32` truncates, saturates, and maps NaN to zero.
    let to_px = |fraction: f64, dimension: u32| (fraction * f64::from(dimension)) as u32;

    let left = to_px(crop.x, width).min(width);
    let top = to_px(crop.y, height).min(height);
    let right = to_px(crop.x + crop.width, width).min(width).max(left);
    let bottom = to_px(crop.y + crop.height, height).min(height).max(top);

    CropBounds {
        left,
        top,
        right,
        bottom,
    }
}

/// Page size minus the margin on both sides of each axis.
///
/// Negative or NaN margins count as zero.
pub fn available_area(page_width: f64, page_height: f64, margin: f64) -> (f64, f64) {
    let margin = sanitize_margin(margin);
    (page_width - 2.0 * margin, page_height - 2.0 * margin)
}

/// Largest size with the image's aspect ratio that fits the available area,
/// multiplied by `scale` and truncated to whole pixels. The result never
/// exceeds [`MAX_TARGET_PIXELS`] in area.
///
/// The axis with the larger image-to-available ratio is the limiting one and
/// is filled exactly at `scale == 1.0`; the other axis follows from the aspect
/// ratio. Degenerate inputs (empty image, non-positive area) give `(0, 0)`.
pub fn fit_dimensions(
    image_width: u32,
    image_height: u32,
    available_width: f64,
    available_height: f64,
    scale: f64,
) -> (u32, u32) {
    if image_width == 0 || image_height == 0 || available_width <= 0.0 || available_height <= 0.0
    {
        return (0, 0);
    }
    // NaN slips through the comparisons above.
    if !(available_width.is_finite() && available_height.is_finite()) {
        return (0, 0);
    }

    let (img_w, img_h) = (f64::from(image_width), f64::from(image_height));
    let aspect_ratio = img_w / img_h;

    let (fit_w, fit_h) = if img_w / available_width > img_h / available_height {
        (available_width, available_width / aspect_ratio)
    } else {
        (available_height * aspect_ratio, available_height)
    };

    let scale = sanitize_scale(scale);
    bounded_size(fit_w * scale, fit_h * scale)
}

/// Final raster size for an entry whose (cropped, rotated) image is
/// `image_width` x `image_height`.
///
/// With fit-to-page the scale multiplies the fitted size; without it the
/// scale multiplies the native pixel size and the result may exceed the page.
pub fn target_dimensions(
    entry: &ImageEntry,
    image_width: u32,
    image_height: u32,
    page_width: f64,
    page_height: f64,
    margin: f64,
) -> (u32, u32) {
    if entry.fit_to_page {
        let (available_width, available_height) = available_area(page_width, page_height, margin);
        fit_dimensions(
            image_width,
            image_height,
            available_width,
            available_height,
            entry.scale,
        )
    } else {
        let scale = sanitize_scale(entry.scale);
        bounded_size(
            f64::from(image_width) * scale,
            f64::from(image_height) * scale,
        )
    }
}

/// Top-left offset of an `image_width` x `image_height` image on the page.
///
/// `(page − image) * position`, truncated toward zero. The position is
/// clamped into `[0, 1]`, but the offset is not: an image larger than the
/// page gets a negative offset and bleeds off the edges.
pub fn placement_offset(
    page_width: u32,
    page_height: u32,
    image_width: u32,
    image_height: u32,
    position_x: f64,
    position_y: f64,
) -> (i64, i64) {
    let offset = |page: u32, image: u32, position: f64| {
        let slack = i64::from(page) - i64::from(image);
        (slack as f64 * sanitize_position(position)) as i64
    };
    (
        offset(page_width, image_width, position_x),
        offset(page_height, image_height, position_y),
    )
}

/// Composite `image` onto a fresh `page_width` x `page_height` background.
///
/// Opaque overwrite; anything outside the page is clipped.
pub fn place_on_background(
    image: &RgbImage,
    page_width: u32,
    page_height: u32,
    background: Rgb,
    position_x: f64,
    position_y: f64,
) -> RgbImage {
    let mut page = blank_page(page_width, page_height, background);
    if image.width() == 0 || image.height() == 0 {
        return page;
    }

    let (x, y) = placement_offset(
        page_width,
        page_height,
        image.width(),
        image.height(),
        position_x,
        position_y,
    );
    debug!(x, y, "Placing image on page");
    imageops::replace(&mut page, image, x, y);
    page
}

/// A page filled with the background colour.
pub fn blank_page(page_width: u32, page_height: u32, background: Rgb) -> RgbImage {
    RgbImage::from_pixel(page_width, page_height, image::Rgb(background.channels()))
}

/// Pixel size of a page given in points. Fractional points are truncated.
pub fn page_pixel_size(page_width: f64, page_height: f64) -> (u32, u32) {
    (page_width as u32, page_height as u32)
}

/// Load the entry's source and render its page.
#[instrument(skip_all, fields(source = %entry.source.label()))]
pub fn render_page(
    entry: &ImageEntry,
    page_width: f64,
    page_height: f64,
    margin: f64,
    background: Rgb,
) -> Result<RgbImage> {
    let source = ImageProcessor::load(&entry.source)?.into_rgb();
    Ok(transform_image(
        source,
        entry,
        page_width,
        page_height,
        margin,
        background,
    ))
}

/// Apply crop, rotation, scaling, and placement to an already-decoded image.
pub fn transform_image(
    source: RgbImage,
    entry: &ImageEntry,
    page_width: f64,
    page_height: f64,
    margin: f64,
    background: Rgb,
) -> RgbImage {
    let processor = ImageProcessor::from_rgb(source)
        .crop(&entry.crop)
        .rotate(entry.rotation);

    let (target_w, target_h) = target_dimensions(
        entry,
        processor.width(),
        processor.height(),
        page_width,
        page_height,
        margin,
    );
    debug!(target_w, target_h, fit = entry.fit_to_page, "Scaled size");

    let scaled = processor.resize_exact(target_w, target_h).into_rgb();
    let (page_w, page_h) = page_pixel_size(page_width, page_height);
    place_on_background(
        &scaled,
        page_w,
        page_h,
        background,
        entry.position_x,
        entry.position_y,
    )
}

fn sanitize_margin(margin: f64) -> f64 {
    if margin.is_nan() || margin < 0.0 {
        warn!(margin, "Margin must be non-negative, using 0");
        0.0
    } else {
        margin
    }
}

/// Truncate a scaled size to whole pixels, shrinking it uniformly when its
/// area would exceed [`MAX_TARGET_PIXELS`].
fn bounded_size(width: f64, height: f64) -> (u32, u32) {
    let area = width * height;
    let max_area = MAX_TARGET_PIXELS as f64;
    if area <= max_area {
        return (width as u32, height as u32);
    }
    let shrink = (max_area / area).sqrt();
    let (bounded_w, bounded_h) = ((width * shrink) as u32, (height * shrink) as u32);
    warn!(
        width,
        height,
        bounded_w,
        bounded_h,
        max_pixels = MAX_TARGET_PIXELS,
        "Scaled image exceeds pixel ceiling, shrinking"
    );
    (bounded_w, bounded_h)
}

fn sanitize_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale > MAX_SCALE {
        warn!(scale, max = MAX_SCALE, "Scale too large, clamping");
        MAX_SCALE
    } else if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        warn!(scale, "Scale must be positive and finite, rendering nothing");
        0.0
    }
}

fn sanitize_position(position: f64) -> f64 {
    if position.is_nan() {
        0.5
    } else {
        position.clamp(0.0, 1.0)
    }
}
