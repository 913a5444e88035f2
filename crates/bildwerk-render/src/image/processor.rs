// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decoding to RGB plus the individual crop, rotate, and
// resize steps of the page pipeline. Operates on in-memory rasters using the
// `image` crate.

use std::path::Path;

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::{CropRect, ImageSource, Rotation};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbImage};
use tracing::{debug, info, instrument};

use super::pipeline::crop_bounds;

/// Image processing steps operating on a single in-memory RGB raster.
///
/// All operations are non-destructive: each method consumes `self` and returns a
/// new `ImageProcessor` wrapping the transformed image, enabling method chaining.
///
/// ```ignore
/// let raster = ImageProcessor::open("photo.jpg")?
///     .crop(&CropRect::new(0.1, 0.1, 0.8, 0.8))
///     .rotate(Rotation::Deg90)
///     .resize_exact(400, 300)
///     .into_rgb();
/// ```
pub struct ImageProcessor {
    /// The current working image. Always 8-bit RGB; alpha is discarded on load.
    image: RgbImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    ///
    /// The format is detected from the file contents, not the extension.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|err| BildwerkError::ImageLoad {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        let processor = Self::decode(&data, &path.display().to_string())?;
        info!(
            width = processor.width(),
            height = processor.height(),
            "Image loaded"
        );
        Ok(processor)
    }

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let processor = Self::decode(data, "<memory>")?;
        debug!(
            width = processor.width(),
            height = processor.height(),
            "Image decoded from bytes"
        );
        Ok(processor)
    }

    /// Load whichever kind of source an entry points at.
    pub fn load(source: &ImageSource) -> Result<Self> {
        match source {
            ImageSource::Path(path) => Self::open(path),
            ImageSource::Bytes(bytes) => Self::from_bytes(bytes),
        }
    }

    fn decode(data: &[u8], label: &str) -> Result<Self> {
        let decoded = image::load_from_memory(data).map_err(|err| BildwerkError::ImageLoad {
            path: label.to_string(),
            reason: err.to_string(),
        })?;
        Ok(Self::from_dynamic(decoded))
    }

    /// Wrap an already-decoded `DynamicImage`, converting it to RGB.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        let image = match image {
            DynamicImage::ImageRgb8(rgb) => rgb,
            other => other.to_rgb8(),
        };
        Self { image }
    }

    /// Wrap an RGB raster as-is.
    pub fn from_rgb(image: RgbImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.image
    }

    /// Consume the processor and return the underlying raster.
    pub fn into_rgb(self) -> RgbImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Crop to a normalised rectangle.
    ///
    /// The full-image rectangle is a no-op without touching pixel data.
    /// Anything else is converted to pixel bounds and clamped to the image,
    /// so the result may be empty but is never out of bounds.
    #[instrument(skip(self), fields(x = crop.x, y = crop.y, w = crop.width, h = crop.height))]
    pub fn crop(self, crop: &CropRect) -> Self {
        if crop.is_full() {
            return self;
        }

        let bounds = crop_bounds(crop, self.image.width(), self.image.height());
        info!(
            left = bounds.left,
            top = bounds.top,
            right = bounds.right,
            bottom = bounds.bottom,
            "Cropping image"
        );

        let cropped = imageops::crop_imm(
            &self.image,
            bounds.left,
            bounds.top,
            bounds.width(),
            bounds.height(),
        )
        .to_image();
        Self { image: cropped }
    }

    /// Rotate clockwise by a right angle. Quarter turns swap width and
    /// height so no content is clipped.
    #[instrument(skip(self), fields(degrees = rotation.degrees()))]
    pub fn rotate(self, rotation: Rotation) -> Self {
        let image = match rotation {
            Rotation::Deg0 => return self,
            Rotation::Deg90 => imageops::rotate90(&self.image),
            Rotation::Deg180 => imageops::rotate180(&self.image),
            Rotation::Deg270 => imageops::rotate270(&self.image),
        };
        debug!(new_w = image.width(), new_h = image.height(), "Rotation applied");
        Self { image }
    }

    /// Resize to exactly `width` x `height` with Lanczos3 filtering.
    ///
    /// Resizing to the current size returns the image untouched; a zero
    /// dimension yields an empty raster.
    #[instrument(skip(self))]
    pub fn resize_exact(self, width: u32, height: u32) -> Self {
        if (width, height) == self.image.dimensions() {
            return self;
        }
        if width == 0 || height == 0 {
            return Self {
                image: RgbImage::new(width, height),
            };
        }
        info!(
            from_w = self.image.width(),
            from_h = self.image.height(),
            width,
            height,
            "Resizing image"
        );
        let resized = imageops::resize(&self.image, width, height, FilterType::Lanczos3);
        Self { image: resized }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| BildwerkError::ImageEncode(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Write the image to a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_png_bytes()?;
        std::fs::write(path.as_ref(), bytes)?;
        info!("Wrote PNG to {}", path.as_ref().display());
        Ok(())
    }
}
