// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared fixtures for unit tests.

use bildwerk_core::ImageEntry;
use image::{ImageFormat, Rgb, RgbImage};

/// An image whose pixels encode their own coordinates.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

pub fn png_bytes(image: &RgbImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("PNG encoding of a test fixture");
    bytes
}

/// An in-memory entry holding `image` with default parameters.
pub fn entry_for(image: &RgbImage) -> ImageEntry {
    ImageEntry::from_bytes(png_bytes(image))
}

/// An in-memory entry of a single flat colour.
pub fn solid_entry(width: u32, height: u32, colour: [u8; 3]) -> ImageEntry {
    entry_for(&RgbImage::from_pixel(width, height, Rgb(colour)))
}

/// Channel-wise comparison with a small tolerance for resampling round-off.
pub fn close_to(pixel: &image::Rgb<u8>, expected: [u8; 3]) -> bool {
    pixel
        .0
        .iter()
        .zip(expected)
        .all(|(&actual, wanted)| actual.abs_diff(wanted) <= 2)
}
