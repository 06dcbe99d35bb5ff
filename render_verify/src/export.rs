// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reading and writing grids as raster images.

use std::io::Cursor;
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, RgbaImage};

use crate::{Color, Error, FrameBuffer, Grid};

/// Write `grid` to `path` as a PNG, replacing any existing file.
///
/// Colors are clamped and encoded as 8-bit sRGB. If `include_alpha` is false every pixel
/// is written fully opaque, which is what tolerance buffers want.
pub fn save_image_as(grid: &Grid, path: &Path, include_alpha: bool) -> Result<(), Error> {
    to_rgba_image(grid, include_alpha).save_with_format(path, ImageFormat::Png)?;
    log::info!(
        "Wrote {}x{} image to {}",
        grid.width(),
        grid.height(),
        path.display()
    );
    Ok(())
}

/// Encode `grid` as an in-memory PNG.
///
/// See [`save_image_as`] for how colors are converted.
pub fn encode_png(grid: &Grid, include_alpha: bool) -> Result<Vec<u8>, Error> {
    let image = to_rgba_image(grid, include_alpha);
    let mut png_data = Vec::new();
    PngEncoder::new(Cursor::new(&mut png_data)).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(png_data)
}

/// Load a raster image (typically a stored reference) as a frame buffer.
///
/// The image is assumed to be 8-bit sRGB, and is converted to linear colors.
pub fn load_image(path: &Path) -> Result<FrameBuffer, Error> {
    let image = image::open(path)?.into_rgba8();
    let (width, height) = image.dimensions();
    let (Ok(w), Ok(h)) = (u16::try_from(width), u16::try_from(height)) else {
        return Err(Error::ImageTooLarge { width, height });
    };
    let pixels = image.pixels().map(|p| Color::from_srgb8(p.0)).collect();
    Grid::from_pixels(w, h, pixels)
}

fn to_rgba_image(grid: &Grid, include_alpha: bool) -> RgbaImage {
    let mut image = RgbaImage::new(u32::from(grid.width()), u32::from(grid.height()));
    for (x, y, color) in grid.iter() {
        let mut rgba = color.clamp().to_srgb8();
        if !include_alpha {
            rgba[3] = u8::MAX;
        }
        image.put_pixel(u32::from(x), u32::from(y), image::Rgba(rgba));
    }
    image
}

#[cfg(test)]
mod tests {
    use super::{encode_png, load_image, save_image_as};
    use crate::{Color, Error, Grid};

    fn translucent_grid() -> Grid {
        Grid::from_fn(4, 3, |x, y| {
            Color::from_components(f32::from(x * 3 + y) / 12.0, 1.0, 0.5, 0.0)
        })
    }

    #[test]
    fn opaque_export_ignores_alpha() {
        let png = encode_png(&translucent_grid(), false).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().into_rgba8();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert!(decoded.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn alpha_is_kept_by_default() {
        let png = encode_png(&translucent_grid(), true).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().into_rgba8();
        assert_eq!(decoded.get_pixel(0, 0).0[3], 0);
        assert_eq!(decoded.get_pixel(3, 2).0, [255, 188, 0, 234]);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.png");
        let grid = Grid::from_fn(5, 2, |x, _| Color::from_srgb8([x as u8 * 40, 7, 200, 255]));
        save_image_as(&grid, &path, true).unwrap();
        // Overwrites.
        save_image_as(&grid, &path, true).unwrap();
        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded.size(), (5, 2));
        for ((_, _, a), (_, _, b)) in grid.iter().zip(loaded.iter()) {
            assert_eq!(a.to_srgb8(), b.to_srgb8());
        }
    }

    #[test]
    fn save_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("grid.png");
        let res = save_image_as(&translucent_grid(), &path, true);
        assert!(matches!(res, Err(Error::Image(_))));
    }
}
