// Image converter: decodes a photo, remaps every pixel to an 8-bit gray
// level and writes the result as PNG next to the source file.

use anyhow::{Context, Result};
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, GenericImageView, GrayImage, ImageEncoder, ImageReader, Luma};
use log::{debug, info};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Suffix appended to the file stem of a converted photo.
pub const GRAY_SUFFIX: &str = "_gray.png";

/// Build the output path for `path`: its final extension (if any) is
/// replaced by `_gray.png`, the directory stays the same.
pub fn gray_target_path(path: &Path) -> PathBuf {
    let mut name = path.file_stem().unwrap_or_default().to_os_string();
    name.push(GRAY_SUFFIX);
    path.with_file_name(name)
}

/// Map one RGBA sample to a gray level.
///
/// Channels are widened to 16 bits and premultiplied by alpha, then
/// weighted with the Rec. 601 luma coefficients in fixed point
/// (they sum to 1 << 16).
pub fn gray_level(r: u8, g: u8, b: u8, a: u8) -> u8 {
    let a = u32::from(a) * 0x101;
    let widen = |v: u8| u32::from(v) * 0x101 * a / 0xffff;
    let (r, g, b) = (widen(r), widen(g), widen(b));
    ((19595 * r + 38470 * g + 7471 * b + (1 << 15)) >> 24) as u8
}

/// Produce a grayscale copy of `img` with identical bounds.
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut gray = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let [r, g, b, a] = img.get_pixel(x, y).0;
            gray.put_pixel(x, y, Luma([gray_level(r, g, b, a)]));
        }
    }
    gray
}

/// Decode the photo at `path`, convert it to grayscale and write it as
/// PNG to [`gray_target_path`]. Returns the path that was written.
pub fn convert_photo(path: &Path) -> Result<PathBuf> {
    let target = gray_target_path(path);
    info!("Target file path is: {}", target.display());

    let img = ImageReader::open(path)
        .with_context(|| format!("Failed to open image file {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Failed to read image file {}", path.display()))?
        .decode()
        .with_context(|| format!("Failed to decode image {}", path.display()))?;
    debug!("Decoded image: {:?} {}x{}", img.color(), img.width(), img.height());

    let gray = to_grayscale(&img);
    write_or_remove(&target, |writer| {
        PngEncoder::new(writer)
            .write_image(gray.as_raw(), gray.width(), gray.height(), ExtendedColorType::L8)
            .context("Failed to encode PNG")
    })?;
    Ok(target)
}

/// Create `target`, hand a buffered writer to `encode` and flush it.
/// When encoding or flushing fails the partially written file is deleted.
fn write_or_remove<F>(target: &Path, encode: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let file = File::create(target)
        .with_context(|| format!("Failed to create output file {}", target.display()))?;
    let mut writer = BufWriter::new(file);

    let written = encode(&mut writer).and_then(|_| {
        writer
            .flush()
            .with_context(|| format!("Failed to write output file {}", target.display()))
    });
    if written.is_err() {
        drop(writer);
        if let Err(e) = fs::remove_file(target) {
            debug!("Could not remove partial output {}: {}", target.display(), e);
        }
    }
    written
}
