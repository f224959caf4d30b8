use std::path::Path;

use image::{Rgb, RgbImage};
use thiserror::Error;

use crate::analyzer::spectral::Spectrogram;
use crate::risk::RiskLevel;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("image encode/write error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no frequency bins at or below {0} Hz to display")]
    NothingToDisplay(f32),
}

/// Plot area dimensions. Header strip on top carries the annotation.
const PLOT_WIDTH: u32 = 1200;
const PLOT_HEIGHT: u32 = 600;
const HEADER_HEIGHT: u32 = 28;

/// Render the spectrogram to a PNG, restricted to frequencies at or
/// below `display_max_hz`, annotated with the file label and its risk
/// level. Low frequencies sit at the bottom of the image.
pub fn render_spectrogram(
    spec: &Spectrogram,
    display_max_hz: f32,
    label: &str,
    risk: RiskLevel,
    out_path: &Path,
) -> Result<(), RenderError> {
    let n_rows = spec
        .frequencies
        .iter()
        .take_while(|&&f| f <= display_max_hz)
        .count();
    if n_rows == 0 {
        return Err(RenderError::NothingToDisplay(display_max_hz));
    }
    let n_cols = spec.energy_db.ncols();

    // Normalization range over the displayed sub-matrix only
    let mut min_db = f32::INFINITY;
    let mut max_db = f32::NEG_INFINITY;
    for row in 0..n_rows {
        for col in 0..n_cols {
            let v = spec.energy_db[[row, col]];
            min_db = min_db.min(v);
            max_db = max_db.max(v);
        }
    }
    let range = (max_db - min_db).max(1e-6);

    let mut img = RgbImage::new(PLOT_WIDTH, PLOT_HEIGHT + HEADER_HEIGHT);

    // Header strip: dark background, annotation text
    for y in 0..HEADER_HEIGHT {
        for x in 0..PLOT_WIDTH {
            img.put_pixel(x, y, Rgb([16, 16, 16]));
        }
    }
    let annotation = format!("{} | VAD RISK: {}", label, risk).to_uppercase();
    draw_text(&mut img, &annotation, 8, 7, 2, Rgb([230, 230, 230]));

    // Plot area: nearest-neighbor upscale, row 0 of the matrix (lowest
    // frequency) maps to the bottom pixel row
    for y in 0..PLOT_HEIGHT {
        let row = ((PLOT_HEIGHT - 1 - y) as usize * n_rows) / PLOT_HEIGHT as usize;
        for x in 0..PLOT_WIDTH {
            let col = (x as usize * n_cols) / PLOT_WIDTH as usize;
            let v = spec.energy_db[[row.min(n_rows - 1), col.min(n_cols - 1)]];
            let norm = (v - min_db) / range;
            img.put_pixel(x, y + HEADER_HEIGHT, heat_color(norm));
        }
    }

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    img.save(out_path)?;
    Ok(())
}

/// Map a normalized [0, 1] energy to an inferno-style heat color.
fn heat_color(norm: f32) -> Rgb<u8> {
    const ANCHORS: [(f32, [f32; 3]); 5] = [
        (0.0, [0.0, 0.0, 4.0]),
        (0.25, [87.0, 16.0, 110.0]),
        (0.5, [188.0, 55.0, 84.0]),
        (0.75, [249.0, 142.0, 9.0]),
        (1.0, [252.0, 255.0, 164.0]),
    ];
    let t = norm.clamp(0.0, 1.0);
    for pair in ANCHORS.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t <= t1 {
            let f = (t - t0) / (t1 - t0);
            return Rgb([
                (c0[0] + (c1[0] - c0[0]) * f) as u8,
                (c0[1] + (c1[1] - c0[1]) * f) as u8,
                (c0[2] + (c1[2] - c0[2]) * f) as u8,
            ]);
        }
    }
    Rgb([252, 255, 164])
}

/// Draw uppercase text with the embedded 5x7 font at the given pixel
/// scale. Glyphs we don't carry render as blanks.
fn draw_text(img: &mut RgbImage, text: &str, x0: u32, y0: u32, scale: u32, color: Rgb<u8>) {
    let advance = 6 * scale; // 5 columns + 1 gap
    let mut x = x0;
    for ch in text.chars() {
        if x + advance >= img.width() {
            break;
        }
        if let Some(rows) = glyph(ch) {
            for (ry, bits) in rows.iter().enumerate() {
                for rx in 0..5u32 {
                    if (bits >> (4 - rx)) & 1 != 0 {
                        for dy in 0..scale {
                            for dx in 0..scale {
                                img.put_pixel(
                                    x + rx * scale + dx,
                                    y0 + ry as u32 * scale + dy,
                                    color,
                                );
                            }
                        }
                    }
                }
            }
        }
        x += advance;
    }
}

/// 5x7 bitmap glyphs, one byte per row, low 5 bits used, MSB-left.
fn glyph(ch: char) -> Option<[u8; 7]> {
    let g = match ch.to_ascii_uppercase() {
        'A' => [0x0E, 0x11, 0x11, 0x11, 0x1F, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x1B, 0x11],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '|' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '_' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F],
        '(' => [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02],
        ')' => [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08],
        ' ' => [0x00; 7],
        _ => return None,
    };
    Some(g)
}
