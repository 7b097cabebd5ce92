use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use image::{Rgba, RgbaImage};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::font::{FontHandle, Typeface, load_typeface};
use crate::wrap::{FitPolicy, FittedText, fit_to_width};

/// Extra pixels between lines, on top of the font size.
pub const LINE_SPACING: f32 = 12.0;

const SHADOW_PASSES: [(i32, i32, u8); 2] = [(2, 2, 120), (1, 1, 90)];
const OUTLINE_ALPHA: u8 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Decoration {
    Plain,
    Shadow,
    Outline,
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub font_path: PathBuf,
    pub base_font_size: f32,
    pub canvas_size: (u32, u32),
    pub margin_px: u32,
    pub text_color: [u8; 4],
    pub decoration: Decoration,
    pub fit: FitPolicy,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            font_path: PathBuf::from("fonts/Roboto-Regular.ttf"),
            base_font_size: 120.0,
            canvas_size: (1080, 1920),
            margin_px: 48,
            text_color: [255, 255, 255, 255],
            decoration: Decoration::Shadow,
            fit: FitPolicy::default(),
        }
    }
}

impl RenderOptions {
    pub fn max_line_px(&self) -> f32 {
        self.canvas_size
            .0
            .saturating_sub(self.margin_px.saturating_mul(2)) as f32
    }

    /// Rejects canvas and font settings that cannot produce a readable card.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.canvas_size.0 == 0 || self.canvas_size.1 == 0 {
            bail!("canvas size must be non-zero, got {:?}", self.canvas_size);
        }
        if !(self.base_font_size.is_finite() && self.base_font_size > 0.0) {
            bail!("font size must be a positive number, got {}", self.base_font_size);
        }
        if !(self.fit.floor.is_finite() && self.fit.floor > 0.0) {
            bail!("minimum font size must be a positive number, got {}", self.fit.floor);
        }
        if !self.fit.step.is_finite() {
            bail!("shrink step must be finite, got {}", self.fit.step);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
}

#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub path: PathBuf,
    pub fitted: FittedText,
}

/// Centers the block of `lines` vertically and each line horizontally.
pub fn layout_lines(lines: &[String], font: FontHandle<'_>, canvas: (u32, u32)) -> Vec<PlacedLine> {
    let (w, h) = (canvas.0 as f32, canvas.1 as f32);
    let line_height = font.size() + LINE_SPACING;
    let mut y = (h - line_height * lines.len() as f32) / 2.0;

    lines
        .iter()
        .map(|line| {
            let width = font.measure(line);
            let placed = PlacedLine {
                text: line.clone(),
                x: (w - width) / 2.0,
                y,
                width,
            };
            y += line_height;
            placed
        })
        .collect()
}

/// Paints wrapped lines onto a transparent canvas.
pub fn render_lines(
    lines: &[String],
    font: FontHandle<'_>,
    color: [u8; 4],
    decoration: Decoration,
    canvas: (u32, u32),
) -> RgbaImage {
    let mut img = RgbaImage::new(canvas.0, canvas.1);
    for placed in layout_lines(lines, font, canvas) {
        let (x, y) = (placed.x.round() as i32, placed.y.round() as i32);
        match decoration {
            Decoration::Plain => {}
            Decoration::Shadow => {
                for (dx, dy, alpha) in SHADOW_PASSES {
                    draw_text(&mut img, font, &placed.text, x + dx, y + dy, [0, 0, 0, alpha]);
                }
            }
            Decoration::Outline => {
                let d = (font.size() / 24.0).round().max(1.0) as i32;
                let dark = outline_color(color);
                for (dx, dy) in [(-d, -d), (0, -d), (d, -d), (-d, 0), (d, 0), (-d, d), (0, d), (d, d)] {
                    draw_text(&mut img, font, &placed.text, x + dx, y + dy, dark);
                }
            }
        }
        draw_text(&mut img, font, &placed.text, x, y, color);
    }
    img
}

fn outline_color(color: [u8; 4]) -> [u8; 4] {
    [color[0] / 5, color[1] / 5, color[2] / 5, OUTLINE_ALPHA]
}

fn draw_text(img: &mut RgbaImage, font: FontHandle<'_>, text: &str, x: i32, top: i32, color: [u8; 4]) {
    let face = font.face();
    let baseline = top as f32 + face.ascent(font.size());
    let mut pen = x as f32;
    let mut prev = None;

    for ch in text.chars() {
        if let Some(left) = prev {
            pen += font.kern(left, ch);
        }
        let glyph = face.rasterize(ch, font.size());
        if glyph.width > 0 && glyph.height > 0 {
            let gx = pen.round() as i32 + glyph.xmin;
            let gy = baseline.round() as i32 - glyph.top;
            for row in 0..glyph.height {
                for col in 0..glyph.width {
                    let mask = glyph.coverage[row * glyph.width + col];
                    if mask > 0 {
                        blend_at(img, gx + col as i32, gy + row as i32, color, mask);
                    }
                }
            }
        }
        pen += font.advance(ch);
        prev = Some(ch);
    }
}

fn blend_at(img: &mut RgbaImage, x: i32, y: i32, src: [u8; 4], mask: u8) {
    if x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 {
        return;
    }
    let sa = f32::from(src[3]) / 255.0 * f32::from(mask) / 255.0;
    if sa <= 0.0 {
        return;
    }

    let dst = img.get_pixel_mut(x as u32, y as u32);
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let mut out = [0u8; 4];
    for c in 0..3 {
        let v = (f32::from(src[c]) * sa + f32::from(dst[c]) * da * (1.0 - sa)) / out_a;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    *dst = Rgba(out);
}

/// Fits `text` to the canvas and writes it to `path`.
///
/// Returns `None` without touching the filesystem when `text` has no words.
pub fn render_text_image(
    text: &str,
    face: &dyn Typeface,
    opts: &RenderOptions,
    path: &Path,
) -> anyhow::Result<Option<FittedText>> {
    let fitted = fit_to_width(text, face, opts.base_font_size, opts.max_line_px(), opts.fit);
    if fitted.lines.is_empty() {
        return Ok(None);
    }

    let font = FontHandle::new(face, fitted.size);
    let img = render_lines(&fitted.lines, font, opts.text_color, opts.decoration, opts.canvas_size);
    img.save(path)
        .with_context(|| format!("failed to write image '{}'", path.display()))?;
    debug!(
        "Wrote {} ({} lines at {}pt)",
        path.display(),
        fitted.lines.len(),
        fitted.size
    );
    Ok(Some(fitted))
}

pub fn chunk_image_path(output_dir: &Path, index: usize) -> PathBuf {
    output_dir.join(format!("{:03}.png", index))
}

/// Renders chunk `index` to `NNN.png` under `output_dir`. Empty chunks are skipped.
pub fn render_chunk_image(
    index: usize,
    chunk: &str,
    face: &dyn Typeface,
    opts: &RenderOptions,
    output_dir: &Path,
) -> anyhow::Result<Option<RenderedImage>> {
    let path = chunk_image_path(output_dir, index);
    match render_text_image(chunk, face, opts, &path)? {
        Some(fitted) => Ok(Some(RenderedImage { path, fitted })),
        None => {
            warn!("Chunk {} has no text; skipping image", index);
            Ok(None)
        }
    }
}

/// Renders every chunk to its own image, in order. The output directory
/// must already exist.
pub fn render_chunks_to_images(
    chunks: &[String],
    output_dir: &Path,
    opts: &RenderOptions,
) -> anyhow::Result<Vec<PathBuf>> {
    opts.validate()?;
    let face = load_typeface(&opts.font_path);
    info!(
        "Rendering {} chunks with {} at {}pt",
        chunks.len(),
        face.name(),
        opts.base_font_size
    );

    let mut paths = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        if let Some(rendered) = render_chunk_image(i, chunk, face.as_ref(), opts, output_dir)? {
            paths.push(rendered.path);
        }
    }
    Ok(paths)
}

/// Parses `#RRGGBB`, `#RRGGBBAA` or `r,g,b[,a]`.
pub fn parse_color(s: &str) -> anyhow::Result<[u8; 4]> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if !matches!(hex.len(), 6 | 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            bail!("invalid hex color '{}'", s);
        }
        let mut rgba = [255u8; 4];
        for (i, slot) in rgba.iter_mut().take(hex.len() / 2).enumerate() {
            *slot = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)?;
        }
        return Ok(rgba);
    }

    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if !matches!(parts.len(), 3 | 4) {
        bail!("invalid color '{}', expected #RRGGBB[AA] or r,g,b[,a]", s);
    }
    let mut rgba = [255u8; 4];
    for (slot, part) in rgba.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .with_context(|| format!("invalid color component '{}' in '{}'", part, s))?;
    }
    Ok(rgba)
}
