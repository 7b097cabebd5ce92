use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use fontdue::{Font, FontSettings};
use tracing::{info, warn};

use crate::bitmap_font::BitmapFace;

/// Coverage mask for one glyph, positioned relative to the pen and baseline.
#[derive(Debug, Clone, Default)]
pub struct GlyphBitmap {
    pub width: usize,
    pub height: usize,
    /// Horizontal offset of the bitmap's left edge from the pen position.
    pub xmin: i32,
    /// Distance from the baseline up to the bitmap's top row.
    pub top: i32,
    pub coverage: Vec<u8>,
}

/// What the wrapper and renderer need from a font.
pub trait Typeface: Send + Sync {
    fn name(&self) -> &str;

    fn advance(&self, ch: char, px: f32) -> f32;

    fn kern(&self, _left: char, _right: char, _px: f32) -> f32 {
        0.0
    }

    fn ascent(&self, px: f32) -> f32;

    fn rasterize(&self, ch: char, px: f32) -> GlyphBitmap;
}

/// A typeface at a concrete pixel size.
#[derive(Clone, Copy)]
pub struct FontHandle<'a> {
    face: &'a dyn Typeface,
    size: f32,
}

impl<'a> FontHandle<'a> {
    pub fn new(face: &'a dyn Typeface, size: f32) -> Self {
        Self { face, size }
    }

    pub fn face(&self) -> &'a dyn Typeface {
        self.face
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn resized(&self, size: f32) -> Self {
        Self { face: self.face, size }
    }

    /// Advance of `ch`; negative or non-finite metrics count as zero.
    pub fn advance(&self, ch: char) -> f32 {
        sanitize(self.face.advance(ch, self.size))
    }

    pub fn kern(&self, left: char, right: char) -> f32 {
        sanitize_kern(self.face.kern(left, right, self.size))
    }

    /// Rendered width of `text` in pixels.
    pub fn measure(&self, text: &str) -> f32 {
        let mut width = 0.0_f32;
        let mut prev = None;
        for ch in text.chars() {
            if let Some(left) = prev {
                width += self.kern(left, ch);
            }
            width += self.advance(ch);
            prev = Some(ch);
        }
        width.max(0.0)
    }
}

fn sanitize(v: f32) -> f32 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

fn sanitize_kern(v: f32) -> f32 {
    if v.is_finite() { v } else { 0.0 }
}

pub struct TrueTypeFace {
    name: String,
    font: Font,
}

impl TrueTypeFace {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let bytes =
            fs::read(path).with_context(|| format!("failed to read font file '{}'", path.display()))?;
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| anyhow!("failed to parse font '{}': {}", path.display(), e))?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("truetype")
            .to_string();
        Ok(Self { name, font })
    }
}

impl Typeface for TrueTypeFace {
    fn name(&self) -> &str {
        &self.name
    }

    fn advance(&self, ch: char, px: f32) -> f32 {
        self.font.metrics(ch, px).advance_width
    }

    fn kern(&self, left: char, right: char, px: f32) -> f32 {
        sanitize_kern(self.font.horizontal_kern(left, right, px).unwrap_or(0.0))
    }

    fn ascent(&self, px: f32) -> f32 {
        self.font
            .horizontal_line_metrics(px)
            .map(|m| m.ascent)
            .unwrap_or(px * 0.8)
    }

    fn rasterize(&self, ch: char, px: f32) -> GlyphBitmap {
        let (metrics, coverage) = self.font.rasterize(ch, px);
        GlyphBitmap {
            width: metrics.width,
            height: metrics.height,
            xmin: metrics.xmin,
            top: metrics.ymin + metrics.height as i32,
            coverage,
        }
    }
}

/// Loads the font at `path`, falling back to the built-in bitmap face.
pub fn load_typeface(path: &Path) -> Arc<dyn Typeface> {
    match TrueTypeFace::from_file(path) {
        Ok(face) => {
            info!("Loaded font {}", path.display());
            Arc::new(face)
        }
        Err(e) => {
            warn!("Font unavailable ({:#}); using built-in bitmap font", e);
            Arc::new(BitmapFace)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Every character advances by `per_char` pixels regardless of size.
    pub(crate) struct FixedAdvance {
        pub per_char: f32,
    }

    impl Typeface for FixedAdvance {
        fn name(&self) -> &str {
            "fixed"
        }

        fn advance(&self, _ch: char, _px: f32) -> f32 {
            self.per_char
        }

        fn ascent(&self, px: f32) -> f32 {
            px
        }

        fn rasterize(&self, _ch: char, px: f32) -> GlyphBitmap {
            let side = px.max(1.0) as usize;
            GlyphBitmap {
                width: side,
                height: side,
                xmin: 0,
                top: side as i32,
                coverage: vec![255; side * side],
            }
        }
    }

    struct Broken;

    impl Typeface for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn advance(&self, ch: char, _px: f32) -> f32 {
            match ch {
                'a' => -4.0,
                'b' => f32::NAN,
                _ => 10.0,
            }
        }

        fn kern(&self, _l: char, _r: char, _px: f32) -> f32 {
            f32::INFINITY
        }

        fn ascent(&self, px: f32) -> f32 {
            px
        }

        fn rasterize(&self, _ch: char, _px: f32) -> GlyphBitmap {
            GlyphBitmap::default()
        }
    }

    #[test]
    fn measure_sums_advances() {
        let face = FixedAdvance { per_char: 7.0 };
        let font = FontHandle::new(&face, 20.0);
        assert_eq!(font.measure(""), 0.0);
        assert_eq!(font.measure("abc"), 21.0);
    }

    #[test]
    fn negative_and_nan_advances_count_as_zero() {
        let font = FontHandle::new(&Broken, 12.0);
        assert_eq!(font.measure("ab"), 0.0);
        assert_eq!(font.measure("axbx"), 20.0);
    }

    #[test]
    fn missing_font_falls_back_to_bitmap_face() {
        let face = load_typeface(Path::new("/nonexistent/fonts/Nope.ttf"));
        assert_eq!(face.name(), "builtin-bitmap");
    }

    #[test]
    fn garbage_font_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ttf");
        fs::write(&path, b"not a font").unwrap();
        assert!(TrueTypeFace::from_file(&path).is_err());
        assert_eq!(load_typeface(&path).name(), "builtin-bitmap");
    }

    fn system_ttf() -> Option<&'static Path> {
        [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/Library/Fonts/Arial.ttf",
            "C:\\Windows\\Fonts\\arial.ttf",
        ]
        .into_iter()
        .map(Path::new)
        .find(|p| p.exists())
    }

    #[test]
    fn truetype_glyphs_sit_on_the_baseline() {
        let Some(path) = system_ttf() else {
            eprintln!("no system TrueType font found; skipping");
            return;
        };
        let face = TrueTypeFace::from_file(path).unwrap();
        let font = FontHandle::new(&face, 48.0);

        assert!(font.measure("Hello") > 0.0);
        assert!(font.measure("Hello world") > font.measure("Hello"));
        assert!(font.kern('A', 'V').is_finite());

        let ascent = face.ascent(48.0);
        assert!(ascent > 0.0 && ascent <= 48.0 * 1.5);

        let h = face.rasterize('H', 48.0);
        assert!(h.width > 0 && h.height > 0);
        assert!(h.coverage.iter().any(|&c| c > 0));
        // 'H' rests on the baseline and stays under the ascent line
        assert!(h.top > 0);
        assert!((h.top - h.height as i32).abs() <= 1);
        assert!(h.top as f32 <= ascent.ceil());

        let p = face.rasterize('p', 48.0);
        assert!(p.top - (p.height as i32) < 0, "descender reaches below the baseline");
    }
}
