use crate::font::{GlyphBitmap, Typeface};

const COLS: usize = 5;
const ROWS: usize = 8;
const ADVANCE_CELLS: f32 = 6.0;
const ASCENT_CELLS: f32 = 7.0;

/// Column-major 5x8 glyphs for printable ASCII, bit 0 is the top row.
const GLYPHS: [[u8; COLS]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x5F, 0x00, 0x00], // !
    [0x00, 0x07, 0x00, 0x07, 0x00], // "
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // #
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // $
    [0x23, 0x13, 0x08, 0x64, 0x62], // %
    [0x36, 0x49, 0x56, 0x20, 0x50], // &
    [0x00, 0x08, 0x07, 0x03, 0x00], // '
    [0x00, 0x1C, 0x22, 0x41, 0x00], // (
    [0x00, 0x41, 0x22, 0x1C, 0x00], // )
    [0x2A, 0x1C, 0x7F, 0x1C, 0x2A], // *
    [0x08, 0x08, 0x3E, 0x08, 0x08], // +
    [0x00, 0x80, 0x70, 0x30, 0x00], // ,
    [0x08, 0x08, 0x08, 0x08, 0x08], // -
    [0x00, 0x00, 0x60, 0x60, 0x00], // .
    [0x20, 0x10, 0x08, 0x04, 0x02], // /
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // 0
    [0x00, 0x42, 0x7F, 0x40, 0x00], // 1
    [0x72, 0x49, 0x49, 0x49, 0x46], // 2
    [0x21, 0x41, 0x49, 0x4D, 0x33], // 3
    [0x18, 0x14, 0x12, 0x7F, 0x10], // 4
    [0x27, 0x45, 0x45, 0x45, 0x39], // 5
    [0x3C, 0x4A, 0x49, 0x49, 0x31], // 6
    [0x41, 0x21, 0x11, 0x09, 0x07], // 7
    [0x36, 0x49, 0x49, 0x49, 0x36], // 8
    [0x46, 0x49, 0x49, 0x29, 0x1E], // 9
    [0x00, 0x00, 0x14, 0x00, 0x00], // :
    [0x00, 0x40, 0x34, 0x00, 0x00], // ;
    [0x00, 0x08, 0x14, 0x22, 0x41], // <
    [0x14, 0x14, 0x14, 0x14, 0x14], // =
    [0x00, 0x41, 0x22, 0x14, 0x08], // >
    [0x02, 0x01, 0x59, 0x09, 0x06], // ?
    [0x3E, 0x41, 0x5D, 0x59, 0x4E], // @
    [0x7C, 0x12, 0x11, 0x12, 0x7C], // A
    [0x7F, 0x49, 0x49, 0x49, 0x36], // B
    [0x3E, 0x41, 0x41, 0x41, 0x22], // C
    [0x7F, 0x41, 0x41, 0x41, 0x3E], // D
    [0x7F, 0x49, 0x49, 0x49, 0x41], // E
    [0x7F, 0x09, 0x09, 0x09, 0x01], // F
    [0x3E, 0x41, 0x41, 0x51, 0x73], // G
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // H
    [0x00, 0x41, 0x7F, 0x41, 0x00], // I
    [0x20, 0x40, 0x41, 0x3F, 0x01], // J
    [0x7F, 0x08, 0x14, 0x22, 0x41], // K
    [0x7F, 0x40, 0x40, 0x40, 0x40], // L
    [0x7F, 0x02, 0x1C, 0x02, 0x7F], // M
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // N
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // O
    [0x7F, 0x09, 0x09, 0x09, 0x06], // P
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // Q
    [0x7F, 0x09, 0x19, 0x29, 0x46], // R
    [0x26, 0x49, 0x49, 0x49, 0x32], // S
    [0x03, 0x01, 0x7F, 0x01, 0x03], // T
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // U
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // V
    [0x3F, 0x40, 0x38, 0x40, 0x3F], // W
    [0x63, 0x14, 0x08, 0x14, 0x63], // X
    [0x03, 0x04, 0x78, 0x04, 0x03], // Y
    [0x61, 0x59, 0x49, 0x4D, 0x43], // Z
    [0x00, 0x7F, 0x41, 0x41, 0x41], // [
    [0x02, 0x04, 0x08, 0x10, 0x20], // \
    [0x00, 0x41, 0x41, 0x41, 0x7F], // ]
    [0x04, 0x02, 0x01, 0x02, 0x04], // ^
    [0x40, 0x40, 0x40, 0x40, 0x40], // _
    [0x00, 0x03, 0x07, 0x08, 0x00], // `
    [0x20, 0x54, 0x54, 0x78, 0x40], // a
    [0x7F, 0x28, 0x44, 0x44, 0x38], // b
    [0x38, 0x44, 0x44, 0x44, 0x28], // c
    [0x38, 0x44, 0x44, 0x28, 0x7F], // d
    [0x38, 0x54, 0x54, 0x54, 0x18], // e
    [0x00, 0x08, 0x7E, 0x09, 0x02], // f
    [0x18, 0xA4, 0xA4, 0x9C, 0x78], // g
    [0x7F, 0x08, 0x04, 0x04, 0x78], // h
    [0x00, 0x44, 0x7D, 0x40, 0x00], // i
    [0x20, 0x40, 0x40, 0x3D, 0x00], // j
    [0x7F, 0x10, 0x28, 0x44, 0x00], // k
    [0x00, 0x41, 0x7F, 0x40, 0x00], // l
    [0x7C, 0x04, 0x78, 0x04, 0x78], // m
    [0x7C, 0x08, 0x04, 0x04, 0x78], // n
    [0x38, 0x44, 0x44, 0x44, 0x38], // o
    [0xFC, 0x18, 0x24, 0x24, 0x18], // p
    [0x18, 0x24, 0x24, 0x18, 0xFC], // q
    [0x7C, 0x08, 0x04, 0x04, 0x08], // r
    [0x48, 0x54, 0x54, 0x54, 0x24], // s
    [0x04, 0x04, 0x3F, 0x44, 0x24], // t
    [0x3C, 0x40, 0x40, 0x20, 0x7C], // u
    [0x1C, 0x20, 0x40, 0x20, 0x1C], // v
    [0x3C, 0x40, 0x30, 0x40, 0x3C], // w
    [0x44, 0x28, 0x10, 0x28, 0x44], // x
    [0x4C, 0x90, 0x90, 0x90, 0x7C], // y
    [0x44, 0x64, 0x54, 0x4C, 0x44], // z
    [0x00, 0x08, 0x36, 0x41, 0x00], // {
    [0x00, 0x00, 0x77, 0x00, 0x00], // |
    [0x00, 0x41, 0x36, 0x08, 0x00], // }
    [0x02, 0x01, 0x02, 0x04, 0x02], // ~
];

/// Drawn for anything outside printable ASCII.
const MISSING: [u8; COLS] = [0x7F, 0x41, 0x41, 0x41, 0x7F];

/// Built-in fixed-pitch face used when no font file can be loaded.
pub struct BitmapFace;

impl BitmapFace {
    fn columns(ch: char) -> [u8; COLS] {
        let ch = if ch == '\u{00AD}' { '-' } else { ch };
        match ch {
            ' '..='~' => GLYPHS[ch as usize - 0x20],
            _ if ch.is_whitespace() => GLYPHS[0],
            _ => MISSING,
        }
    }
}

impl Typeface for BitmapFace {
    fn name(&self) -> &str {
        "builtin-bitmap"
    }

    fn advance(&self, _ch: char, px: f32) -> f32 {
        px / ROWS as f32 * ADVANCE_CELLS
    }

    fn ascent(&self, px: f32) -> f32 {
        px / ROWS as f32 * ASCENT_CELLS
    }

    fn rasterize(&self, ch: char, px: f32) -> GlyphBitmap {
        let cell = (px / ROWS as f32).max(1.0);
        let width = (cell * COLS as f32).ceil() as usize;
        let height = (cell * ROWS as f32).ceil() as usize;
        let columns = Self::columns(ch);

        let mut coverage = vec![0u8; width * height];
        for y in 0..height {
            let row = ((y as f32 / cell) as usize).min(ROWS - 1);
            for x in 0..width {
                let col = ((x as f32 / cell) as usize).min(COLS - 1);
                if columns[col] >> row & 1 == 1 {
                    coverage[y * width + x] = 255;
                }
            }
        }

        GlyphBitmap {
            width,
            height,
            xmin: 0,
            top: (cell * ASCENT_CELLS).round() as i32,
            coverage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontHandle;

    #[test]
    fn fixed_pitch_advance() {
        let font = FontHandle::new(&BitmapFace, 16.0);
        assert_eq!(font.measure("Hello"), 60.0);
        assert_eq!(font.measure("\u{00AD}"), 12.0);
    }

    #[test]
    fn space_is_blank_and_letters_are_not() {
        let space = BitmapFace.rasterize(' ', 16.0);
        assert!(space.coverage.iter().all(|&c| c == 0));

        let h = BitmapFace.rasterize('H', 16.0);
        assert_eq!((h.width, h.height), (10, 16));
        assert!(h.coverage.iter().any(|&c| c == 255));
    }

    #[test]
    fn soft_hyphen_draws_like_hyphen() {
        let shy = BitmapFace.rasterize('\u{00AD}', 8.0);
        let dash = BitmapFace.rasterize('-', 8.0);
        assert_eq!(shy.coverage, dash.coverage);
    }

    #[test]
    fn unknown_chars_get_a_box() {
        let glyph = BitmapFace.rasterize('\u{263E}', 8.0);
        assert_eq!(glyph.coverage[0], 255);
    }
}
