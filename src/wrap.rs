use tracing::{debug, warn};

use crate::font::{FontHandle, Typeface};

pub const SOFT_HYPHEN: char = '\u{00AD}';

/// Breaks `text` into lines no wider than `max_px` at the handle's size.
///
/// Words are packed greedily. A word that is wider than `max_px` on its own
/// is split character by character, each piece but the last ending in a soft
/// hyphen. Those pieces fit without the marker; with it they may not.
pub fn wrap_text_by_pixels(text: &str, font: FontHandle<'_>, max_px: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for word in text.split_whitespace() {
        if font.measure(word) > max_px {
            if !current.is_empty() {
                lines.push(current.join(" "));
                current.clear();
            }
            lines.extend(soft_hyphen_split(word, font, max_px));
            continue;
        }

        current.push(word);
        if current.len() > 1 && font.measure(&current.join(" ")) > max_px {
            current.pop();
            lines.push(current.join(" "));
            current.clear();
            current.push(word);
        }
    }

    if !current.is_empty() {
        lines.push(current.join(" "));
    }
    lines
}

/// Splits one oversized token into pieces that each fit `max_px`.
///
/// A piece always holds at least one character, so a glyph wider than the
/// budget still becomes its own (overflowing) piece.
pub fn soft_hyphen_split(word: &str, font: FontHandle<'_>, max_px: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for ch in word.chars() {
        current.push(ch);
        if current.chars().count() > 1 && font.measure(&current) > max_px {
            current.pop();
            current.push(SOFT_HYPHEN);
            pieces.push(std::mem::take(&mut current));
            current.push(ch);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Width of a line as laid out, ignoring a trailing soft hyphen marker.
pub fn content_width(line: &str, font: FontHandle<'_>) -> f32 {
    font.measure(line.strip_suffix(SOFT_HYPHEN).unwrap_or(line))
}

pub fn line_too_wide(lines: &[String], font: FontHandle<'_>, max_px: f32) -> bool {
    lines.iter().any(|l| content_width(l, font) > max_px)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitPolicy {
    pub step: f32,
    pub floor: f32,
}

impl Default for FitPolicy {
    fn default() -> Self {
        Self { step: 2.0, floor: 14.0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FittedText {
    pub size: f32,
    pub lines: Vec<String>,
    /// Set when the floor was reached and some line still overflows.
    pub overflow: bool,
}

/// Wraps `text` at `base_size`, shrinking by `policy.step` while any line
/// overflows and the size is above `policy.floor`.
pub fn fit_to_width(
    text: &str,
    face: &dyn Typeface,
    base_size: f32,
    max_px: f32,
    policy: FitPolicy,
) -> FittedText {
    let step = if policy.step > 0.0 { policy.step } else { FitPolicy::default().step };
    let mut font = FontHandle::new(face, base_size);
    let mut lines = wrap_text_by_pixels(text, font, max_px);

    while line_too_wide(&lines, font, max_px) && font.size() > policy.floor {
        let next = (font.size() - step).max(policy.floor);
        debug!("Line overflows {}px at {}pt, retrying at {}pt", max_px, font.size(), next);
        font = font.resized(next);
        lines = wrap_text_by_pixels(text, font, max_px);
    }

    let overflow = line_too_wide(&lines, font, max_px);
    if overflow {
        warn!(
            "Text still overflows {}px at the {}pt floor; rendering best effort",
            max_px,
            font.size()
        );
    }

    FittedText {
        size: font.size(),
        lines,
        overflow,
    }
}
