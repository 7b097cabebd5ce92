//! Subtitle cards for narrated dream-story videos.
//!
//! A story is cut into word-bounded chunks, each chunk is wrapped to the
//! canvas width using real font metrics, and every chunk becomes a centered
//! transparent PNG that the video stage overlays while its narration plays.

pub mod args;
pub mod audio;
pub mod bitmap_font;
pub mod chunker;
pub mod font;
pub mod manifest;
pub mod render;
pub mod subtitle;
pub mod timeline;
pub mod wrap;

pub use chunker::chunk_text;
pub use font::{FontHandle, Typeface, load_typeface};
pub use render::{RenderOptions, render_chunks_to_images};
pub use wrap::{fit_to_width, wrap_text_by_pixels};
