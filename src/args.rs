use std::path::PathBuf;

use clap::Parser;

use crate::chunker::DEFAULT_MAX_WORDS;
use crate::render::{Decoration, RenderOptions, parse_color};
use crate::wrap::FitPolicy;

/// Render narration-sized subtitle cards for a dream story.
#[derive(Parser, Debug)]
pub struct Args {
    /// Story text file
    #[clap(long)]
    pub input: PathBuf,

    /// Optional title rendered to title.png
    #[clap(long)]
    pub title: Option<String>,

    #[clap(long, default_value = "./out")]
    pub out_dir: PathBuf,

    #[clap(long, default_value = "fonts/Roboto-Regular.ttf")]
    pub font: PathBuf,

    #[clap(long, default_value_t = 120.0)]
    pub font_size: f32,

    #[clap(long, default_value_t = 14.0)]
    pub min_font_size: f32,

    #[clap(long, default_value_t = 2.0)]
    pub shrink_step: f32,

    #[clap(long, default_value_t = DEFAULT_MAX_WORDS)]
    pub max_words: usize,

    #[clap(long, default_value_t = 1080)]
    pub width: u32,

    #[clap(long, default_value_t = 1920)]
    pub height: u32,

    #[clap(long, default_value_t = 48)]
    pub margin: u32,

    /// #RRGGBB, #RRGGBBAA or r,g,b[,a]
    #[clap(long, default_value = "#FFFFFFFF", value_parser = parse_color)]
    pub color: [u8; 4],

    #[clap(long, value_enum, default_value_t = Decoration::Shadow)]
    pub style: Decoration,

    /// Directory of part_NNN.wav narration files, one per chunk
    #[clap(long)]
    pub audio_dir: Option<PathBuf>,
}

impl Args {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            font_path: self.font.clone(),
            base_font_size: self.font_size,
            canvas_size: (self.width, self.height),
            margin_px: self.margin,
            text_color: self.color,
            decoration: self.style,
            fit: FitPolicy {
                step: self.shrink_step,
                floor: self.min_font_size,
            },
        }
    }
}
