use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use dreamtales::args::Args;
use dreamtales::audio::chunk_durations;
use dreamtales::font::{Typeface, load_typeface};
use dreamtales::manifest::{ChunkEntry, Manifest};
use dreamtales::render::{RenderOptions, RenderedImage, render_chunk_image, render_text_image};
use dreamtales::subtitle::{build_word_cues, write_srt};
use dreamtales::timeline::display_windows;
use dreamtales::chunk_text;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting dream story card generation");

    let args = Args::parse();
    let opts = args.render_options();
    opts.validate()?;

    let story = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read story '{}'", args.input.display()))?;
    info!("Using story (short preview): {:.200}", story.replace('\n', " "));

    let chunks = chunk_text(&story, args.max_words);
    if chunks.is_empty() {
        error!("Story {} has no words", args.input.display());
        anyhow::bail!("nothing to render");
    }
    info!("Split story into {} chunks of up to {} words", chunks.len(), args.max_words);

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create '{}'", args.out_dir.display()))?;
    info!("Writing cards to '{}'", args.out_dir.display());

    let face = load_typeface(&opts.font_path);

    let title = match &args.title {
        Some(text) => {
            let path = args.out_dir.join("title.png");
            match render_text_image(text, face.as_ref(), &opts, &path)? {
                Some(_) => {
                    info!("Title card written to {}", path.display());
                    Some(path)
                }
                None => {
                    warn!("Title is blank; skipping title card");
                    None
                }
            }
        }
        None => None,
    };

    let rendered = render_all(&chunks, face.clone(), &opts, &args.out_dir).await?;

    let durations = match &args.audio_dir {
        Some(dir) => {
            info!("Reading narration durations from {}", dir.display());
            chunk_durations(dir, chunks.len())
        }
        None => vec![None; chunks.len()],
    };
    let windows = display_windows(&chunks, &durations);

    let srt_path = args.out_dir.join("subs.srt");
    write_srt(&srt_path, &build_word_cues(&chunks, &windows))?;
    info!("Subtitles written to {}", srt_path.display());

    let entries = chunks
        .iter()
        .zip(rendered)
        .zip(windows)
        .enumerate()
        .map(|(index, ((text, image), window))| ChunkEntry {
            index,
            text: text.clone(),
            lines: image.as_ref().map(|r| r.fitted.lines.clone()).unwrap_or_default(),
            font_size: image.as_ref().map(|r| r.fitted.size).unwrap_or(opts.base_font_size),
            overflow: image.as_ref().is_some_and(|r| r.fitted.overflow),
            image: image.map(|r| r.path),
            window,
        })
        .collect();

    let manifest = Manifest {
        canvas: opts.canvas_size,
        font: face.name().to_string(),
        decoration: opts.decoration,
        title,
        chunks: entries,
    };
    let manifest_path = args.out_dir.join("manifest.json");
    manifest.save(&manifest_path)?;
    info!(
        "Manifest written to {} ({:.2}s of narration)",
        manifest_path.display(),
        manifest.total_duration()
    );

    info!("Process complete.");
    Ok(())
}

/// Renders chunks on the blocking pool, returning results in chunk order.
async fn render_all(
    chunks: &[String],
    face: Arc<dyn Typeface>,
    opts: &RenderOptions,
    out_dir: &Path,
) -> anyhow::Result<Vec<Option<RenderedImage>>> {
    let mut set = JoinSet::new();
    for (i, chunk) in chunks.iter().enumerate() {
        let chunk = chunk.clone();
        let face = face.clone();
        let opts = opts.clone();
        let out_dir = out_dir.to_path_buf();
        set.spawn_blocking(move || {
            debug!("Rendering chunk {}: {}", i, chunk);
            (i, render_chunk_image(i, &chunk, face.as_ref(), &opts, &out_dir))
        });
    }

    let mut results: Vec<Option<RenderedImage>> = vec![None; chunks.len()];
    while let Some(joined) = set.join_next().await {
        let (i, result) = joined.context("render task panicked")?;
        match result {
            Ok(rendered) => {
                if let Some(r) = &rendered {
                    info!("Finished card {}/{}: {}", i + 1, chunks.len(), r.path.display());
                }
                results[i] = rendered;
            }
            Err(e) => {
                error!("Failed to render chunk {}: {:?}", i, e);
                return Err(e);
            }
        }
    }
    Ok(results)
}
