use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;

use crate::render::Decoration;
use crate::timeline::Window;

/// Hand-off to the video assembly stage: which image to overlay and when.
#[derive(Debug, Serialize)]
pub struct Manifest {
    pub canvas: (u32, u32),
    pub font: String,
    pub decoration: Decoration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<PathBuf>,
    pub chunks: Vec<ChunkEntry>,
}

#[derive(Debug, Serialize)]
pub struct ChunkEntry {
    pub index: usize,
    pub text: String,
    pub lines: Vec<String>,
    pub font_size: f32,
    pub overflow: bool,
    pub image: Option<PathBuf>,
    pub window: Window,
}

impl Manifest {
    pub fn total_duration(&self) -> f64 {
        self.chunks.last().map(|c| c.window.end).unwrap_or(0.0)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data).with_context(|| format!("failed to write manifest '{}'", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_windows_and_paths() {
        let manifest = Manifest {
            canvas: (1080, 1920),
            font: "builtin-bitmap".to_string(),
            decoration: Decoration::Outline,
            title: None,
            chunks: vec![ChunkEntry {
                index: 0,
                text: "Hello".to_string(),
                lines: vec!["Hello".to_string()],
                font_size: 120.0,
                overflow: false,
                image: Some(PathBuf::from("out/000.png")),
                window: Window { start: 0.0, end: 1.5 },
            }],
        };
        assert_eq!(manifest.total_duration(), 1.5);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        manifest.save(&path).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["decoration"], "outline");
        assert_eq!(value["canvas"], serde_json::json!([1080, 1920]));
        assert!(value.get("title").is_none());
        assert_eq!(value["chunks"][0]["image"], "out/000.png");
        assert_eq!(value["chunks"][0]["window"]["end"], 1.5);
    }
}
