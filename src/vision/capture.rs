//! Frame sources.

use chrono::{DateTime, Utc};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::config::SourceConfig;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("frame source I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("image encoding failed: {0}")]
    Encode(image::ImageError),
    #[error("no image files in {0}")]
    NoFrames(PathBuf),
}

// ── Frame ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Frame {
    pub index: u64,
    pub captured_at: DateTime<Utc>,
    pub image: RgbImage,
}

impl Frame {
    pub fn new(index: u64, image: RgbImage) -> Self {
        Self {
            index,
            captured_at: Utc::now(),
            image,
        }
    }

    /// Encode as JPEG (smaller than PNG, faster to encode).
    pub fn to_jpeg(&self) -> Result<Vec<u8>, CaptureError> {
        let mut buf = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(self.image.clone())
            .write_to(&mut buf, ImageFormat::Jpeg)
            .map_err(CaptureError::Encode)?;
        Ok(buf.into_inner())
    }
}

// ── Source Trait ───────────────────────────────────────────

pub trait FrameSource: Send {
    /// Next frame; `Ok(None)` marks end of stream.
    fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError>;

    /// Release the underlying device. Further calls return end of stream.
    fn release(&mut self) {}
}

pub fn build_source(config: &SourceConfig) -> Result<Box<dyn FrameSource>, CaptureError> {
    match config {
        SourceConfig::Synthetic {
            width,
            height,
            max_frames,
        } => Ok(Box::new(SyntheticSource::new(*width, *height, *max_frames))),
        SourceConfig::Directory { path, looped } => {
            Ok(Box::new(ImageDirSource::open(path, *looped)?))
        }
    }
}

// ── Synthetic ──────────────────────────────────────────────

pub struct SyntheticSource {
    width: u32,
    height: u32,
    max_frames: Option<u64>,
    produced: u64,
    released: bool,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32, max_frames: Option<u64>) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            max_frames,
            produced: 0,
            released: false,
        }
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        if self.released || self.max_frames.is_some_and(|max| self.produced >= max) {
            return Ok(None);
        }
        let shade = (self.produced % 64) as u8 + 96;
        let image = RgbImage::from_pixel(self.width, self.height, Rgb([shade, shade, shade]));
        let frame = Frame::new(self.produced, image);
        self.produced += 1;
        Ok(Some(frame))
    }

    fn release(&mut self) {
        self.released = true;
    }
}

// ── Image Directory ────────────────────────────────────────

pub struct ImageDirSource {
    files: Vec<PathBuf>,
    cursor: usize,
    looped: bool,
    produced: u64,
    released: bool,
}

impl ImageDirSource {
    pub fn open(dir: &Path, looped: bool) -> Result<Self, CaptureError> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_image_file(path))
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(CaptureError::NoFrames(dir.to_path_buf()));
        }
        debug!("[Vision] {} frames in {}", files.len(), dir.display());

        Ok(Self {
            files,
            cursor: 0,
            looped,
            produced: 0,
            released: false,
        })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FrameSource for ImageDirSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        if self.released {
            return Ok(None);
        }
        if self.cursor >= self.files.len() {
            if !self.looped {
                return Ok(None);
            }
            self.cursor = 0;
        }

        let path = &self.files[self.cursor];
        self.cursor += 1;
        let image = image::open(path)
            .map_err(|source| CaptureError::Decode {
                path: path.clone(),
                source,
            })?
            .to_rgb8();

        let frame = Frame::new(self.produced, image);
        self.produced += 1;
        Ok(Some(frame))
    }

    fn release(&mut self) {
        self.released = true;
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
        .unwrap_or(false)
}
