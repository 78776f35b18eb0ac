use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use std::{fs, io};

use crate::renderer::Pixmap;

/// Failures while exporting the rendered stage.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("nothing to export: the rendered surface is empty")]
    EmptySurface,
    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[cfg(feature = "clipboard")]
    #[error("clipboard error: {0}")]
    Clipboard(#[from] arboard::Error),
    #[error("clipboard support is not available")]
    ClipboardUnavailable,
}

/// Encodes the pixmap as an RGBA PNG with an alpha channel, so the stage
/// background stays transparent in the exported file.
pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, ExportError> {
    if pixmap.width == 0 || pixmap.height == 0 {
        return Err(ExportError::EmptySurface);
    }

    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, pixmap.width, pixmap.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&pixmap.data)?;
        writer.finish()?;
    }

    Ok(png_data)
}

/// Writes the pixmap into `dir` under a timestamped download name.
/// Returns the full path of the written file.
pub fn save_png(pixmap: &Pixmap, dir: &Path) -> Result<PathBuf, ExportError> {
    let png_data = encode_png(pixmap)?;
    let path = dir.join(download_file_name());
    fs::write(&path, &png_data)?;
    Ok(path)
}

/// `checklist-<UTC timestamp>.png`, with `:` and `.` flattened to `-` so
/// the name is valid on every filesystem.
fn download_file_name() -> String {
    let stamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S-%3fZ");
    format!("checklist-{stamp}.png")
}

/// Places the pixmap on the system clipboard as a raw RGBA image.
#[cfg(feature = "clipboard")]
pub fn copy_to_clipboard(pixmap: &Pixmap) -> Result<(), ExportError> {
    use std::borrow::Cow;

    if pixmap.width == 0 || pixmap.height == 0 {
        return Err(ExportError::EmptySurface);
    }

    let image = arboard::ImageData {
        width: pixmap.width as usize,
        height: pixmap.height as usize,
        bytes: Cow::Borrowed(&pixmap.data),
    };

    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_image(image)?;
    Ok(())
}

#[cfg(not(feature = "clipboard"))]
pub fn copy_to_clipboard(_pixmap: &Pixmap) -> Result<(), ExportError> {
    Err(ExportError::ClipboardUnavailable)
}

/// Whether image copy can work right now. False when the `clipboard`
/// feature is compiled out or no clipboard can be opened (headless hosts);
/// callers offer file saving instead.
pub fn clipboard_supported() -> bool {
    #[cfg(feature = "clipboard")]
    {
        arboard::Clipboard::new().is_ok()
    }
    #[cfg(not(feature = "clipboard"))]
    {
        false
    }
}

/// How long a copy outcome stays visible before reverting to idle.
pub const COPY_STATUS_RESET_DELAY: Duration = Duration::from_secs(2);

/// Outcome of the most recent copy attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CopyStatus {
    #[default]
    Idle,
    Success,
    Error,
}

/// Tracks the copy outcome with a time-based reset.
///
/// Outcomes decay lazily: `current` reports `Idle` once the reset delay has
/// passed, without any background timer.
#[derive(Debug, Default)]
pub struct CopyState {
    status: CopyStatus,
    since: Option<Instant>,
}

impl CopyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note_success(&mut self) {
        self.status = CopyStatus::Success;
        self.since = Some(Instant::now());
    }

    pub fn note_error(&mut self) {
        self.status = CopyStatus::Error;
        self.since = Some(Instant::now());
    }

    /// Clears the outcome immediately, without waiting for the delay.
    pub fn reset(&mut self) {
        self.status = CopyStatus::Idle;
        self.since = None;
    }

    /// Reports the outcome as of now, decayed to idle when stale.
    pub fn current(&self) -> CopyStatus {
        self.current_at(Instant::now())
    }

    fn current_at(&self, now: Instant) -> CopyStatus {
        match self.since {
            Some(since) if now.duration_since(since) < COPY_STATUS_RESET_DELAY => self.status,
            _ => CopyStatus::Idle,
        }
    }
}
