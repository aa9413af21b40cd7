use std::path::Path;

use tracing::info;

use crate::{
    error::{RotError, RotResult},
    tools::{ColorSpace, ImageTools},
    workspace::Workspace,
};

/// Still-image extensions; anything else is treated as a video target.
const STILL_EXTENSIONS: [&str; 6] = ["jpeg", "jpg", "png", "bmp", "tiff", "tif"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputKind {
    Still,
    Video,
}

impl OutputKind {
    /// Infer the output kind from a path's extension, case-insensitively.
    pub fn from_path(path: &Path) -> Self {
        let is_still = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                STILL_EXTENSIONS
                    .iter()
                    .any(|s| ext.eq_ignore_ascii_case(s))
            });
        if is_still { Self::Still } else { Self::Video }
    }
}

/// Turn the finished frame sequence into the requested output artifact.
///
/// Stills get one format-normalizing re-encode of the last frame at quality
/// 100 — not a further degradation pass. Videos mux the numbered degradation
/// frames at `framerate` (the pristine seed frame stays out, so the frame
/// count equals the iterations run), overwriting any existing file at
/// `output`.
pub fn finalize(
    tools: &impl ImageTools,
    workspace: &Workspace,
    last_frame: &Path,
    output: &Path,
    framerate: Option<u32>,
) -> RotResult<()> {
    ensure_parent_dir(output)?;

    match OutputKind::from_path(output) {
        OutputKind::Still => {
            info!(output = %output.display(), "saving final frame");
            tools.reencode(last_frame, output, ColorSpace::Rgb, 100)
        }
        OutputKind::Video => {
            let framerate = framerate.filter(|f| *f > 0).ok_or_else(|| {
                RotError::invalid_configuration("video output requires a positive framerate")
            })?;
            info!(output = %output.display(), framerate, "assembling video");
            tools.mux_video(&workspace.frame_pattern(), output, framerate)
        }
    }
}

fn ensure_parent_dir(path: &Path) -> RotResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            RotError::output_write(format!(
                "cannot create output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }
    Ok(())
}
