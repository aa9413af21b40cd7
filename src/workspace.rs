use std::path::{Path, PathBuf};

use anyhow::Context as _;
use tempfile::TempDir;

use crate::error::RotResult;

/// Scratch directory holding the per-iteration frames of a single run.
///
/// The directory is freshly created, exclusive to the run, and removed when
/// the `Workspace` is dropped — on success, convergence, and every error
/// path alike. Frames never outlive the run.
pub struct Workspace {
    dir: TempDir,
    pad_width: usize,
}

impl Workspace {
    /// Create a scratch workspace sized for `max_iterations` frames.
    ///
    /// The zero-padding width of frame names is the number of decimal digits
    /// in the iteration cap (cap 100 -> `frame_000.jpeg` .. `frame_100.jpeg`),
    /// so lexicographic and numeric frame order always agree.
    pub fn create(max_iterations: u32) -> RotResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix("pixelrot-")
            .tempdir()
            .context("create scratch workspace")?;
        Ok(Self {
            dir,
            pad_width: decimal_digits(max_iterations),
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// On-disk path of frame `index`.
    pub fn frame_path(&self, index: u32) -> PathBuf {
        self.dir
            .path()
            .join(format!("frame_{index:0width$}.jpeg", width = self.pad_width))
    }

    /// Lossless intermediate of the current round trip. Reused every
    /// iteration; only the numbered jpeg frames form the output sequence.
    pub fn intermediate_path(&self) -> PathBuf {
        self.dir.path().join("roundtrip.png")
    }

    /// printf-style pattern matching the numbered frames, for ffmpeg's
    /// image2 demuxer.
    pub fn frame_pattern(&self) -> PathBuf {
        self.dir
            .path()
            .join(format!("frame_%0{}d.jpeg", self.pad_width))
    }
}

fn decimal_digits(n: u32) -> usize {
    n.max(1).ilog10() as usize + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_names_are_zero_padded_to_the_cap_width() {
        let ws = Workspace::create(100).unwrap();
        assert!(ws.frame_path(0).ends_with("frame_000.jpeg"));
        assert!(ws.frame_path(42).ends_with("frame_042.jpeg"));
        assert!(ws.frame_path(100).ends_with("frame_100.jpeg"));

        let ws = Workspace::create(9).unwrap();
        assert!(ws.frame_path(3).ends_with("frame_3.jpeg"));
    }

    #[test]
    fn pattern_width_matches_frame_names() {
        let ws = Workspace::create(1000).unwrap();
        assert!(ws.frame_pattern().ends_with("frame_%04d.jpeg"));
        assert!(ws.frame_path(7).ends_with("frame_0007.jpeg"));
    }

    #[test]
    fn dropping_the_workspace_removes_the_directory() {
        let path;
        {
            let ws = Workspace::create(10).unwrap();
            path = ws.path().to_path_buf();
            std::fs::write(ws.frame_path(0), b"frame").unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }
}
