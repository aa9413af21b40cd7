use std::{
    ffi::OsString,
    path::Path,
    process::{Command, Stdio},
};

use tracing::debug;

use crate::error::{RotError, RotResult};

/// Colorspace a re-encode converts into before saving.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSpace {
    Cmyk,
    Rgb,
}

impl ColorSpace {
    fn magick_name(self) -> &'static str {
        match self {
            ColorSpace::Cmyk => "CMYK",
            ColorSpace::Rgb => "RGB",
        }
    }
}

/// The external transform operators the engine orchestrates.
///
/// Everything is file-in/file-out; the engine never touches pixels itself.
/// Implementations report failures as [`RotError::ToolExecution`] carrying
/// the underlying tool's diagnostic text, and tests substitute an in-process
/// double.
pub trait ImageTools {
    /// Pixel dimensions of an image file.
    fn probe_size(&self, path: &Path) -> RotResult<(u32, u32)>;

    /// Resize `input` to exactly `width`x`height` (aspect ratio is the
    /// caller's concern) at maximum quality.
    fn resize(&self, input: &Path, output: &Path, width: u32, height: u32) -> RotResult<()>;

    /// Decode `input` and save it to `output` in `colorspace` at `quality`.
    /// Output format follows `output`'s extension.
    fn reencode(
        &self,
        input: &Path,
        output: &Path,
        colorspace: ColorSpace,
        quality: u8,
    ) -> RotResult<()>;

    /// Assemble the numbered frame sequence matching `frame_pattern` (a
    /// printf-style image2 pattern) into a video at `framerate`, overwriting
    /// `output` if present.
    fn mux_video(&self, frame_pattern: &Path, output: &Path, framerate: u32) -> RotResult<()>;
}

/// Adapter over the system `magick` and `ffmpeg` binaries.
///
/// We intentionally shell out rather than link codec libraries: the round
/// trip must reproduce ImageMagick's encoder behavior, artifacts and all.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemTools;

impl SystemTools {
    /// Fail fast if the binaries the run will need are not on PATH.
    pub fn preflight(&self, needs_ffmpeg: bool) -> RotResult<()> {
        if !is_tool_on_path("magick") {
            return Err(RotError::tool_execution(
                "ImageMagick ('magick') is required, but was not found on PATH",
            ));
        }
        if needs_ffmpeg && !is_tool_on_path("ffmpeg") {
            return Err(RotError::tool_execution(
                "ffmpeg is required for video output, but was not found on PATH",
            ));
        }
        Ok(())
    }
}

impl ImageTools for SystemTools {
    fn probe_size(&self, path: &Path) -> RotResult<(u32, u32)> {
        // Header-only decode; no need to round-trip through a tool for a
        // metadata query.
        image::image_dimensions(path).map_err(|e| {
            RotError::unreadable_input(format!("'{}' is not a decodable image: {e}", path.display()))
        })
    }

    fn resize(&self, input: &Path, output: &Path, width: u32, height: u32) -> RotResult<()> {
        let mut cmd = Command::new("magick");
        cmd.arg(input)
            // '!' forces the exact geometry; the planner already preserved
            // the aspect ratio.
            .args(["-resize", &format!("{width}x{height}!")])
            .args(["-quality", "100"])
            .arg(output);
        run_tool(cmd)?;
        expect_output(output)
    }

    fn reencode(
        &self,
        input: &Path,
        output: &Path,
        colorspace: ColorSpace,
        quality: u8,
    ) -> RotResult<()> {
        let mut cmd = Command::new("magick");
        cmd.arg(input)
            .args(["-colorspace", colorspace.magick_name()])
            .arg("+antialias")
            .args(["-quality", &quality.to_string()])
            .arg(output);
        run_tool(cmd)?;
        expect_output(output)
    }

    fn mux_video(&self, frame_pattern: &Path, output: &Path, framerate: u32) -> RotResult<()> {
        let mut cmd = Command::new("ffmpeg");
        cmd.args(mux_args(frame_pattern, output, framerate));
        run_tool(cmd)?;
        expect_output(output)
    }
}

/// ffmpeg argument list for assembling the numbered frames into a video.
///
/// Frame 0 is the pristine resized original; `-start_number 1` keeps it out
/// of the container, so the video's frame count equals the number of
/// degradation iterations actually run.
fn mux_args(frame_pattern: &Path, output: &Path, framerate: u32) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    for a in ["-y", "-loglevel", "error", "-framerate"] {
        args.push(a.into());
    }
    args.push(framerate.to_string().into());
    for a in ["-start_number", "1", "-i"] {
        args.push(a.into());
    }
    args.push(frame_pattern.as_os_str().to_owned());
    for a in [
        "-an",
        "-c:v",
        "libx264",
        "-pix_fmt",
        "yuv420p",
        "-movflags",
        "+faststart",
    ] {
        args.push(a.into());
    }
    args.push(output.as_os_str().to_owned());
    args
}

/// Tools occasionally exit zero without writing anything (bad delegate
/// policies, truncated patterns); treat that the same as a failed run.
fn expect_output(path: &Path) -> RotResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(RotError::tool_execution(format!(
            "tool reported success but produced no output file '{}'",
            path.display()
        )))
    }
}

pub fn is_tool_on_path(name: &str) -> bool {
    Command::new(name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run one external command to completion, mapping any failure to
/// [`RotError::ToolExecution`] with the tool's stderr attached.
fn run_tool(mut cmd: Command) -> RotResult<()> {
    debug!(command = ?cmd, "running external tool");

    let output = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|e| RotError::tool_execution(format!("failed to spawn {:?}: {e}", cmd.get_program())))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RotError::tool_execution(format!(
            "{:?} exited with status {}: {}",
            cmd.get_program(),
            output.status,
            stderr.trim()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_failure_is_tool_execution() {
        let err = run_tool(Command::new("pixelrot-no-such-binary")).unwrap_err();
        assert!(matches!(err, RotError::ToolExecution(_)));
    }

    #[test]
    fn nonzero_exit_carries_stderr() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo bad frame >&2; exit 3"]);
        let err = run_tool(cmd).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("bad frame"), "missing stderr in: {msg}");
    }

    #[test]
    fn mux_starts_at_frame_one() {
        let args = mux_args(Path::new("ws/frame_%03d.jpeg"), Path::new("out.mp4"), 24);

        let start = args.iter().position(|a| a == "-start_number").unwrap();
        assert_eq!(args[start + 1], "1");

        let rate = args.iter().position(|a| a == "-framerate").unwrap();
        assert_eq!(args[rate + 1], "24");

        assert_eq!(*args.last().unwrap(), "out.mp4");
    }

    #[test]
    fn probe_size_rejects_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_an_image.jpeg");
        std::fs::write(&path, b"plain text").unwrap();
        let err = SystemTools.probe_size(&path).unwrap_err();
        assert!(matches!(err, RotError::UnreadableInput(_)));
    }
}
