use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::{debug, info};

use crate::{
    config::RunConfig,
    error::{RotError, RotResult},
    finalize::finalize,
    fingerprint::fingerprint_file,
    geometry::plan_dimensions,
    tools::{ColorSpace, ImageTools},
    workspace::Workspace,
};

/// Result of the degradation loop.
#[derive(Clone, Debug)]
pub struct DegradeOutcome {
    /// Last frame written. With convergence this is byte-identical to its
    /// predecessor.
    pub final_frame: PathBuf,
    /// Transform applications actually performed (<= the iteration cap).
    pub iterations_run: u32,
    /// Whether the loop stopped because re-encoding reached a fixed point.
    pub converged: bool,
}

/// Summary of a whole run, for the caller's final report.
#[derive(Clone, Debug)]
pub struct RotReport {
    pub target_width: u32,
    pub target_height: u32,
    pub iterations_run: u32,
    pub converged: bool,
    pub output: PathBuf,
}

/// Repeatedly push a frame through a lossy round trip until the iteration
/// cap is reached or the bytes stop changing.
///
/// Each iteration decodes the previous frame, saves a lossless CMYK
/// intermediate, then re-encodes it back to RGB JPEG at a quality sampled
/// uniformly from `[min_quality, max_quality]`. Sampling a fresh quality
/// per pass keeps perturbing the image; a fixed quality would reach a fixed
/// point almost immediately and cut the rot short.
///
/// Convergence is byte identity of consecutive frames (fingerprint
/// equality), not visual similarity — an exact, cheap stopping signal.
pub fn degrade(
    tools: &impl ImageTools,
    rng: &mut impl Rng,
    workspace: &Workspace,
    input_frame: &Path,
    max_iterations: u32,
    min_quality: u8,
    max_quality: u8,
) -> RotResult<DegradeOutcome> {
    debug_assert!(max_iterations >= 1);
    debug_assert!(1 <= min_quality && min_quality <= max_quality && max_quality <= 100);

    let seed = workspace.frame_path(0);
    if input_frame != seed {
        std::fs::copy(input_frame, &seed).map_err(|e| {
            RotError::unreadable_input(format!(
                "cannot materialize seed frame from '{}': {e}",
                input_frame.display()
            ))
        })?;
    }

    let mut prev_fingerprint = fingerprint_file(&seed)?;
    let mut prev_frame = seed;
    let mut iterations_run = 0;
    let mut converged = false;

    for i in 1..=max_iterations {
        let quality = rng.random_range(min_quality..=max_quality);
        debug!(iteration = i, quality, "lossy round trip");

        let intermediate = workspace.intermediate_path();
        let next_frame = workspace.frame_path(i);
        tools
            .reencode(&prev_frame, &intermediate, ColorSpace::Cmyk, 100)
            .map_err(|e| at_iteration(e, i))?;
        tools
            .reencode(&intermediate, &next_frame, ColorSpace::Rgb, quality)
            .map_err(|e| at_iteration(e, i))?;

        let fingerprint = fingerprint_file(&next_frame).map_err(|e| at_iteration(e, i))?;
        iterations_run = i;
        prev_frame = next_frame;

        if fingerprint == prev_fingerprint {
            // Fixed point: further re-encodes reproduce the same bytes.
            converged = true;
            break;
        }
        prev_fingerprint = fingerprint;
    }

    info!(iterations_run, converged, "degradation finished");
    Ok(DegradeOutcome {
        final_frame: prev_frame,
        iterations_run,
        converged,
    })
}

/// One full run: probe, plan, resize, degrade, finalize.
///
/// The scratch workspace lives on this function's stack, so its frames are
/// removed on every exit path, fatal errors included.
pub fn run(cfg: &RunConfig, tools: &impl ImageTools, rng: &mut impl Rng) -> RotResult<RotReport> {
    cfg.validate()?;

    let (native_width, native_height) = tools.probe_size(&cfg.input)?;
    let (target_width, target_height) =
        plan_dimensions(native_width, native_height, cfg.max_width, cfg.max_height)?;
    info!(
        input = %cfg.input.display(),
        native = %format!("{native_width}x{native_height}"),
        target = %format!("{target_width}x{target_height}"),
        "planned output geometry"
    );

    let workspace = Workspace::create(cfg.max_iterations)?;
    let seed = workspace.frame_path(0);
    tools.resize(&cfg.input, &seed, target_width, target_height)?;

    let outcome = degrade(
        tools,
        rng,
        &workspace,
        &seed,
        cfg.max_iterations,
        cfg.min_quality,
        cfg.max_quality,
    )?;

    finalize(
        tools,
        &workspace,
        &outcome.final_frame,
        &cfg.output,
        cfg.framerate,
    )?;

    Ok(RotReport {
        target_width,
        target_height,
        iterations_run: outcome.iterations_run,
        converged: outcome.converged,
        output: cfg.output.clone(),
    })
}

fn at_iteration(err: RotError, iteration: u32) -> RotError {
    match err {
        RotError::ToolExecution(msg) => {
            RotError::ToolExecution(format!("iteration {iteration}: {msg}"))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_iteration_tags_tool_failures_only() {
        let tagged = at_iteration(RotError::tool_execution("magick died"), 3);
        assert!(tagged.to_string().contains("iteration 3: magick died"));

        let untouched = at_iteration(RotError::unreadable_input("gone"), 3);
        assert!(!untouched.to_string().contains("iteration"));
    }
}
