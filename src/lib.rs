//! Pixelrot digitally rots an image: it re-encodes it through a lossy
//! round trip over and over, so each generation's compression artifacts
//! compound on the last — authentic generational JPEG loss rather than
//! synthetic noise.
//!
//! # Pipeline overview
//!
//! 1. **Plan**: native dimensions + max bounds -> even target dimensions
//! 2. **Degrade**: resize once, then loop lossy round trips at a randomized
//!    quality until the iteration cap or a byte-identical re-encode
//! 3. **Finalize**: save the last frame as a still, or mux the whole frame
//!    sequence into a video via the system `ffmpeg` binary
//!
//! Pixel work is delegated to external tools behind the [`ImageTools`]
//! capability trait; the engine itself only orchestrates iteration, frame
//! naming, and convergence state. All intermediate frames live in a scratch
//! workspace that is removed on every exit path.
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod finalize;
pub mod fingerprint;
pub mod geometry;
pub mod rot;
pub mod tools;
pub mod workspace;

pub use config::{DefaultsSection, FileDefaults, Overrides, RunConfig};
pub use error::{RotError, RotResult};
pub use finalize::{OutputKind, finalize};
pub use fingerprint::{FrameFingerprint, fingerprint_file};
pub use geometry::plan_dimensions;
pub use rot::{DegradeOutcome, RotReport, degrade, run};
pub use tools::{ColorSpace, ImageTools, SystemTools, is_tool_on_path};
pub use workspace::Workspace;
