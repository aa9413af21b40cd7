use std::{fs::File, io, path::Path};

use anyhow::Context as _;
use sha2::{Digest as _, Sha256};

use crate::error::RotResult;

/// Content digest of one on-disk frame.
///
/// Only equality matters: two frames with the same fingerprint are treated
/// as byte-identical, which is the convergence signal for the degradation
/// loop. This is an exact content-identity test, not a perceptual metric.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FrameFingerprint([u8; 32]);

impl FrameFingerprint {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// SHA-256 over the whole encoded byte stream of `path`.
pub fn fingerprint_file(path: &Path) -> RotResult<FrameFingerprint> {
    let mut file =
        File::open(path).with_context(|| format!("open frame '{}'", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("hash frame '{}'", path.display()))?;
    Ok(FrameFingerprint(hasher.finalize().into()))
}
