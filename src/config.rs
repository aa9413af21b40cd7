use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{
    error::{RotError, RotResult},
    finalize::OutputKind,
};

pub const DEFAULT_MAX_ITERATIONS: u32 = 100;
pub const DEFAULT_MAX_WIDTH: u32 = 480;
pub const DEFAULT_MAX_HEIGHT: u32 = 320;
pub const DEFAULT_MIN_QUALITY: u8 = 85;
pub const DEFAULT_MAX_QUALITY: u8 = 95;
pub const DEFAULT_FRAMERATE: u32 = 30;

/// The `defaults:` section of the YAML configuration file. Every key is
/// optional; absent keys fall through to the hard-coded defaults.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DefaultsSection {
    pub max_iterations: Option<u32>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub min_quality: Option<u8>,
    pub max_quality: Option<u8>,
    pub framerate: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FileDefaults {
    #[serde(default)]
    pub defaults: DefaultsSection,
}

impl FileDefaults {
    /// Load defaults from `path`. A missing file is not an error — it simply
    /// contributes nothing; a file that exists but does not parse is an
    /// [`RotError::InvalidConfiguration`].
    pub fn load(path: &Path) -> RotResult<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(RotError::invalid_configuration(format!(
                    "cannot read config file '{}': {e}",
                    path.display()
                )));
            }
        };
        serde_yaml::from_str(&text).map_err(|e| {
            RotError::invalid_configuration(format!(
                "malformed config file '{}': {e}",
                path.display()
            ))
        })
    }
}

/// Tunables as given on the command line — `None` means "not given", so the
/// resolution below can distinguish an explicit value from a fallback.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub max_iterations: Option<u32>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub min_quality: Option<u8>,
    pub max_quality: Option<u8>,
    pub framerate: Option<u32>,
}

/// Fully resolved configuration of one run. Built once at the boundary; the
/// engine never consults partial or optional sources itself.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub max_iterations: u32,
    pub min_quality: u8,
    pub max_quality: u8,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub framerate: Option<u32>,
}

impl RunConfig {
    /// Resolve every tunable: CLI value if present, else config-file value,
    /// else the hard-coded default.
    pub fn resolve(
        input: PathBuf,
        output: PathBuf,
        cli: &Overrides,
        file: &DefaultsSection,
    ) -> Self {
        Self {
            input,
            output,
            max_iterations: cli
                .max_iterations
                .or(file.max_iterations)
                .unwrap_or(DEFAULT_MAX_ITERATIONS),
            min_quality: cli
                .min_quality
                .or(file.min_quality)
                .unwrap_or(DEFAULT_MIN_QUALITY),
            max_quality: cli
                .max_quality
                .or(file.max_quality)
                .unwrap_or(DEFAULT_MAX_QUALITY),
            max_width: Some(cli.max_width.or(file.max_width).unwrap_or(DEFAULT_MAX_WIDTH)),
            max_height: Some(
                cli.max_height
                    .or(file.max_height)
                    .unwrap_or(DEFAULT_MAX_HEIGHT),
            ),
            framerate: Some(cli.framerate.or(file.framerate).unwrap_or(DEFAULT_FRAMERATE)),
        }
    }

    /// Output kind inferred from the output path's extension.
    pub fn output_kind(&self) -> OutputKind {
        OutputKind::from_path(&self.output)
    }

    pub fn validate(&self) -> RotResult<()> {
        if self.max_iterations == 0 {
            return Err(RotError::invalid_configuration(
                "max iterations must be at least 1",
            ));
        }
        if self.min_quality < 1 || self.max_quality > 100 || self.min_quality > self.max_quality {
            return Err(RotError::invalid_configuration(format!(
                "quality range [{}, {}] must satisfy 1 <= min <= max <= 100",
                self.min_quality, self.max_quality
            )));
        }
        if self.max_width.is_none() && self.max_height.is_none() {
            return Err(RotError::invalid_configuration(
                "at least one of max width / max height must be set",
            ));
        }
        if self.output_kind() == OutputKind::Video
            && !self.framerate.is_some_and(|f| f > 0)
        {
            return Err(RotError::invalid_configuration(
                "video output requires a positive framerate",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(output: &str) -> RunConfig {
        RunConfig {
            input: PathBuf::from("in.jpeg"),
            output: PathBuf::from(output),
            max_iterations: 4,
            min_quality: 85,
            max_quality: 95,
            max_width: Some(480),
            max_height: Some(320),
            framerate: Some(30),
        }
    }

    #[test]
    fn cli_beats_file_beats_hardcoded() {
        let file = DefaultsSection {
            max_iterations: Some(7),
            min_quality: Some(50),
            ..Default::default()
        };
        let cli = Overrides {
            max_iterations: Some(3),
            ..Default::default()
        };
        let cfg = RunConfig::resolve("a".into(), "b.jpeg".into(), &cli, &file);
        assert_eq!(cfg.max_iterations, 3); // CLI
        assert_eq!(cfg.min_quality, 50); // file
        assert_eq!(cfg.max_quality, DEFAULT_MAX_QUALITY); // hard-coded
        assert_eq!(cfg.max_width, Some(DEFAULT_MAX_WIDTH));
        assert_eq!(cfg.framerate, Some(DEFAULT_FRAMERATE));
    }

    #[test]
    fn yaml_defaults_section_parses() {
        let doc = "defaults:\n  max_width: 640\n  max_height: 480\n  min_quality: 70\n";
        let parsed: FileDefaults = serde_yaml::from_str(doc).unwrap();
        assert_eq!(parsed.defaults.max_width, Some(640));
        assert_eq!(parsed.defaults.max_height, Some(480));
        assert_eq!(parsed.defaults.min_quality, Some(70));
        assert_eq!(parsed.defaults.framerate, None);
    }

    #[test]
    fn missing_config_file_contributes_nothing() {
        let loaded = FileDefaults::load(Path::new("no/such/config.yaml")).unwrap();
        assert!(loaded.defaults.max_width.is_none());
    }

    #[test]
    fn malformed_config_file_is_invalid_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "defaults: [not, a, mapping]").unwrap();
        let err = FileDefaults::load(&path).unwrap_err();
        assert!(matches!(err, RotError::InvalidConfiguration(_)));
    }

    #[test]
    fn validate_rejects_bad_quality_range() {
        let mut cfg = base("out.jpeg");
        cfg.min_quality = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = base("out.jpeg");
        cfg.max_quality = 101;
        assert!(cfg.validate().is_err());

        let mut cfg = base("out.jpeg");
        cfg.min_quality = 96;
        cfg.max_quality = 95;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_requires_framerate_for_video_only() {
        let mut cfg = base("out.mp4");
        cfg.framerate = None;
        assert!(cfg.validate().is_err());

        cfg.framerate = Some(0);
        assert!(cfg.validate().is_err());

        let mut cfg = base("out.jpeg");
        cfg.framerate = None;
        assert!(cfg.validate().is_ok());
    }
}
