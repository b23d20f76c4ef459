//! Run configuration: command line values overlaid with an optional TOML file.
//!
//! The file has two optional tables:
//!
//! ```toml
//! [parameters]
//! resize_width = 256
//! noise_level = 10
//!
//! [options]
//! crop_mode = "fixed_size"
//! fill = { kind = "replicate" }
//! ```
//!
//! Keys present in the file replace the corresponding command line value;
//! everything else keeps the value from the flags (or its default).

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use rasterbatch_core::{
    ContrastPivot, CropMode, FillMode, PipelineOptions, ScaleStrategy, TransformParameters,
};

use crate::args::Args;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Everything needed to build a pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunConfig {
    pub parameters: TransformParameters,
    pub options: PipelineOptions,
}

/// Keys of a config file; absent keys leave the current value alone.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    parameters: ParametersPatch,
    options: OptionsPatch,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ParametersPatch {
    resize_height: Option<u32>,
    resize_width: Option<u32>,
    rotation_angle_degrees: Option<f64>,
    brightness_level: Option<u32>,
    contrast_level: Option<u32>,
    saturation_level: Option<u32>,
    noise_level: Option<u32>,
    shift_level: Option<u32>,
    tilt_level: Option<f64>,
    stretch_level: Option<u32>,
    crop_size: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OptionsPatch {
    fill: Option<FillMode>,
    crop_mode: Option<CropMode>,
    scale: Option<ScaleStrategy>,
    noise_seed: Option<u64>,
    contrast_pivot: Option<ContrastPivot>,
}

fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

impl ParametersPatch {
    fn apply(self, p: &mut TransformParameters) {
        set(&mut p.resize_height, self.resize_height);
        set(&mut p.resize_width, self.resize_width);
        set(&mut p.rotation_angle_degrees, self.rotation_angle_degrees);
        set(&mut p.brightness_level, self.brightness_level);
        set(&mut p.contrast_level, self.contrast_level);
        set(&mut p.saturation_level, self.saturation_level);
        set(&mut p.noise_level, self.noise_level);
        set(&mut p.shift_level, self.shift_level);
        set(&mut p.tilt_level, self.tilt_level);
        set(&mut p.stretch_level, self.stretch_level);
        set(&mut p.crop_size, self.crop_size);
    }
}

impl OptionsPatch {
    fn apply(self, o: &mut PipelineOptions) {
        set(&mut o.fill, self.fill);
        set(&mut o.crop_mode, self.crop_mode);
        set(&mut o.scale, self.scale);
        set(&mut o.noise_seed, self.noise_seed);
        set(&mut o.contrast_pivot, self.contrast_pivot);
    }
}

impl RunConfig {
    pub fn from_args(args: &Args) -> Self {
        Self {
            parameters: args.parameters(),
            options: args.options(),
        }
    }

    /// Flags, then the `--config` file on top when one is given.
    pub fn resolve(args: &Args) -> Result<Self, ConfigError> {
        let config = Self::from_args(args);
        match &args.config {
            Some(path) => config.overlay_file(path),
            None => Ok(config),
        }
    }

    pub fn overlay_file(self, path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.overlay_str(&text).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Overlay the keys of a TOML document onto this configuration.
    ///
    /// Tagged options (`fill`, `scale`) are replaced whole.
    pub fn overlay_str(mut self, text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        file.parameters.apply(&mut self.parameters);
        file.options.apply(&mut self.options);
        Ok(self)
    }
}
