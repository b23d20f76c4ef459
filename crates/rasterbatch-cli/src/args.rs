//! Command line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use rasterbatch_core::normalize::ScaleStrategy;
use rasterbatch_core::{ContrastPivot, CropMode, FillMode, PipelineOptions, TransformParameters};

/// Apply one set of transformations to every image in a folder.
#[derive(Parser, Debug, Clone)]
#[command(name = "rasterbatch")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Directory with the source images.
    #[arg(short, long, value_name = "DIR")]
    pub input: PathBuf,

    /// Directory for the transformed images. Nothing is written when absent.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// TOML file with `[parameters]` and `[options]` tables. Values in the
    /// file take precedence over flags.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Target height in pixels (1-10000).
    #[arg(long, default_value_t = 512, value_name = "PX")]
    pub resize_height: u32,

    /// Target width in pixels (1-10000).
    #[arg(long, default_value_t = 512, value_name = "PX")]
    pub resize_width: u32,

    /// Rotation in degrees, counter-clockwise.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true, value_name = "DEG")]
    pub rotation: f64,

    /// Brightness level (0-100, 50 = unchanged).
    #[arg(long, default_value_t = 50, value_name = "LEVEL")]
    pub brightness: u32,

    /// Contrast level (0-100, 50 = unchanged).
    #[arg(long, default_value_t = 50, value_name = "LEVEL")]
    pub contrast: u32,

    /// Saturation level (0-100, 50 = unchanged).
    #[arg(long, default_value_t = 50, value_name = "LEVEL")]
    pub saturation: u32,

    /// Gaussian noise level (0-100).
    #[arg(long, default_value_t = 0, value_name = "LEVEL")]
    pub noise: u32,

    /// Shift level (0-100).
    #[arg(long, default_value_t = 0, value_name = "LEVEL")]
    pub shift: u32,

    /// Tilt level (0-100).
    #[arg(long, default_value_t = 0.0, value_name = "LEVEL")]
    pub tilt: f64,

    /// Stretch level (0-100).
    #[arg(long, default_value_t = 0, value_name = "LEVEL")]
    pub stretch: u32,

    /// Crop size: a percentage, or an edge in pixels with `--crop-mode fixed`.
    #[arg(long, default_value_t = 0, value_name = "N")]
    pub crop_size: u32,

    /// How `--crop-size` is interpreted.
    #[arg(long, value_enum, default_value_t = CropModeArg::Percent)]
    pub crop_mode: CropModeArg,

    /// Edge fill for warps: `replicate` or an `R,G,B` colour.
    #[arg(long, default_value = "0,0,0", value_parser = parse_fill, value_name = "FILL")]
    pub fill: FillMode,

    /// Center of the contrast stretch.
    #[arg(long, value_enum, default_value_t = PivotArg::Mean)]
    pub contrast_pivot: PivotArg,

    /// Position inside the scale range (0 = smallest, 1 = largest).
    #[arg(long, default_value_t = 1.0, value_name = "T", conflicts_with = "scale_sampled")]
    pub scale_position: f64,

    /// Draw each image's scale factor at random from this seed.
    #[arg(long, value_name = "SEED")]
    pub scale_sampled: Option<u64>,

    /// Base seed of the noise stage.
    #[arg(long, default_value_t = 0, value_name = "SEED")]
    pub noise_seed: u64,

    /// Abort the whole batch on the first failing image.
    #[arg(long)]
    pub strict: bool,

    /// Process images on the calling thread only.
    #[arg(long)]
    pub sequential: bool,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropModeArg {
    /// Trim a percentage of each axis.
    Percent,
    /// Cut a centered square window.
    Fixed,
}

impl From<CropModeArg> for CropMode {
    fn from(arg: CropModeArg) -> Self {
        match arg {
            CropModeArg::Percent => CropMode::PercentTrim,
            CropModeArg::Fixed => CropMode::FixedSize,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotArg {
    /// Per-channel mean of the image.
    Mean,
    /// Mid-gray, 127.5.
    Midpoint,
}

impl From<PivotArg> for ContrastPivot {
    fn from(arg: PivotArg) -> Self {
        match arg {
            PivotArg::Mean => ContrastPivot::ChannelMean,
            PivotArg::Midpoint => ContrastPivot::Midpoint,
        }
    }
}

fn parse_fill(s: &str) -> Result<FillMode, String> {
    if s.eq_ignore_ascii_case("replicate") {
        return Ok(FillMode::Replicate);
    }
    let channels: Vec<&str> = s.split(',').map(str::trim).collect();
    if channels.len() != 3 {
        return Err(format!("expected `replicate` or R,G,B, got `{}`", s));
    }
    let mut rgb = [0u8; 3];
    for (slot, channel) in rgb.iter_mut().zip(&channels) {
        *slot = channel
            .parse()
            .map_err(|_| format!("`{}` is not a channel value in 0-255", channel))?;
    }
    Ok(FillMode::Constant { rgb })
}

impl Args {
    pub fn parameters(&self) -> TransformParameters {
        TransformParameters {
            resize_height: self.resize_height,
            resize_width: self.resize_width,
            rotation_angle_degrees: self.rotation,
            brightness_level: self.brightness,
            contrast_level: self.contrast,
            saturation_level: self.saturation,
            noise_level: self.noise,
            shift_level: self.shift,
            tilt_level: self.tilt,
            stretch_level: self.stretch,
            crop_size: self.crop_size,
        }
    }

    pub fn options(&self) -> PipelineOptions {
        let scale = match self.scale_sampled {
            Some(seed) => ScaleStrategy::Sampled { seed },
            None => ScaleStrategy::Deterministic {
                position: self.scale_position,
            },
        };
        PipelineOptions {
            fill: self.fill,
            crop_mode: self.crop_mode.into(),
            scale,
            noise_seed: self.noise_seed,
            contrast_pivot: self.contrast_pivot.into(),
        }
    }
}
