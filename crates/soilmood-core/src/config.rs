//! Startup configuration and its validation.

use core::fmt;

use bitcanvas::{CanvasError, Mirror, RegionError, Rotation};

use crate::{
    mood::BandTable,
    percent::Calibration,
    policy::PolicyConfig,
    sampler::SamplerConfig,
    scene::SceneLayout,
};

/// Fatal configuration problems detected before the first cycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// Dry and wet calibration points are equal.
    DegenerateCalibration { raw: u16 },
    /// The sampler was asked for zero samples per reading.
    ZeroSamples,
    /// ADC resolution outside 8..=16 bits.
    InvalidResolution { bits: u8 },
    /// Band table has no bands.
    EmptyBandTable,
    /// Band table exceeds its fixed capacity.
    TooManyBands,
    /// First band would cover no percentages.
    FirstBandEmpty,
    /// Band upper bounds are not strictly increasing.
    BandsNotIncreasing { index: usize },
    /// Last band must end at 100.
    LastBandNotFull { upper: u8 },
    /// Dynamic region geometry is invalid.
    Region(RegionError),
    /// Canvas buffers are mis-sized or disagree.
    Canvas(CanvasError),
}

impl From<RegionError> for ConfigError {
    fn from(value: RegionError) -> Self {
        Self::Region(value)
    }
}

impl From<CanvasError> for ConfigError {
    fn from(value: CanvasError) -> Self {
        Self::Canvas(value)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateCalibration { raw } => {
                write!(f, "dry and wet calibration are both {raw}")
            }
            Self::ZeroSamples => f.write_str("sampler needs at least one sample"),
            Self::InvalidResolution { bits } => write!(f, "unsupported ADC resolution {bits} bits"),
            Self::EmptyBandTable => f.write_str("mood band table is empty"),
            Self::TooManyBands => f.write_str("mood band table is full"),
            Self::FirstBandEmpty => f.write_str("first mood band covers no percentages"),
            Self::BandsNotIncreasing { index } => {
                write!(f, "mood band {index} does not raise the upper bound")
            }
            Self::LastBandNotFull { upper } => {
                write!(f, "last mood band ends at {upper}, expected 100")
            }
            Self::Region(err) => write!(f, "dynamic region: {err}"),
            Self::Canvas(err) => write!(f, "canvas: {err}"),
        }
    }
}

/// Everything the monitor needs that is fixed for the life of the device.
#[derive(Clone, Debug)]
pub struct MonitorConfig {
    pub dry_raw: u16,
    pub wet_raw: u16,
    pub sampler: SamplerConfig,
    pub policy: PolicyConfig,
    pub layout: SceneLayout,
    pub bands: BandTable,
    pub rotation: Rotation,
    pub mirror: Mirror,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            dry_raw: 3200,
            wet_raw: 1400,
            sampler: SamplerConfig::default(),
            policy: PolicyConfig::default(),
            layout: SceneLayout::default(),
            bands: BandTable::three_band(),
            rotation: Rotation::Deg90,
            mirror: Mirror::None,
        }
    }
}

impl MonitorConfig {
    pub fn with_calibration(mut self, dry_raw: u16, wet_raw: u16) -> Self {
        self.dry_raw = dry_raw;
        self.wet_raw = wet_raw;
        self
    }

    pub fn with_sampler(mut self, sampler: SamplerConfig) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn with_policy(mut self, policy: PolicyConfig) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_layout(mut self, layout: SceneLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_bands(mut self, bands: BandTable) -> Self {
        self.bands = bands;
        self
    }

    pub fn with_orientation(mut self, rotation: Rotation, mirror: Mirror) -> Self {
        self.rotation = rotation;
        self.mirror = mirror;
        self
    }

    /// Checked calibration built from `dry_raw`/`wet_raw`.
    pub fn calibration(&self) -> Result<Calibration, ConfigError> {
        Calibration::new(self.dry_raw, self.wet_raw)
    }

    /// Runs every startup check against a `width` x `height` memory frame.
    ///
    /// Returns the first problem found.
    pub fn validate(&self, width: u16, height: u16) -> Result<(), ConfigError> {
        self.calibration()?;
        self.sampler.validate()?;
        self.bands.validate()?;
        self.layout.dynamic_region(width, height)?;
        Ok(())
    }
}
