#![cfg_attr(not(test), no_std)]

//! Soil moisture to mood screen pipeline.
//!
//! A [`MoistureMonitor`] samples a [`MoistureSensor`], maps the averaged code
//! to a [`Percent`], classifies it into a [`MoodBand`], draws the scene into a
//! packed canvas and pushes it to a [`PanelDriver`] as a full or partial
//! refresh, as decided by the [`UpdatePolicy`].

pub mod config;
pub mod monitor;
pub mod mood;
pub mod panel;
pub mod percent;
pub mod policy;
pub mod sampler;
pub mod scene;

#[cfg(test)]
mod test_support;

pub use config::{ConfigError, MonitorConfig};
pub use monitor::{CycleReport, MoistureMonitor, MonitorError, MonitorParts, Phase, Reading};
pub use mood::{BandTable, Decoration, Expression, FacePoint, Mood, MoodBand};
pub use panel::{PanelDriver, PartialWindow};
pub use percent::{Calibration, Percent, RawReading};
pub use policy::{PolicyConfig, RefreshDecision, RefreshMode, UpdatePolicy};
pub use sampler::{Attenuation, MoistureSampler, MoistureSensor, SamplerConfig};
pub use scene::{SceneLayout, SceneRenderer, bar_fill_width};
