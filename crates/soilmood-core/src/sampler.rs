//! Averaged sampling of a moisture probe.

use embedded_hal::delay::DelayNs;
use log::debug;

use crate::{config::ConfigError, percent::RawReading};

/// ADC input attenuation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Attenuation {
    Db0,
    Db2_5,
    Db6,
    #[default]
    Db11,
}

/// Moisture probe behind an ADC channel.
pub trait MoistureSensor {
    type Error;

    fn configure_resolution(&mut self, bits: u8) -> Result<(), Self::Error>;

    fn configure_attenuation(&mut self, level: Attenuation) -> Result<(), Self::Error>;

    fn read_raw(&mut self) -> Result<u16, Self::Error>;

    /// Switches probe supply. Probes wired to a fixed rail ignore this.
    fn set_probe_power(&mut self, _on: bool) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Sampling protocol parameters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SamplerConfig {
    /// Drive the probe supply around each reading.
    pub use_power: bool,
    pub settle_ms: u32,
    /// Readings taken and discarded before averaging.
    pub warmup: u8,
    pub samples: u8,
    pub inter_sample_ms: u32,
    pub resolution_bits: u8,
    pub attenuation: Attenuation,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            use_power: false,
            settle_ms: 10,
            warmup: 2,
            samples: 8,
            inter_sample_ms: 5,
            resolution_bits: 12,
            attenuation: Attenuation::Db11,
        }
    }
}

impl SamplerConfig {
    pub const fn with_power(mut self, use_power: bool, settle_ms: u32) -> Self {
        self.use_power = use_power;
        self.settle_ms = settle_ms;
        self
    }

    pub const fn with_warmup(mut self, warmup: u8) -> Self {
        self.warmup = warmup;
        self
    }

    pub const fn with_samples(mut self, samples: u8) -> Self {
        self.samples = samples;
        self
    }

    pub const fn with_inter_sample_ms(mut self, inter_sample_ms: u32) -> Self {
        self.inter_sample_ms = inter_sample_ms;
        self
    }

    pub const fn with_resolution(mut self, bits: u8, attenuation: Attenuation) -> Self {
        self.resolution_bits = bits;
        self.attenuation = attenuation;
        self
    }

    /// Longest time [`MoistureSampler::sample`] can block.
    pub const fn worst_case_ms(&self) -> u32 {
        let reads = self.warmup as u32 + self.samples as u32;
        reads * self.inter_sample_ms + self.settle_ms
    }

    /// Highest code the configured resolution can produce.
    pub const fn max_raw(&self) -> u16 {
        let bits = if self.resolution_bits > 16 {
            16
        } else {
            self.resolution_bits
        };
        ((1u32 << bits) - 1) as u16
    }

    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.samples == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        if self.resolution_bits < 8 || self.resolution_bits > 16 {
            return Err(ConfigError::InvalidResolution {
                bits: self.resolution_bits,
            });
        }
        Ok(())
    }
}

/// Produces one averaged [`RawReading`] per call.
pub struct MoistureSampler<S, D> {
    sensor: S,
    delay: D,
    config: SamplerConfig,
}

impl<S, D> MoistureSampler<S, D>
where
    S: MoistureSensor,
    D: DelayNs,
{
    pub fn new(sensor: S, delay: D, config: SamplerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            sensor,
            delay,
            config,
        })
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// Applies resolution and attenuation to the sensor.
    pub fn configure(&mut self) -> Result<(), S::Error> {
        self.sensor
            .configure_resolution(self.config.resolution_bits)?;
        self.sensor.configure_attenuation(self.config.attenuation)?;
        if self.config.use_power {
            self.sensor.set_probe_power(false)?;
        }
        Ok(())
    }

    /// Powers, settles, warms up, averages and powers down.
    ///
    /// The average truncates. Sensor errors abort the reading; the probe is
    /// still switched off when power control is enabled.
    pub fn sample(&mut self) -> Result<RawReading, S::Error> {
        if self.config.use_power {
            self.sensor.set_probe_power(true)?;
        }
        self.delay.delay_ms(self.config.settle_ms);

        let result = self.read_average();

        if self.config.use_power {
            let off = self.sensor.set_probe_power(false);
            if result.is_ok() {
                off?;
            }
        }

        let reading = result?;
        debug!(
            "sampler: raw={} over {} samples",
            reading.value(),
            self.config.samples
        );
        Ok(reading)
    }

    fn read_average(&mut self) -> Result<RawReading, S::Error> {
        for _ in 0..self.config.warmup {
            self.sensor.read_raw()?;
            self.delay.delay_ms(self.config.inter_sample_ms);
        }

        let count = self.config.samples.max(1) as u32;
        let mut sum = 0u32;
        for _ in 0..count {
            sum += self.sensor.read_raw()? as u32;
            self.delay.delay_ms(self.config.inter_sample_ms);
        }

        Ok(RawReading((sum / count) as u16))
    }
}
