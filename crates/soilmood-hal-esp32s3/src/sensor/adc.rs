use esp_hal::{
    Blocking,
    analog::adc::{Adc, AdcChannel, AdcConfig, AdcPin, Attenuation as HalAttenuation},
    gpio::{AnalogPin, Level, Output},
    peripherals::ADC1,
};
use log::debug;
use soilmood_core::{Attenuation, MoistureSensor};

/// The ESP32-S3 SAR ADC converts at a fixed width.
pub const ADC_RESOLUTION_BITS: u8 = 12;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AdcError {
    UnsupportedResolution { bits: u8 },
    /// Attenuation is bound when the pin is enabled and cannot change later.
    AttenuationLocked { configured: Attenuation },
    Conversion,
}

const fn hal_attenuation(level: Attenuation) -> HalAttenuation {
    match level {
        Attenuation::Db0 => HalAttenuation::_0dB,
        Attenuation::Db2_5 => HalAttenuation::_2p5dB,
        Attenuation::Db6 => HalAttenuation::_6dB,
        Attenuation::Db11 => HalAttenuation::_11dB,
    }
}

/// Capacitive moisture probe on an ADC1 channel, optionally powered from a
/// GPIO so it only draws current while sampling.
pub struct AdcProbe<'d, PIN> {
    adc: Adc<'d, ADC1<'d>, Blocking>,
    pin: AdcPin<PIN, ADC1<'d>>,
    power: Option<Output<'d>>,
    attenuation: Attenuation,
}

impl<'d, PIN> AdcProbe<'d, PIN>
where
    PIN: AdcChannel + AnalogPin,
{
    pub fn new(
        adc: ADC1<'d>,
        pin: PIN,
        attenuation: Attenuation,
        power: Option<Output<'d>>,
    ) -> Self {
        let mut config = AdcConfig::new();
        let pin = config.enable_pin(pin, hal_attenuation(attenuation));
        let adc = Adc::new(adc, config);

        Self {
            adc,
            pin,
            power,
            attenuation,
        }
    }
}

impl<'d, PIN> MoistureSensor for AdcProbe<'d, PIN>
where
    PIN: AdcChannel,
{
    type Error = AdcError;

    fn configure_resolution(&mut self, bits: u8) -> Result<(), Self::Error> {
        if bits != ADC_RESOLUTION_BITS {
            return Err(AdcError::UnsupportedResolution { bits });
        }
        Ok(())
    }

    fn configure_attenuation(&mut self, level: Attenuation) -> Result<(), Self::Error> {
        if level != self.attenuation {
            return Err(AdcError::AttenuationLocked {
                configured: self.attenuation,
            });
        }
        Ok(())
    }

    fn read_raw(&mut self) -> Result<u16, Self::Error> {
        nb::block!(self.adc.read_oneshot(&mut self.pin)).map_err(|()| AdcError::Conversion)
    }

    fn set_probe_power(&mut self, on: bool) -> Result<(), Self::Error> {
        if let Some(power) = self.power.as_mut() {
            power.set_level(Level::from(on));
            debug!("adc: probe power {}", if on { "on" } else { "off" });
        }
        Ok(())
    }
}
