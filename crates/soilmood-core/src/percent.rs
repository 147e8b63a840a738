//! Raw sensor code to moisture percentage.

use crate::config::ConfigError;

/// Averaged sensor code.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
pub struct RawReading(pub u16);

impl RawReading {
    pub const fn value(self) -> u16 {
        self.0
    }
}

/// Moisture percentage in `0..=100`.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
pub struct Percent(u8);

impl Percent {
    pub const ZERO: Self = Self(0);
    pub const FULL: Self = Self(100);

    /// Clamps `value` to 100.
    pub const fn new(value: u8) -> Self {
        if value > 100 { Self(100) } else { Self(value) }
    }

    /// Clamps a signed intermediate into `0..=100`.
    pub const fn saturating_from(value: i32) -> Self {
        if value <= 0 {
            Self(0)
        } else if value >= 100 {
            Self(100)
        } else {
            Self(value as u8)
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// Number of decimal digits needed to print the value.
    pub const fn digit_count(self) -> usize {
        match self.0 {
            0..=9 => 1,
            10..=99 => 2,
            _ => 3,
        }
    }
}

/// Two-point linear calibration.
///
/// `dry_raw` maps to 0 % and `wet_raw` to 100 %.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Calibration {
    dry_raw: u16,
    wet_raw: u16,
}

impl Calibration {
    pub const fn new(dry_raw: u16, wet_raw: u16) -> Result<Self, ConfigError> {
        if dry_raw == wet_raw {
            return Err(ConfigError::DegenerateCalibration { raw: dry_raw });
        }

        Ok(Self { dry_raw, wet_raw })
    }

    pub const fn dry_raw(&self) -> u16 {
        self.dry_raw
    }

    pub const fn wet_raw(&self) -> u16 {
        self.wet_raw
    }

    /// `true` when a wetter probe reads a *higher* code than a dry one.
    pub const fn is_inverted(&self) -> bool {
        self.wet_raw > self.dry_raw
    }

    /// Maps `raw` to a percentage, rounding half away from zero and clamping
    /// readings beyond either calibration point.
    pub const fn to_percent(&self, raw: RawReading) -> Percent {
        let numerator = (self.dry_raw as i32 - raw.0 as i32) * 100;
        let denominator = self.dry_raw as i32 - self.wet_raw as i32;
        Percent::saturating_from(div_round(numerator, denominator))
    }
}

/// Integer division rounding half away from zero. `d` must be non-zero.
const fn div_round(n: i32, d: i32) -> i32 {
    let (n, d) = if d < 0 { (-n, -d) } else { (n, d) };
    if n >= 0 {
        (2 * n + d) / (2 * d)
    } else {
        -((-2 * n + d) / (2 * d))
    }
}
