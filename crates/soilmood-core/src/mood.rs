//! Percentage to mood band classification.

use core::ops::RangeInclusive;

use heapless::Vec;

use crate::{config::ConfigError, percent::Percent};

/// Maximum number of bands a table can hold.
pub const MAX_BANDS: usize = 8;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mood {
    Dry,
    Damp,
    Ok,
    Ideal,
    Wet,
    Saturated,
}

/// Extra marks drawn on the face.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decoration {
    SweatDrops,
}

/// Point relative to the face centre, in per-mille of the face radius.
///
/// Positive `dy` points down.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FacePoint {
    pub dx: i16,
    pub dy: i16,
}

impl FacePoint {
    pub const fn new(dx: i16, dy: i16) -> Self {
        Self { dx, dy }
    }
}

/// How the face looks for a band.
///
/// The mouth is a quadratic curve through `mouth[0]` and `mouth[2]` with
/// `mouth[1]` as control point. A control point above the ends frowns, one
/// below smiles.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Expression {
    /// Horizontal distance of each eye from the centre line.
    pub eye_dx: u16,
    /// Vertical eye offset; negative is above the centre.
    pub eye_dy: i16,
    pub eye_radius: u16,
    pub mouth: [FacePoint; 3],
    pub decoration: Option<Decoration>,
}

impl Expression {
    const EYES_DX: u16 = 350;
    const EYES_DY: i16 = -250;
    const EYE_RADIUS: u16 = 110;

    const fn with_mouth(left: FacePoint, control: FacePoint, right: FacePoint) -> Self {
        Self {
            eye_dx: Self::EYES_DX,
            eye_dy: Self::EYES_DY,
            eye_radius: Self::EYE_RADIUS,
            mouth: [left, control, right],
            decoration: None,
        }
    }

    pub const fn frown() -> Self {
        Self::with_mouth(
            FacePoint::new(-400, 500),
            FacePoint::new(0, 200),
            FacePoint::new(400, 500),
        )
    }

    pub const fn slight_frown() -> Self {
        Self::with_mouth(
            FacePoint::new(-380, 450),
            FacePoint::new(0, 330),
            FacePoint::new(380, 450),
        )
    }

    pub const fn neutral() -> Self {
        Self::with_mouth(
            FacePoint::new(-380, 400),
            FacePoint::new(0, 400),
            FacePoint::new(380, 400),
        )
    }

    pub const fn smile() -> Self {
        Self::with_mouth(
            FacePoint::new(-420, 300),
            FacePoint::new(0, 650),
            FacePoint::new(420, 300),
        )
    }

    pub const fn with_decoration(mut self, decoration: Decoration) -> Self {
        self.decoration = Some(decoration);
        self
    }
}

/// One band of the table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MoodBand {
    /// Exclusive upper bound; the last band also owns 100.
    pub upper: u8,
    pub mood: Mood,
    pub label: &'static str,
    pub expression: Expression,
}

impl MoodBand {
    pub const fn new(upper: u8, mood: Mood, label: &'static str, expression: Expression) -> Self {
        Self {
            upper,
            mood,
            label,
            expression,
        }
    }
}

/// Ordered, gap-free partition of `0..=100`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BandTable {
    bands: Vec<MoodBand, MAX_BANDS>,
}

impl BandTable {
    /// Builds a table and checks that the bands cover `0..=100` exactly once.
    pub fn new(bands: &[MoodBand]) -> Result<Self, ConfigError> {
        let bands = Vec::from_slice(bands).map_err(|_| ConfigError::TooManyBands)?;
        let table = Self { bands };
        table.validate()?;
        Ok(table)
    }

    /// `DRY` below 35, `OK` below 70, `WET` from 70.
    pub fn three_band() -> Self {
        Self::from_preset(&[
            MoodBand::new(35, Mood::Dry, "DRY", Expression::frown()),
            MoodBand::new(70, Mood::Ok, "OK", Expression::smile()),
            MoodBand::new(
                100,
                Mood::Wet,
                "WET",
                Expression::neutral().with_decoration(Decoration::SweatDrops),
            ),
        ])
    }

    /// Twenty-point steps from `DRY` to `SATURATED`.
    pub fn five_band() -> Self {
        Self::from_preset(&[
            MoodBand::new(20, Mood::Dry, "DRY", Expression::frown()),
            MoodBand::new(40, Mood::Damp, "DAMP", Expression::slight_frown()),
            MoodBand::new(60, Mood::Ideal, "IDEAL", Expression::smile()),
            MoodBand::new(80, Mood::Wet, "WET", Expression::neutral()),
            MoodBand::new(
                100,
                Mood::Saturated,
                "SATURATED",
                Expression::slight_frown().with_decoration(Decoration::SweatDrops),
            ),
        ])
    }

    fn from_preset(bands: &[MoodBand]) -> Self {
        let mut table = Vec::new();
        for band in bands {
            // Presets are well under capacity.
            let _ = table.push(*band);
        }
        Self { bands: table }
    }

    /// Checks coverage of `0..=100`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Some(first) = self.bands.first() else {
            return Err(ConfigError::EmptyBandTable);
        };
        if first.upper == 0 {
            return Err(ConfigError::FirstBandEmpty);
        }

        for (index, pair) in self.bands.windows(2).enumerate() {
            if pair[1].upper <= pair[0].upper {
                return Err(ConfigError::BandsNotIncreasing { index: index + 1 });
            }
        }

        match self.bands.last() {
            Some(last) if last.upper == 100 => Ok(()),
            Some(last) => Err(ConfigError::LastBandNotFull { upper: last.upper }),
            None => Err(ConfigError::EmptyBandTable),
        }
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn bands(&self) -> &[MoodBand] {
        &self.bands
    }

    /// Index of the band owning `percent`.
    pub fn index_of(&self, percent: Percent) -> usize {
        let value = percent.value();
        self.bands
            .iter()
            .position(|band| band.upper > value)
            .unwrap_or(self.bands.len().saturating_sub(1))
    }

    /// Band owning `percent`: the first whose upper bound exceeds it, else
    /// the last band.
    ///
    /// The table must be non-empty, which every constructor guarantees.
    pub fn classify(&self, percent: Percent) -> &MoodBand {
        &self.bands[self.index_of(percent)]
    }

    /// Inclusive percentages owned by band `index`.
    pub fn range_of(&self, index: usize) -> Option<RangeInclusive<u8>> {
        let band = self.bands.get(index)?;
        let start = match index {
            0 => 0,
            _ => self.bands[index - 1].upper,
        };
        let end = if index + 1 == self.bands.len() {
            100
        } else {
            band.upper - 1
        };
        Some(start..=end)
    }
}
