//! Host-side doubles shared by the unit and scenario tests.

use core::cell::Cell;

use bitcanvas::{Glyph, GlyphSource, Mirror, Rotation};
use embedded_hal::delay::DelayNs;

use crate::{
    panel::{PanelDriver, PartialWindow},
    sampler::{Attenuation, MoistureSensor},
};

/// Every printable character is a solid 5x7 block; `%` is missing.
pub struct BlockFont {
    scale: u16,
}

const BLOCK: [u8; 7] = [0b1111_1000; 7];

impl BlockFont {
    pub const fn new(scale: u16) -> Self {
        Self { scale }
    }
}

impl GlyphSource for BlockFont {
    fn cell_size(&self) -> (u16, u16) {
        (6, 8)
    }

    fn scale(&self) -> u16 {
        self.scale
    }

    fn glyph(&self, c: char) -> Option<Glyph<'_>> {
        match c {
            '%' => None,
            ' ' => Some(Glyph::new(5, 7, &[0; 7])),
            c if c.is_ascii_graphic() => Some(Glyph::new(5, 7, &BLOCK)),
            _ => None,
        }
    }
}

pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Sensor whose reading is set from the test through a shared cell.
pub struct ScriptedSensor<'a> {
    code: &'a Cell<Result<u16, SensorFault>>,
    pub resolution: Option<u8>,
    pub attenuation: Option<Attenuation>,
    pub reads: usize,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SensorFault;

impl<'a> ScriptedSensor<'a> {
    pub const fn new(code: &'a Cell<Result<u16, SensorFault>>) -> Self {
        Self {
            code,
            resolution: None,
            attenuation: None,
            reads: 0,
        }
    }
}

impl MoistureSensor for ScriptedSensor<'_> {
    type Error = SensorFault;

    fn configure_resolution(&mut self, bits: u8) -> Result<(), Self::Error> {
        self.resolution = Some(bits);
        Ok(())
    }

    fn configure_attenuation(&mut self, level: Attenuation) -> Result<(), Self::Error> {
        self.attenuation = Some(level);
        Ok(())
    }

    fn read_raw(&mut self) -> Result<u16, Self::Error> {
        self.reads += 1;
        self.code.get()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PanelCall {
    Init(Rotation, Mirror),
    Full { front: Vec<u8>, shadow: Vec<u8> },
    Partial { window: PartialWindow, data: Vec<u8> },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PanelTimeout;

/// Records every call. Refreshes fail while `failures` is non-zero, each
/// failure consuming one.
pub struct RecordingPanel<'a> {
    pub calls: Vec<PanelCall>,
    failures: &'a Cell<usize>,
}

impl<'a> RecordingPanel<'a> {
    pub fn new(failures: &'a Cell<usize>) -> Self {
        Self {
            calls: Vec::new(),
            failures,
        }
    }

    pub fn refreshes(&self) -> impl Iterator<Item = &PanelCall> {
        self.calls
            .iter()
            .filter(|call| !matches!(call, PanelCall::Init(..)))
    }

    fn maybe_fail(&mut self) -> Result<(), PanelTimeout> {
        let remaining = self.failures.get();
        if remaining > 0 {
            self.failures.set(remaining - 1);
            return Err(PanelTimeout);
        }
        Ok(())
    }
}

impl PanelDriver for RecordingPanel<'_> {
    type Error = PanelTimeout;

    fn init_display(&mut self, rotation: Rotation, mirror: Mirror) -> Result<(), Self::Error> {
        self.calls.push(PanelCall::Init(rotation, mirror));
        Ok(())
    }

    fn full_refresh(&mut self, front: &[u8], shadow: &[u8]) -> Result<(), Self::Error> {
        self.maybe_fail()?;
        self.calls.push(PanelCall::Full {
            front: front.to_vec(),
            shadow: shadow.to_vec(),
        });
        Ok(())
    }

    fn partial_refresh(&mut self, window: PartialWindow, data: &[u8]) -> Result<(), Self::Error> {
        self.maybe_fail()?;
        self.calls.push(PanelCall::Partial {
            window,
            data: data.to_vec(),
        });
        Ok(())
    }
}
