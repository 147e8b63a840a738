//! SSD1680 command set and RAM window encoding.

use soilmood_core::PartialWindow;

pub mod cmd {
    pub const DRIVER_OUTPUT_CONTROL: u8 = 0x01;
    pub const DATA_ENTRY_MODE: u8 = 0x11;
    pub const SW_RESET: u8 = 0x12;
    pub const TEMP_SENSOR_CONTROL: u8 = 0x18;
    pub const MASTER_ACTIVATION: u8 = 0x20;
    pub const DISPLAY_UPDATE_CONTROL_2: u8 = 0x22;
    pub const WRITE_RAM_BW: u8 = 0x24;
    /// Second RAM; holds the previous frame for differential waveforms.
    pub const WRITE_RAM_PREVIOUS: u8 = 0x26;
    pub const BORDER_WAVEFORM_CONTROL: u8 = 0x3C;
    pub const SET_RAM_X_WINDOW: u8 = 0x44;
    pub const SET_RAM_Y_WINDOW: u8 = 0x45;
    pub const SET_RAM_X_COUNTER: u8 = 0x4E;
    pub const SET_RAM_Y_COUNTER: u8 = 0x4F;
}

pub mod flag {
    /// X increment, Y increment.
    pub const DATA_ENTRY_INCRY_INCRX: u8 = 0x03;
    pub const INTERNAL_TEMP_SENSOR: u8 = 0x80;
    pub const BORDER_WAVEFORM_WHITE: u8 = 0x05;
    /// Clock, analog, temperature, LUT load and full waveform.
    pub const UPDATE_FULL: u8 = 0xF7;
    /// Same sequence with the differential (partial) waveform.
    pub const UPDATE_PARTIAL: u8 = 0xFF;
}

/// Payload of [`cmd::DRIVER_OUTPUT_CONTROL`] for `gate_lines` lines.
pub const fn driver_output(gate_lines: u16) -> [u8; 3] {
    let last = gate_lines.saturating_sub(1);
    [(last & 0xFF) as u8, (last >> 8) as u8, 0x00]
}

/// Inclusive controller RAM window.
///
/// X is addressed in bytes, Y in gate lines.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct RamWindow {
    pub x_start: u8,
    pub x_end: u8,
    pub y_start: u16,
    pub y_end: u16,
}

impl RamWindow {
    /// Window covering a whole `width` x `height` frame.
    pub const fn full(width: u16, height: u16) -> Self {
        Self {
            x_start: 0,
            x_end: (width / 8).saturating_sub(1) as u8,
            y_start: 0,
            y_end: height.saturating_sub(1),
        }
    }

    /// Converts a pixel window. `None` for an empty, unaligned or
    /// out-of-range window.
    pub const fn from_partial(window: PartialWindow, width: u16, height: u16) -> Option<Self> {
        if window.width == 0 || window.height == 0 {
            return None;
        }
        if window.x % 8 != 0 || window.width % 8 != 0 {
            return None;
        }

        let right = window.x as u32 + window.width as u32;
        let bottom = window.y as u32 + window.height as u32;
        if right > width as u32 || bottom > height as u32 || right / 8 > 0x100 {
            return None;
        }

        Some(Self {
            x_start: (window.x / 8) as u8,
            x_end: (right / 8 - 1) as u8,
            y_start: window.y,
            y_end: (bottom - 1) as u16,
        })
    }

    pub const fn x_payload(&self) -> [u8; 2] {
        [self.x_start, self.x_end]
    }

    /// Start and end line, each little-endian.
    pub const fn y_payload(&self) -> [u8; 4] {
        [
            (self.y_start & 0xFF) as u8,
            (self.y_start >> 8) as u8,
            (self.y_end & 0xFF) as u8,
            (self.y_end >> 8) as u8,
        ]
    }

    pub const fn y_counter_payload(&self) -> [u8; 2] {
        [(self.y_start & 0xFF) as u8, (self.y_start >> 8) as u8]
    }

    /// Bytes the window takes in RAM.
    pub const fn byte_len(&self) -> usize {
        (self.x_end as usize - self.x_start as usize + 1)
            * (self.y_end as usize - self.y_start as usize + 1)
    }
}
