//! ESP32-S3 board support for the soil mood display.
//!
//! SSD1680 e-paper adapter, ADC1 moisture probe and the built-in 5x7 font.

#![cfg_attr(not(test), no_std)]

pub mod platform;
pub mod render;
#[cfg(target_arch = "xtensa")]
pub mod sensor;
