pub mod display;
pub mod epd_protocol;
