use bitcanvas::{Mirror, Rotation};
use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiDevice,
};
use log::{debug, info, warn};
use soilmood_core::{PanelDriver, PartialWindow};

use super::epd_protocol::{self, RamWindow, cmd, flag};

const RESET_PULSE_MS: u32 = 10;
const BUSY_POLL_MS: u32 = 5;
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PanelError<SpiErr, BusyErr, DcErr, RstErr> {
    Spi(SpiErr),
    Busy(BusyErr),
    Dc(DcErr),
    Rst(RstErr),
    /// BUSY stayed high past the configured budget.
    BusyTimeout,
    FrameLength { expected: usize, actual: usize },
    /// Partial window is unaligned or outside the panel.
    Window(PartialWindow),
}

pub type EpdResult<SpiErr, BusyErr, DcErr, RstErr, T = ()> =
    Result<T, PanelError<SpiErr, BusyErr, DcErr, RstErr>>;

/// SSD1680 panel over a 4-wire SPI link.
///
/// Frames arrive already laid out in controller memory order, so RAM is
/// always written with X and Y incrementing.
#[derive(Debug)]
pub struct EpdPanel<SPI, BUSY, DC, RST, DELAY> {
    spi: SPI,
    busy: BUSY,
    dc: DC,
    rst: RST,
    delay: DELAY,
    width: u16,
    height: u16,
    busy_timeout_ms: u32,
}

impl<SPI, BUSY, DC, RST, DELAY> EpdPanel<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    /// `width` is the source line count in pixels and must be a multiple of
    /// eight; `height` is the gate line count.
    pub fn new(
        spi: SPI,
        busy: BUSY,
        dc: DC,
        rst: RST,
        delay: DELAY,
        width: u16,
        height: u16,
    ) -> Self {
        Self {
            spi,
            busy,
            dc,
            rst,
            delay,
            width,
            height,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }

    pub fn with_busy_timeout_ms(mut self, busy_timeout_ms: u32) -> Self {
        self.busy_timeout_ms = busy_timeout_ms;
        self
    }

    pub fn frame_len(&self) -> usize {
        (self.width as usize / 8) * self.height as usize
    }

    fn hardware_reset(&mut self) -> EpdResult<SPI::Error, BUSY::Error, DC::Error, RST::Error> {
        self.rst.set_low().map_err(PanelError::Rst)?;
        self.delay.delay_ms(RESET_PULSE_MS);
        self.rst.set_high().map_err(PanelError::Rst)?;
        self.delay.delay_ms(RESET_PULSE_MS);
        Ok(())
    }

    fn command(
        &mut self,
        command: u8,
    ) -> EpdResult<SPI::Error, BUSY::Error, DC::Error, RST::Error> {
        self.dc.set_low().map_err(PanelError::Dc)?;
        self.spi.write(&[command]).map_err(PanelError::Spi)
    }

    fn data(&mut self, data: &[u8]) -> EpdResult<SPI::Error, BUSY::Error, DC::Error, RST::Error> {
        self.dc.set_high().map_err(PanelError::Dc)?;
        self.spi.write(data).map_err(PanelError::Spi)
    }

    fn command_with(
        &mut self,
        command: u8,
        data: &[u8],
    ) -> EpdResult<SPI::Error, BUSY::Error, DC::Error, RST::Error> {
        self.command(command)?;
        self.data(data)
    }

    /// Polls BUSY until the controller is idle or the budget runs out.
    fn wait_idle(&mut self) -> EpdResult<SPI::Error, BUSY::Error, DC::Error, RST::Error> {
        let mut waited_ms = 0u32;
        while self.busy.is_high().map_err(PanelError::Busy)? {
            if waited_ms >= self.busy_timeout_ms {
                warn!("epd: busy for more than {} ms", self.busy_timeout_ms);
                return Err(PanelError::BusyTimeout);
            }
            self.delay.delay_ms(BUSY_POLL_MS);
            waited_ms = waited_ms.saturating_add(BUSY_POLL_MS);
        }
        Ok(())
    }

    fn write_ram(
        &mut self,
        ram_command: u8,
        window: RamWindow,
        data: &[u8],
    ) -> EpdResult<SPI::Error, BUSY::Error, DC::Error, RST::Error> {
        self.command_with(cmd::SET_RAM_X_WINDOW, &window.x_payload())?;
        self.command_with(cmd::SET_RAM_Y_WINDOW, &window.y_payload())?;
        self.command_with(cmd::SET_RAM_X_COUNTER, &[window.x_start])?;
        self.command_with(cmd::SET_RAM_Y_COUNTER, &window.y_counter_payload())?;
        self.command_with(ram_command, data)
    }

    fn activate(
        &mut self,
        sequence: u8,
    ) -> EpdResult<SPI::Error, BUSY::Error, DC::Error, RST::Error> {
        self.command_with(cmd::DISPLAY_UPDATE_CONTROL_2, &[sequence])?;
        self.command(cmd::MASTER_ACTIVATION)?;
        self.wait_idle()
    }

    fn check_len(
        &self,
        expected: usize,
        actual: usize,
    ) -> EpdResult<SPI::Error, BUSY::Error, DC::Error, RST::Error> {
        if expected != actual {
            return Err(PanelError::FrameLength { expected, actual });
        }
        Ok(())
    }
}

impl<SPI, BUSY, DC, RST, DELAY> PanelDriver for EpdPanel<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    type Error = PanelError<SPI::Error, BUSY::Error, DC::Error, RST::Error>;

    fn init_display(&mut self, rotation: Rotation, mirror: Mirror) -> Result<(), Self::Error> {
        self.hardware_reset()?;
        self.wait_idle()?;
        self.command(cmd::SW_RESET)?;
        self.wait_idle()?;

        self.command_with(
            cmd::DRIVER_OUTPUT_CONTROL,
            &epd_protocol::driver_output(self.height),
        )?;
        self.command_with(cmd::DATA_ENTRY_MODE, &[flag::DATA_ENTRY_INCRY_INCRX])?;
        self.command_with(cmd::BORDER_WAVEFORM_CONTROL, &[flag::BORDER_WAVEFORM_WHITE])?;
        self.command_with(cmd::TEMP_SENSOR_CONTROL, &[flag::INTERNAL_TEMP_SENSOR])?;
        self.wait_idle()?;

        info!(
            "epd: ready {}x{}, canvas rotation {} deg, mirror {:?}",
            self.width,
            self.height,
            rotation.degrees(),
            mirror
        );
        Ok(())
    }

    fn full_refresh(&mut self, front: &[u8], shadow: &[u8]) -> Result<(), Self::Error> {
        let frame_len = self.frame_len();
        self.check_len(frame_len, front.len())?;
        self.check_len(frame_len, shadow.len())?;

        let window = RamWindow::full(self.width, self.height);
        self.write_ram(cmd::WRITE_RAM_PREVIOUS, window, shadow)?;
        self.write_ram(cmd::WRITE_RAM_BW, window, front)?;
        self.activate(flag::UPDATE_FULL)?;

        // Base for the next differential update.
        self.write_ram(cmd::WRITE_RAM_PREVIOUS, window, front)?;
        debug!("epd: full refresh done");
        Ok(())
    }

    fn partial_refresh(&mut self, window: PartialWindow, data: &[u8]) -> Result<(), Self::Error> {
        let ram = RamWindow::from_partial(window, self.width, self.height)
            .ok_or(PanelError::Window(window))?;
        self.check_len(ram.byte_len(), data.len())?;

        self.write_ram(cmd::WRITE_RAM_BW, ram, data)?;
        self.activate(flag::UPDATE_PARTIAL)?;
        self.write_ram(cmd::WRITE_RAM_PREVIOUS, ram, data)?;

        debug!(
            "epd: partial refresh x={} y={} {}x{}",
            window.x, window.y, window.width, window.height
        );
        Ok(())
    }
}
