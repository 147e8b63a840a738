#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use bitcanvas::{Canvas, Mirror, Rotation, buffer_len_for};
use embassy_executor::Spawner;
use embassy_time::Timer;
use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::{
    clock::CpuClock,
    delay::Delay,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    spi::master::Spi,
    time::{Instant, Rate},
    timer::timg::TimerGroup,
};
use log::{LevelFilter, error, info, warn};
use soilmood_core::{
    Attenuation, BandTable, CycleReport, MoistureMonitor, MonitorConfig, MonitorParts,
    PolicyConfig, RefreshMode, SamplerConfig, SceneLayout,
};
use soilmood_hal_esp32s3::{
    platform::display::EpdPanel, render::Font5x7, sensor::adc::AdcProbe,
};
use static_cell::StaticCell;

const PANEL_WIDTH: u16 = 128;
const PANEL_HEIGHT: u16 = 296;
const FRAME_BYTES: usize = buffer_len_for(PANEL_WIDTH, PANEL_HEIGHT);
const DISPLAY_SPI_HZ: u32 = 4_000_000;

const ROTATION: Rotation = Rotation::Deg90;
const MIRROR: Mirror = Mirror::None;

// Dynamic region in panel memory coordinates.
const REGION_X: u16 = 8;
const REGION_Y: u16 = 8;
const REGION_WIDTH: u16 = 96;
const REGION_HEIGHT: u16 = 280;
const REGION_BYTES: usize = (REGION_WIDTH as usize / 8) * REGION_HEIGHT as usize;

const _: () = assert!(REGION_X % 8 == 0 && REGION_WIDTH % 8 == 0);
const _: () = assert!(REGION_X + REGION_WIDTH <= PANEL_WIDTH);
const _: () = assert!(REGION_Y + REGION_HEIGHT <= PANEL_HEIGHT);

// Probe calibration: raw code in dry air and in water.
const DRY_RAW: u16 = 3200;
const WET_RAW: u16 = 1400;
const _: () = assert!(DRY_RAW != WET_RAW);

const FIVE_BAND_MOODS: bool = false;
const REFRESH_MODE: RefreshMode = RefreshMode::Partial;
const UPDATE_INTERVAL_MS: u32 = 60_000;
const FORCE_FULL_EVERY: u16 = 10;
const PROBE_SETTLE_MS: u32 = 20;
const TICK_MS: u64 = 1_000;
const START_RETRY_MS: u64 = 5_000;

const _: () = assert!(UPDATE_INTERVAL_MS as u64 >= TICK_MS);

const SMALL_FONT: Font5x7 = Font5x7::new(1);
const LARGE_FONT: Font5x7 = Font5x7::new(4);

static FRONT: StaticCell<[u8; FRAME_BYTES]> = StaticCell::new();
static SHADOW: StaticCell<[u8; FRAME_BYTES]> = StaticCell::new();
static REGION: StaticCell<[u8; REGION_BYTES]> = StaticCell::new();

fn monitor_config() -> MonitorConfig {
    let bands = if FIVE_BAND_MOODS {
        BandTable::five_band()
    } else {
        BandTable::three_band()
    };

    MonitorConfig::default()
        .with_calibration(DRY_RAW, WET_RAW)
        .with_sampler(SamplerConfig::default().with_power(true, PROBE_SETTLE_MS))
        .with_policy(
            PolicyConfig::default()
                .with_interval_ms(UPDATE_INTERVAL_MS)
                .with_mode(REFRESH_MODE)
                .with_forced_full(FORCE_FULL_EVERY, true),
        )
        .with_layout(SceneLayout::default().with_dynamic_region(
            REGION_X,
            REGION_Y,
            REGION_WIDTH,
            REGION_HEIGHT,
        ))
        .with_bands(bands)
        .with_orientation(ROTATION, MIRROR)
}

async fn halt() -> ! {
    loop {
        Timer::after_secs(60).await;
    }
}

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);
    esp_println::println!("boot: soilmood starting");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Panel wiring: SCK=GPIO12, MOSI=GPIO11, CS=GPIO10, DC=GPIO9, RST=GPIO8, BUSY=GPIO7
    let cs = Output::new(peripherals.GPIO10, Level::High, OutputConfig::default());
    let dc = Output::new(peripherals.GPIO9, Level::Low, OutputConfig::default());
    let rst = Output::new(peripherals.GPIO8, Level::High, OutputConfig::default());
    let busy = Input::new(
        peripherals.GPIO7,
        InputConfig::default().with_pull(Pull::None),
    );

    let spi_config = esp_hal::spi::master::Config::default()
        .with_frequency(Rate::from_hz(DISPLAY_SPI_HZ))
        .with_mode(esp_hal::spi::Mode::_0);
    let spi = Spi::new(peripherals.SPI2, spi_config)
        .unwrap()
        .with_sck(peripherals.GPIO12)
        .with_mosi(peripherals.GPIO11);
    let spi = ExclusiveDevice::new_no_delay(spi, cs).unwrap();

    let panel = EpdPanel::new(spi, busy, dc, rst, Delay::new(), PANEL_WIDTH, PANEL_HEIGHT);

    // Probe wiring: signal=GPIO1 (ADC1 channel 0), supply=GPIO4
    let probe_power = Output::new(peripherals.GPIO4, Level::Low, OutputConfig::default());
    let probe = AdcProbe::new(
        peripherals.ADC1,
        peripherals.GPIO1,
        Attenuation::Db11,
        Some(probe_power),
    );

    let canvases = Canvas::new(
        FRONT.init([0xFF; FRAME_BYTES]),
        PANEL_WIDTH,
        PANEL_HEIGHT,
        ROTATION,
        MIRROR,
    )
    .and_then(|front| {
        Canvas::new(
            SHADOW.init([0xFF; FRAME_BYTES]),
            PANEL_WIDTH,
            PANEL_HEIGHT,
            ROTATION,
            MIRROR,
        )
        .map(|shadow| (front, shadow))
    });
    let (front, shadow) = match canvases {
        Ok(canvases) => canvases,
        Err(err) => {
            error!("boot: canvas setup failed: {}", err);
            halt().await
        }
    };

    let parts = MonitorParts {
        sensor: probe,
        delay: Delay::new(),
        panel,
        front,
        shadow,
        region_buffer: REGION.init([0; REGION_BYTES]),
        small_font: SMALL_FONT,
        large_font: LARGE_FONT,
    };

    let mut monitor = match MoistureMonitor::new(monitor_config(), parts) {
        Ok(monitor) => monitor,
        Err(err) => {
            error!("boot: invalid configuration: {}", err);
            halt().await
        }
    };

    while let Err(err) = monitor.start() {
        warn!("boot: start failed: {:?}, retrying", err);
        Timer::after_millis(START_RETRY_MS).await;
    }

    let boot = Instant::now();
    loop {
        // Truncation wraps; the policy compares ticks with wrapping_sub.
        let now_ms = boot.elapsed().as_millis() as u32;

        match monitor.tick(now_ms) {
            Ok(CycleReport::Idle) => {}
            Ok(CycleReport::Skipped(reading)) => {
                info!(
                    "cycle: {}% unchanged, refresh skipped",
                    reading.percent.value()
                );
            }
            Ok(CycleReport::Refreshed { reading, decision }) => {
                info!(
                    "cycle: raw={} percent={} mood={:?} refresh={:?}{}",
                    reading.raw.value(),
                    reading.percent.value(),
                    reading.mood,
                    decision,
                    if reading.suspect { " (suspect)" } else { "" }
                );
            }
            Err(err) => {
                warn!("cycle: failed during {:?}: {:?}", monitor.last_phase(), err);
            }
        }

        Timer::after_millis(TICK_MS).await;
    }
}

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();
