//! One sample-to-glass cycle per activation.

use bitcanvas::{Canvas, CanvasError, GlyphSource, RegionExtractor};
use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::{
    config::{ConfigError, MonitorConfig},
    mood::Mood,
    panel::{PanelDriver, PartialWindow},
    percent::{Calibration, Percent, RawReading},
    policy::{RefreshDecision, UpdatePolicy},
    sampler::{MoistureSampler, MoistureSensor},
    scene::SceneRenderer,
};

/// Step of the cycle state machine.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Phase {
    #[default]
    Idle,
    Sample,
    Classify,
    Render,
    Refresh,
}

/// What one cycle measured.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Reading {
    pub raw: RawReading,
    pub percent: Percent,
    pub mood: Mood,
    /// Raw code sat on a rail; the probe may be disconnected or shorted.
    pub suspect: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CycleReport {
    /// Debounce interval has not elapsed.
    Idle,
    /// Reading matched what is on the glass.
    Skipped(Reading),
    Refreshed {
        reading: Reading,
        decision: RefreshDecision,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MonitorError<SensorErr, PanelErr> {
    /// [`MoistureMonitor::start`] has not run.
    NotStarted,
    Sensor(SensorErr),
    Panel(PanelErr),
    Canvas(CanvasError),
}

/// Buffers and collaborators the monitor takes ownership of.
pub struct MonitorParts<S, D, P, G, B, R> {
    pub sensor: S,
    pub delay: D,
    pub panel: P,
    /// Canvas the scene is drawn into.
    pub front: Canvas<B>,
    /// Canvas mirroring what the panel shows.
    pub shadow: Canvas<B>,
    /// Holds the dynamic region bytes for partial refreshes.
    pub region_buffer: R,
    pub small_font: G,
    pub large_font: G,
}

/// Sampler, classifier, renderer, policy and panel wired together.
pub struct MoistureMonitor<S, D, P, G, B, R> {
    sampler: MoistureSampler<S, D>,
    calibration: Calibration,
    renderer: SceneRenderer<G, B>,
    policy: UpdatePolicy<B>,
    extractor: RegionExtractor<R>,
    panel: P,
    config: MonitorConfig,
    last_phase: Phase,
    started: bool,
}

impl<S, D, P, G, B, R> MoistureMonitor<S, D, P, G, B, R>
where
    S: MoistureSensor,
    D: DelayNs,
    P: PanelDriver,
    G: GlyphSource,
    B: AsRef<[u8]> + AsMut<[u8]>,
    R: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Validates `config` and the buffers in `parts`.
    pub fn new(
        config: MonitorConfig,
        parts: MonitorParts<S, D, P, G, B, R>,
    ) -> Result<Self, ConfigError> {
        let MonitorParts {
            sensor,
            delay,
            panel,
            front,
            shadow,
            region_buffer,
            small_font,
            large_font,
        } = parts;

        if front.width() != shadow.width() || front.height() != shadow.height() {
            return Err(ConfigError::Canvas(CanvasError::GeometryMismatch));
        }
        if front.rotation() != config.rotation || front.mirror() != config.mirror {
            return Err(ConfigError::Canvas(CanvasError::GeometryMismatch));
        }
        config.validate(front.width(), front.height())?;

        let calibration = config.calibration()?;
        if calibration.is_inverted() {
            warn!(
                "monitor: wet calibration {} reads above dry {}",
                calibration.wet_raw(),
                calibration.dry_raw()
            );
        }

        let sampler = MoistureSampler::new(sensor, delay, config.sampler)?;
        let renderer = SceneRenderer::new(front, config.layout, small_font, large_font)?;
        let extractor = RegionExtractor::new(renderer.canvas(), renderer.region(), region_buffer)?;
        let policy = UpdatePolicy::new(config.policy, shadow);

        Ok(Self {
            sampler,
            calibration,
            renderer,
            policy,
            extractor,
            panel,
            config,
            last_phase: Phase::Idle,
            started: false,
        })
    }

    /// Furthest phase the most recent due cycle reached: `Refresh` after a
    /// refresh, `Classify` after a skip, or the phase that failed. `Idle`
    /// before the first cycle.
    pub fn last_phase(&self) -> Phase {
        self.last_phase
    }

    pub fn renderer(&self) -> &SceneRenderer<G, B> {
        &self.renderer
    }

    pub fn policy(&self) -> &UpdatePolicy<B> {
        &self.policy
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn sampler(&self) -> &MoistureSampler<S, D> {
        &self.sampler
    }

    /// Initializes panel and sensor and draws the static layer.
    ///
    /// The first [`tick`](Self::tick) afterwards always runs and refreshes
    /// the full frame.
    pub fn start(&mut self) -> Result<(), MonitorError<S::Error, P::Error>> {
        self.panel
            .init_display(self.config.rotation, self.config.mirror)
            .map_err(MonitorError::Panel)?;
        self.sampler.configure().map_err(MonitorError::Sensor)?;
        self.renderer.render_static();
        self.started = true;

        info!(
            "monitor: started, interval {} ms, {} bands, sampling budget {} ms",
            self.config.policy.interval_ms,
            self.config.bands.len(),
            self.sampler.config().worst_case_ms()
        );
        Ok(())
    }

    /// Runs a cycle if one is due.
    ///
    /// Sensor and panel errors end the cycle early and are returned. The
    /// monitor stays usable: a failed refresh makes the next one full.
    pub fn tick(&mut self, now_ms: u32) -> Result<CycleReport, MonitorError<S::Error, P::Error>> {
        if !self.started {
            return Err(MonitorError::NotStarted);
        }
        if !self.policy.cycle_due(now_ms) {
            return Ok(CycleReport::Idle);
        }
        self.policy.begin_cycle(now_ms);

        self.last_phase = Phase::Sample;
        let raw = self.sampler.sample().map_err(MonitorError::Sensor)?;
        let suspect = raw.value() == 0 || raw.value() >= self.sampler.config().max_raw();
        if suspect {
            warn!(
                "monitor: raw {} is at the ADC rail, probe may be disconnected or shorted",
                raw.value()
            );
        }

        self.last_phase = Phase::Classify;
        let percent = self.calibration.to_percent(raw);
        let band = *self.config.bands.classify(percent);
        let reading = Reading {
            raw,
            percent,
            mood: band.mood,
            suspect,
        };
        debug!(
            "monitor: raw={} percent={} mood={}",
            raw.value(),
            percent.value(),
            band.label
        );

        let decision = self.policy.decide(percent);
        if decision == RefreshDecision::Skip {
            self.policy.record_skip();
            return Ok(CycleReport::Skipped(reading));
        }

        self.last_phase = Phase::Render;
        self.renderer.render_dynamic(percent, &band);

        self.last_phase = Phase::Refresh;
        let result = match decision {
            RefreshDecision::Partial => {
                let window = PartialWindow::from(self.extractor.region());
                let data = self.extractor.extract(self.renderer.canvas());
                self.panel.partial_refresh(window, data)
            }
            _ => self.panel.full_refresh(
                self.renderer.canvas().bytes(),
                self.policy.shadow().bytes(),
            ),
        };

        if let Err(err) = result {
            warn!(
                "monitor: {:?} refresh failed, next refresh will be full",
                decision
            );
            self.policy.record_failure();
            return Err(MonitorError::Panel(err));
        }

        self.policy
            .record_refresh(decision, percent, self.renderer.canvas())
            .map_err(MonitorError::Canvas)?;

        Ok(CycleReport::Refreshed { reading, decision })
    }
}
