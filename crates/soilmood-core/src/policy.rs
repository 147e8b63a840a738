//! When to run a cycle and how to refresh the panel.

use bitcanvas::{Canvas, CanvasError};
use log::debug;

use crate::percent::Percent;

/// Refresh flavour for a deployment.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RefreshMode {
    /// Always redraw the whole frame.
    Full,
    /// Send only the dynamic region; fall back to full on the forced cadence.
    #[default]
    Partial,
}

/// Outcome of [`UpdatePolicy::decide`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RefreshDecision {
    Skip,
    Full,
    Partial,
}

impl RefreshDecision {
    pub const fn is_refresh(self) -> bool {
        !matches!(self, Self::Skip)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PolicyConfig {
    /// Minimum time between cycles.
    pub interval_ms: u32,
    pub mode: RefreshMode,
    /// Skip the refresh when the percent has not changed.
    pub change_detection: bool,
    /// Force a full refresh every this many cycles; zero disables.
    pub force_full_every: u16,
    /// Whether a due forced full refresh still happens when change detection
    /// would skip.
    pub forced_full_overrides_skip: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            interval_ms: 60_000,
            mode: RefreshMode::Partial,
            change_detection: true,
            force_full_every: 10,
            forced_full_overrides_skip: true,
        }
    }
}

impl PolicyConfig {
    pub const fn with_interval_ms(mut self, interval_ms: u32) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    pub const fn with_mode(mut self, mode: RefreshMode) -> Self {
        self.mode = mode;
        self
    }

    pub const fn with_change_detection(mut self, enabled: bool) -> Self {
        self.change_detection = enabled;
        self
    }

    pub const fn with_forced_full(mut self, every: u16, overrides_skip: bool) -> Self {
        self.force_full_every = every;
        self.forced_full_overrides_skip = overrides_skip;
        self
    }
}

/// Debounce, change detection and full-refresh cadence.
///
/// Also owns the shadow canvas: the frame last latched on the panel.
pub struct UpdatePolicy<B> {
    config: PolicyConfig,
    shadow: Canvas<B>,
    last_cycle_ms: Option<u32>,
    displayed: Option<Percent>,
    cycles_since_full: u16,
    force_full: bool,
}

impl<B> UpdatePolicy<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    pub fn new(config: PolicyConfig, shadow: Canvas<B>) -> Self {
        Self {
            config,
            shadow,
            last_cycle_ms: None,
            displayed: None,
            cycles_since_full: 0,
            force_full: true,
        }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn shadow(&self) -> &Canvas<B> {
        &self.shadow
    }

    /// Percent currently on the glass, if any refresh succeeded.
    pub fn displayed(&self) -> Option<Percent> {
        self.displayed
    }

    /// `true` before the first cycle and once `interval_ms` has elapsed since
    /// the previous one. Tick wraparound is handled.
    pub fn cycle_due(&self, now_ms: u32) -> bool {
        match self.last_cycle_ms {
            None => true,
            Some(last) => now_ms.wrapping_sub(last) >= self.config.interval_ms,
        }
    }

    /// Records the start of a cycle for the debounce.
    pub fn begin_cycle(&mut self, now_ms: u32) {
        self.last_cycle_ms = Some(now_ms);
    }

    fn forced_full_due(&self) -> bool {
        self.config.force_full_every != 0
            && self.cycles_since_full.saturating_add(1) >= self.config.force_full_every
    }

    /// Picks the refresh for a freshly classified `percent`.
    pub fn decide(&self, percent: Percent) -> RefreshDecision {
        if self.force_full {
            return RefreshDecision::Full;
        }

        let forced = self.forced_full_due();
        let unchanged = self.config.change_detection && self.displayed == Some(percent);

        if unchanged {
            return if forced && self.config.forced_full_overrides_skip {
                RefreshDecision::Full
            } else {
                RefreshDecision::Skip
            };
        }

        match self.config.mode {
            RefreshMode::Full => RefreshDecision::Full,
            RefreshMode::Partial if forced => RefreshDecision::Full,
            RefreshMode::Partial => RefreshDecision::Partial,
        }
    }

    /// Records a cycle that did not touch the panel.
    pub fn record_skip(&mut self) {
        self.cycles_since_full = self.cycles_since_full.saturating_add(1);
    }

    /// Records a successful refresh and copies `front` into the shadow.
    pub fn record_refresh<F>(
        &mut self,
        decision: RefreshDecision,
        percent: Percent,
        front: &Canvas<F>,
    ) -> Result<(), CanvasError>
    where
        F: AsRef<[u8]> + AsMut<[u8]>,
    {
        self.shadow.copy_from(front)?;
        self.displayed = Some(percent);
        self.force_full = false;
        self.cycles_since_full = match decision {
            RefreshDecision::Full => 0,
            _ => self.cycles_since_full.saturating_add(1),
        };

        debug!(
            "policy: {:?} refresh at {}%, {} cycles since full",
            decision,
            percent.value(),
            self.cycles_since_full
        );
        Ok(())
    }

    /// Records a failed refresh. The next refresh is full.
    pub fn record_failure(&mut self) {
        self.force_full = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcanvas::{Color, Mirror, Rotation};

    fn canvas() -> Canvas<[u8; 4]> {
        Canvas::new([0u8; 4], 16, 2, Rotation::Deg0, Mirror::None).unwrap()
    }

    fn policy(config: PolicyConfig) -> UpdatePolicy<[u8; 4]> {
        UpdatePolicy::new(config, canvas())
    }

    fn run(policy: &mut UpdatePolicy<[u8; 4]>, percent: u8) -> RefreshDecision {
        let percent = Percent::new(percent);
        let decision = policy.decide(percent);
        if decision.is_refresh() {
            policy.record_refresh(decision, percent, &canvas()).unwrap();
        } else {
            policy.record_skip();
        }
        decision
    }

    #[test]
    fn first_cycle_is_due_and_full() {
        let p = policy(PolicyConfig::default());
        assert!(p.cycle_due(0));
        assert!(p.cycle_due(u32::MAX));
        assert_eq!(p.decide(Percent::new(40)), RefreshDecision::Full);
    }

    #[test]
    fn debounce_allows_one_cycle_per_interval() {
        let mut p = policy(PolicyConfig::default().with_interval_ms(1_000));
        p.begin_cycle(5_000);

        assert!(!p.cycle_due(5_000));
        assert!(!p.cycle_due(5_999));
        assert!(p.cycle_due(6_000));
    }

    #[test]
    fn debounce_survives_tick_wraparound() {
        let mut p = policy(PolicyConfig::default().with_interval_ms(1_000));
        p.begin_cycle(u32::MAX - 200);

        assert!(!p.cycle_due(u32::MAX));
        assert!(!p.cycle_due(798));
        assert!(p.cycle_due(799));
    }

    #[test]
    fn partial_mode_forces_full_on_cadence() {
        let config = PolicyConfig::default()
            .with_change_detection(false)
            .with_forced_full(3, true);
        let mut p = policy(config);

        let decisions: std::vec::Vec<_> = (0..7).map(|i| run(&mut p, 10 + i)).collect();
        assert_eq!(
            decisions,
            [
                RefreshDecision::Full,
                RefreshDecision::Partial,
                RefreshDecision::Partial,
                RefreshDecision::Full,
                RefreshDecision::Partial,
                RefreshDecision::Partial,
                RefreshDecision::Full,
            ]
        );
    }

    #[test]
    fn unchanged_percent_skips_until_forced_full_is_due() {
        let config = PolicyConfig::default().with_forced_full(3, true);
        let mut p = policy(config);

        assert_eq!(run(&mut p, 50), RefreshDecision::Full);
        assert_eq!(run(&mut p, 50), RefreshDecision::Skip);
        assert_eq!(run(&mut p, 50), RefreshDecision::Skip);
        assert_eq!(run(&mut p, 50), RefreshDecision::Full);
        assert_eq!(run(&mut p, 51), RefreshDecision::Partial);
    }

    #[test]
    fn skip_can_win_over_forced_full() {
        let config = PolicyConfig::default().with_forced_full(2, false);
        let mut p = policy(config);

        assert_eq!(run(&mut p, 50), RefreshDecision::Full);
        for _ in 0..5 {
            assert_eq!(run(&mut p, 50), RefreshDecision::Skip);
        }
        // First change after the cadence lapsed goes out full.
        assert_eq!(run(&mut p, 60), RefreshDecision::Full);
    }

    #[test]
    fn full_mode_never_goes_partial() {
        let config = PolicyConfig::default()
            .with_mode(RefreshMode::Full)
            .with_forced_full(0, true);
        let mut p = policy(config);

        for i in 0..5 {
            assert_eq!(run(&mut p, i), RefreshDecision::Full);
        }
        assert_eq!(run(&mut p, 4), RefreshDecision::Skip);
    }

    #[test]
    fn failure_forces_next_refresh_full() {
        let config = PolicyConfig::default().with_forced_full(0, true);
        let mut p = policy(config);

        assert_eq!(run(&mut p, 20), RefreshDecision::Full);
        assert_eq!(run(&mut p, 21), RefreshDecision::Partial);

        assert_eq!(p.decide(Percent::new(22)), RefreshDecision::Partial);
        p.record_failure();
        assert_eq!(p.displayed(), Some(Percent::new(21)));
        assert_eq!(p.decide(Percent::new(21)), RefreshDecision::Full);
    }

    #[test]
    fn shadow_tracks_last_refreshed_front() {
        let mut p = policy(PolicyConfig::default());
        let mut front = canvas();
        front.set_pixel(3, 1, Color::Black);

        p.record_refresh(RefreshDecision::Full, Percent::new(5), &front)
            .unwrap();
        assert_eq!(p.shadow().bytes(), front.bytes());

        let mismatched = Canvas::new([0u8; 2], 8, 2, Rotation::Deg0, Mirror::None).unwrap();
        assert_eq!(
            p.record_refresh(RefreshDecision::Full, Percent::new(5), &mismatched),
            Err(CanvasError::GeometryMismatch)
        );
    }
}
