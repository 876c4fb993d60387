//! Pie-chart progress animator.
//!
//! A bounded counter driven toward `max` by periodic ticks. Each tick adds
//! `round(tick_interval / total_duration * max)`. On reaching `max` a run-once
//! animator resets to zero, stops scheduling and fires its completion
//! listener; a looping one wraps modulo `max` and keeps going.

use serde::{Deserialize, Serialize};
use tickview_core::config::{self, require_positive};
use tickview_core::{
    notify, Animated, Canvas, Color, ColorSpec, CompletionListener, ConfigError, Host,
    ManualScheduler, NullHost, Rect, Scheduler, TickKind,
};
use tracing::{debug, trace};

/// Construction options for [`PieProgress`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PieConfig {
    /// Time between ticks
    pub tick_interval_ms: u64,
    /// Time for one full cycle from 0 to `max`
    pub total_duration_ms: u64,
    /// Halt at `max` instead of wrapping
    pub run_once: bool,
    /// Start animating as soon as the animator is built
    pub auto_start: bool,
    /// Initial progress value
    pub start_value: u32,
    /// Upper bound of the progress range
    pub max: u32,
    /// Fill color
    pub color: ColorSpec,
    /// Orientation offset in degrees
    pub start_angle: f32,
}

impl Default for PieConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 40,
            total_duration_ms: 2000,
            run_once: true,
            auto_start: false,
            start_value: 0,
            max: 100,
            color: ColorSpec::Packed(0xFFFF_0000),
            start_angle: 0.0,
        }
    }
}

impl PieConfig {
    /// Parse from YAML and validate.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let parsed: Self = config::from_yaml_str(yaml)?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Reject values the tick arithmetic cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("tickIntervalMs", self.tick_interval_ms)?;
        require_positive("totalDurationMs", self.total_duration_ms)?;
        require_positive("max", u64::from(self.max))?;
        if !self.start_angle.is_finite() {
            return Err(ConfigError::invalid("startAngle", "must be finite"));
        }
        self.color.resolve().map(|_| ())
    }
}

/// Pie progress animator.
///
/// Owns its scheduler and host. Ticks posted to the scheduler come back
/// through [`Animated::handle_tick`].
pub struct PieProgress<S: Scheduler = ManualScheduler, H: Host = NullHost> {
    current: u32,
    max: u32,
    start_angle: f32,
    tick_interval_ms: u64,
    total_duration_ms: u64,
    run_once: bool,
    running: bool,
    color: Color,
    on_complete: CompletionListener<Self>,
    scheduler: S,
    host: H,
}

impl<S: Scheduler, H: Host> PieProgress<S, H> {
    /// Create an idle animator with default options.
    pub fn new(scheduler: S, host: H) -> Self {
        Self {
            current: 0,
            max: 100,
            start_angle: 0.0,
            tick_interval_ms: 40,
            total_duration_ms: 2000,
            run_once: true,
            running: false,
            color: Color::RED,
            on_complete: CompletionListener::none(),
            scheduler,
            host,
        }
    }

    /// Build from a validated config, starting immediately when
    /// `auto_start` is set.
    pub fn from_config(config: &PieConfig, scheduler: S, host: H) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut pie = Self::new(scheduler, host);
        pie.max = config.max;
        pie.current = config.start_value.min(config.max);
        pie.start_angle = normalize_degrees(config.start_angle);
        pie.tick_interval_ms = config.tick_interval_ms;
        pie.total_duration_ms = config.total_duration_ms;
        pie.run_once = config.run_once;
        pie.color = config.color.resolve()?;
        if config.auto_start {
            pie.start();
        }
        Ok(pie)
    }

    // -------------------------------------------------------------------------
    // Animation control
    // -------------------------------------------------------------------------

    /// Begin ticking. Ignored while already running.
    pub fn start(&mut self) {
        if self.running {
            trace!("start ignored, pie already running");
            return;
        }
        self.scheduler.cancel_all();
        self.scheduler.schedule(0, TickKind::Advance);
        self.running = true;
        debug!(current = self.current, max = self.max, run_once = self.run_once, "pie started");
    }

    /// Stop the animation.
    ///
    /// With `graceful` the current cycle runs to `max` and then stops as if
    /// run-once had been set. Otherwise ticking stops now, progress resets to
    /// zero and the completion listener fires before this returns.
    pub fn stop(&mut self, graceful: bool) {
        if !self.running {
            return;
        }
        if graceful {
            self.run_once = true;
            debug!("pie will stop at end of cycle");
            return;
        }
        self.scheduler.cancel_all();
        self.running = false;
        self.current = 0;
        debug!("pie stopped");
        notify(self, |pie| &mut pie.on_complete);
        self.host.request_redraw();
    }

    /// Cancel pending ticks without firing completion, for when the view is
    /// taken off screen.
    pub fn detach(&mut self) {
        self.scheduler.cancel_all();
        self.running = false;
    }

    fn advance(&mut self) {
        if !self.running {
            trace!("stale advance tick ignored");
            return;
        }
        let next = self.current.saturating_add(self.increment());
        if next >= self.max {
            if self.run_once {
                self.current = 0;
                self.scheduler.cancel(TickKind::Advance);
                self.running = false;
                debug!("pie cycle complete");
                notify(self, |pie| &mut pie.on_complete);
                self.host.request_redraw();
                return;
            }
            self.current = next.checked_rem(self.max).unwrap_or(0);
            trace!(current = self.current, "pie wrapped");
        } else {
            self.current = next;
            trace!(current = self.current, "pie advanced");
        }
        self.scheduler
            .schedule(self.tick_interval_ms, TickKind::Advance);
        self.host.request_redraw();
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Progress added per tick.
    #[must_use]
    pub fn increment(&self) -> u32 {
        let fraction = self.tick_interval_ms as f64 / self.total_duration_ms as f64;
        (fraction * f64::from(self.max)).round() as u32
    }

    /// Current progress value.
    #[must_use]
    pub const fn progress(&self) -> u32 {
        self.current
    }

    /// Set the progress directly. Not clamped.
    pub fn set_progress(&mut self, value: u32) {
        self.current = value;
        self.host.request_redraw();
    }

    /// Upper bound of the progress range.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Set the upper bound directly. Not validated.
    pub fn set_max(&mut self, value: u32) {
        self.max = value;
        self.host.request_redraw();
    }

    /// Whether a tick is scheduled.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the animation halts at `max`.
    #[must_use]
    pub const fn is_run_once(&self) -> bool {
        self.run_once
    }

    /// Choose between halting at `max` and looping.
    pub fn set_run_once(&mut self, run_once: bool) {
        self.run_once = run_once;
    }

    /// Time between ticks.
    #[must_use]
    pub const fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }

    /// Set the time between ticks (at least 1ms).
    pub fn set_tick_interval_ms(&mut self, ms: u64) {
        self.tick_interval_ms = ms.max(1);
    }

    /// Duration of one full cycle.
    #[must_use]
    pub const fn total_duration_ms(&self) -> u64 {
        self.total_duration_ms
    }

    /// Set the duration of one full cycle (at least 1ms).
    pub fn set_total_duration_ms(&mut self, ms: u64) {
        self.total_duration_ms = ms.max(1);
    }

    /// Fill color.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Set the fill color.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        self.host.request_redraw();
    }

    /// Orientation offset in degrees, in [0, 360).
    #[must_use]
    pub const fn start_angle(&self) -> f32 {
        self.start_angle
    }

    /// Set the orientation offset in degrees.
    pub fn set_start_angle(&mut self, degrees: f32) {
        self.start_angle = normalize_degrees(degrees);
        self.host.request_redraw();
    }

    /// Register the completion listener, replacing any previous one.
    pub fn on_complete(&mut self, callback: impl FnMut(&Self) + 'static) {
        self.on_complete.set(callback);
    }

    /// Remove the completion listener.
    pub fn clear_on_complete(&mut self) {
        self.on_complete.clear();
    }

    /// The host receiving render requests.
    pub const fn host(&self) -> &H {
        &self.host
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Filled portion of the pie in degrees.
    #[must_use]
    pub fn sweep_degrees(&self) -> f32 {
        if self.max == 0 {
            return 0.0;
        }
        (self.current as f32 / self.max as f32 * 360.0).min(360.0)
    }

    /// Paint the filled slice centered in `bounds`. Zero progress paints nothing.
    pub fn paint(&self, canvas: &mut dyn Canvas, bounds: Rect) {
        let sweep = self.sweep_degrees();
        if sweep <= 0.0 {
            return;
        }
        // 0 degrees points at 12 o'clock
        let start = (self.start_angle - 90.0).to_radians();
        canvas.fill_arc(
            bounds.center(),
            bounds.min_side() / 2.0,
            start,
            start + sweep.to_radians(),
            self.color,
        );
    }
}

impl<S: Scheduler, H: Host> Animated for PieProgress<S, H> {
    type Scheduler = S;

    fn handle_tick(&mut self, kind: TickKind) {
        match kind {
            TickKind::Advance => self.advance(),
            TickKind::Draw => self.host.request_redraw(),
        }
    }

    fn scheduler(&self) -> &S {
        &self.scheduler
    }

    fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

impl<S: Scheduler, H: Host> std::fmt::Debug for PieProgress<S, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PieProgress")
            .field("current", &self.current)
            .field("max", &self.max)
            .field("running", &self.running)
            .field("run_once", &self.run_once)
            .finish_non_exhaustive()
    }
}

fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use tickview_core::{drive, step, DrawCommand, RecordingCanvas, RecordingHost};

    type TestPie = PieProgress<ManualScheduler, RecordingHost>;

    fn pie() -> TestPie {
        PieProgress::new(ManualScheduler::new(), RecordingHost::new())
    }

    fn counting(pie: &mut TestPie) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let sink = Rc::clone(&count);
        pie.on_complete(move |_| sink.set(sink.get() + 1));
        count
    }

    // =========================================================================
    // Tick arithmetic
    // =========================================================================

    #[test]
    fn test_default_increment() {
        assert_eq!(pie().increment(), 2);
    }

    #[test]
    fn test_increment_rounds() {
        let mut p = pie();
        p.set_tick_interval_ms(50);
        p.set_total_duration_ms(3000);
        // 50 / 3000 * 100 = 1.67
        assert_eq!(p.increment(), 2);
        p.set_tick_interval_ms(40);
        // 1.33
        assert_eq!(p.increment(), 1);
    }

    #[test]
    fn test_run_once_completes_after_fifty_ticks() {
        let mut p = pie();
        let completions = counting(&mut p);
        p.start();

        assert_eq!(step(&mut p, 49), 49);
        assert_eq!(p.progress(), 98);
        assert!(p.is_running());
        assert_eq!(completions.get(), 0);

        // tick 50 reaches max and completes
        assert_eq!(step(&mut p, 1), 1);
        assert_eq!(p.progress(), 0);
        assert!(!p.is_running());
        assert_eq!(completions.get(), 1);
        assert!(p.scheduler().is_empty());

        // nothing more ever fires
        assert_eq!(step(&mut p, 10), 0);
        assert_eq!(completions.get(), 1);
    }

    #[test]
    fn test_each_tick_requests_redraw() {
        let mut p = pie();
        p.start();
        step(&mut p, 50);
        assert_eq!(p.host().redraws, 50);
    }

    #[test]
    fn test_ticks_are_paced_by_interval() {
        let mut p = pie();
        p.start();
        // ticks at 0, 40, 80
        assert_eq!(drive(&mut p, 100), 3);
        assert_eq!(p.progress(), 6);
        assert_eq!(p.scheduler().next_due_ms(), Some(120));
    }

    #[test]
    fn test_full_cycle_takes_total_duration() {
        let mut p = pie();
        p.start();
        drive(&mut p, 1959);
        assert!(p.is_running());
        drive(&mut p, 1);
        assert!(!p.is_running());
    }

    #[test]
    fn test_looping_wraps_modulo_max() {
        let mut p = pie();
        p.set_run_once(false);
        p.set_tick_interval_ms(60);
        let completions = counting(&mut p);
        p.start();

        let mut wraps = 0;
        let mut last = p.progress();
        for _ in 0..200 {
            step(&mut p, 1);
            if p.progress() < last {
                wraps += 1;
            }
            assert!(p.progress() < p.max());
            last = p.progress();
        }
        assert!(wraps >= 3, "only {wraps} wraps");
        assert!(p.is_running());
        assert!(p.scheduler().is_pending(TickKind::Advance));
        assert_eq!(completions.get(), 0);
    }

    #[test]
    fn test_looping_wrap_keeps_remainder() {
        let mut p = pie();
        p.set_run_once(false);
        p.set_tick_interval_ms(60); // +3 per tick
        p.set_progress(99);
        p.start();
        step(&mut p, 1);
        assert_eq!(p.progress(), 2);
    }

    #[test]
    fn test_increment_larger_than_max() {
        let mut p = pie();
        p.set_run_once(false);
        p.set_tick_interval_ms(5000);
        p.start();
        step(&mut p, 1);
        // 250 % 100
        assert_eq!(p.progress(), 50);
    }

    // =========================================================================
    // start / stop
    // =========================================================================

    #[test]
    fn test_start_while_running_is_noop() {
        let mut p = pie();
        p.start();
        step(&mut p, 5);
        p.start();
        assert_eq!(p.progress(), 10);
        assert_eq!(p.scheduler().len(), 1);
    }

    #[test]
    fn test_immediate_stop() {
        let mut p = pie();
        let completions = counting(&mut p);
        p.start();
        step(&mut p, 10);

        p.stop(false);
        assert!(!p.is_running());
        assert_eq!(p.progress(), 0);
        assert_eq!(completions.get(), 1);
        assert!(p.scheduler().is_empty());
        assert_eq!(step(&mut p, 5), 0);
        assert_eq!(completions.get(), 1);
    }

    #[test]
    fn test_completion_precedes_final_redraw() {
        let seen = Rc::new(Cell::new(usize::MAX));

        let mut p = pie();
        let sink = Rc::clone(&seen);
        p.on_complete(move |pie: &TestPie| sink.set(pie.host().redraws));
        p.start();
        step(&mut p, 50);
        assert_eq!(seen.get(), 49);
        assert_eq!(p.host().redraws, 50);

        let mut p = pie();
        let sink = Rc::clone(&seen);
        p.on_complete(move |pie: &TestPie| sink.set(pie.host().redraws));
        p.start();
        step(&mut p, 10);
        p.stop(false);
        assert_eq!(seen.get(), 10);
        assert_eq!(p.host().redraws, 11);
    }

    #[test]
    fn test_completion_sees_reset_state() {
        let mut p = pie();
        let seen = Rc::new(Cell::new((u32::MAX, true)));
        let sink = Rc::clone(&seen);
        p.on_complete(move |pie: &TestPie| sink.set((pie.progress(), pie.is_running())));
        p.start();
        step(&mut p, 3);
        p.stop(false);
        assert_eq!(seen.get(), (0, false));
    }

    #[test]
    fn test_stop_when_idle_does_nothing() {
        let mut p = pie();
        let completions = counting(&mut p);
        p.stop(false);
        p.stop(true);
        assert_eq!(completions.get(), 0);
        assert_eq!(p.host().redraws, 0);
    }

    #[test]
    fn test_graceful_stop_finishes_cycle() {
        let mut p = pie();
        p.set_run_once(false);
        let completions = counting(&mut p);
        p.start();
        step(&mut p, 20);

        p.stop(true);
        assert!(p.is_run_once());
        assert!(p.is_running());

        assert_eq!(step(&mut p, 100), 30);
        assert!(!p.is_running());
        assert_eq!(completions.get(), 1);
    }

    #[test]
    fn test_restart_after_stop_begins_at_zero() {
        let mut p = pie();
        p.start();
        step(&mut p, 10);
        p.stop(false);
        p.start();
        step(&mut p, 1);
        assert_eq!(p.progress(), 2);
    }

    #[test]
    fn test_detach_cancels_without_completion() {
        let mut p = pie();
        let completions = counting(&mut p);
        p.start();
        step(&mut p, 3);
        p.detach();
        assert!(!p.is_running());
        assert!(p.scheduler().is_empty());
        assert_eq!(completions.get(), 0);
        assert_eq!(p.progress(), 6);
    }

    #[test]
    fn test_cleared_listener_not_called() {
        let mut p = pie();
        let completions = counting(&mut p);
        p.clear_on_complete();
        p.start();
        step(&mut p, 50);
        assert_eq!(completions.get(), 0);
    }

    #[test]
    fn test_draw_tick_only_redraws() {
        let mut p = pie();
        p.handle_tick(TickKind::Draw);
        assert_eq!(p.progress(), 0);
        assert_eq!(p.host().redraws, 1);
    }

    #[test]
    fn test_stray_advance_while_idle_ignored() {
        let mut p = pie();
        p.handle_tick(TickKind::Advance);
        assert_eq!(p.progress(), 0);
        assert!(p.scheduler().is_empty());
    }

    // =========================================================================
    // Setters
    // =========================================================================

    #[test]
    fn test_setters_request_redraw_without_clamping() {
        let mut p = pie();
        p.set_max(10);
        p.set_progress(25);
        assert_eq!(p.progress(), 25);
        assert_eq!(p.host().redraws, 2);
    }

    #[test]
    fn test_zero_max_set_directly_completes_on_next_tick() {
        let mut p = pie();
        p.start();
        p.set_max(0);
        step(&mut p, 1);
        assert_eq!(p.progress(), 0);
        assert!(!p.is_running());
    }

    #[test]
    fn test_zero_max_looping_does_not_divide_by_zero() {
        let mut p = pie();
        p.set_run_once(false);
        p.start();
        p.set_max(0);
        step(&mut p, 3);
        assert_eq!(p.progress(), 0);
    }

    #[test]
    fn test_pacing_setters_floor_at_one() {
        let mut p = pie();
        p.set_tick_interval_ms(0);
        p.set_total_duration_ms(0);
        assert_eq!(p.tick_interval_ms(), 1);
        assert_eq!(p.total_duration_ms(), 1);
    }

    #[test]
    fn test_start_angle_normalized() {
        let mut p = pie();
        p.set_start_angle(450.0);
        assert_eq!(p.start_angle(), 90.0);
        p.set_start_angle(-90.0);
        assert_eq!(p.start_angle(), 270.0);
    }

    // =========================================================================
    // Config
    // =========================================================================

    #[test]
    fn test_config_defaults() {
        let c = PieConfig::default();
        assert_eq!(c.tick_interval_ms, 40);
        assert_eq!(c.total_duration_ms, 2000);
        assert!(c.run_once);
        assert_eq!(c.max, 100);
        assert_eq!(c.start_angle, 0.0);
    }

    #[test]
    fn test_config_from_yaml_partial() {
        let c = PieConfig::from_yaml_str("max: 40\nrunOnce: false\ncolor: \"#00ff00\"\n").unwrap();
        assert_eq!(c.max, 40);
        assert!(!c.run_once);
        assert_eq!(c.tick_interval_ms, 40);
    }

    #[test]
    fn test_config_rejects_zero_max() {
        let err = PieConfig::from_yaml_str("max: 0").unwrap_err();
        assert!(err.to_string().contains("'max'"));
    }

    #[test]
    fn test_config_rejects_zero_duration() {
        let c = PieConfig {
            total_duration_ms: 0,
            ..PieConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_from_config_applies_options() {
        let c = PieConfig {
            start_value: 250,
            max: 200,
            start_angle: 370.0,
            color: ColorSpec::Hex("#0000ff".into()),
            ..PieConfig::default()
        };
        let p = PieProgress::from_config(&c, ManualScheduler::new(), RecordingHost::new()).unwrap();
        assert_eq!(p.progress(), 200);
        assert_eq!(p.start_angle(), 10.0);
        assert_eq!(p.color().to_argb(), 0xFF00_00FF);
        assert!(!p.is_running());
    }

    #[test]
    fn test_from_config_auto_start() {
        let c = PieConfig {
            auto_start: true,
            ..PieConfig::default()
        };
        let p = PieProgress::from_config(&c, ManualScheduler::new(), NullHost).unwrap();
        assert!(p.is_running());
        assert!(p.scheduler().is_pending(TickKind::Advance));
    }

    // =========================================================================
    // Painting
    // =========================================================================

    #[test]
    fn test_paint_nothing_at_zero() {
        let p = pie();
        let mut canvas = RecordingCanvas::new();
        p.paint(&mut canvas, Rect::new(0.0, 0.0, 100.0, 100.0));
        assert!(canvas.is_empty());
    }

    #[test]
    fn test_paint_quarter_from_twelve_oclock() {
        let mut p = pie();
        p.set_progress(25);
        let mut canvas = RecordingCanvas::new();
        p.paint(&mut canvas, Rect::new(0.0, 0.0, 100.0, 60.0));

        match canvas.commands() {
            [DrawCommand::Arc {
                center,
                radius,
                start_angle,
                end_angle,
                color,
            }] => {
                assert_eq!((center.x, center.y), (50.0, 30.0));
                assert_eq!(*radius, 30.0);
                assert!((start_angle + std::f32::consts::FRAC_PI_2).abs() < 1e-5);
                assert!(end_angle.abs() < 1e-5);
                assert_eq!(*color, Color::RED);
            }
            other => panic!("unexpected commands {other:?}"),
        }
    }

    #[test]
    fn test_sweep_capped_at_full_circle() {
        let mut p = pie();
        p.set_progress(150);
        assert_eq!(p.sweep_degrees(), 360.0);
        p.set_max(0);
        assert_eq!(p.sweep_degrees(), 0.0);
    }

    // =========================================================================
    // Properties
    // =========================================================================

    proptest! {
        #[test]
        fn prop_one_tick_stays_in_range(
            max in 1u32..1000,
            fraction in 0.0f64..=1.0,
            interval in 1u64..500,
            duration in 1u64..10_000,
            run_once in any::<bool>(),
        ) {
            let mut p = pie();
            p.set_max(max);
            p.set_progress((f64::from(max) * fraction) as u32);
            p.set_tick_interval_ms(interval);
            p.set_total_duration_ms(duration);
            p.set_run_once(run_once);
            p.start();
            step(&mut p, 1);
            prop_assert!(p.progress() <= p.max());
            if !p.is_running() {
                prop_assert_eq!(p.progress(), 0);
            }
        }
    }
}
