//! Per-target animation state machine.
//!
//! `Hidden -> Entering -> Visible -> Exiting -> Hidden`. Entering and Exiting are driven
//! by an [`AnimationRun`] whose progress is a pure function of the frame clock, so a late
//! or skipped frame only shifts when the change becomes visible, never stalls it.

use serde::{Deserialize, Serialize};

use crate::interp::functions::interpolate;
use crate::interp::Easing;
use crate::style::StyleSnapshot;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimState {
    #[default]
    Hidden,
    Entering,
    Visible,
    Exiting,
}

impl AnimState {
    /// Hidden and Visible hold until the next fire; the others are time-driven.
    pub fn is_stable(&self) -> bool {
        matches!(self, AnimState::Hidden | AnimState::Visible)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Toward visible (progress increasing).
    Forward,
    /// Toward hidden (progress decreasing).
    Backward,
}

/// In-flight interpolation.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationRun {
    /// Progress at `start`.
    pub origin: f32,
    pub direction: Direction,
    /// Clock time progress starts moving. Later than the fire time while delayed.
    pub start: f32,
    /// Seconds for a full 0..1 sweep.
    pub duration: f32,
}

impl AnimationRun {
    pub fn progress(&self, now: f32) -> f32 {
        if now < self.start {
            return self.origin;
        }
        let end = match self.direction {
            Direction::Forward => 1.0,
            Direction::Backward => 0.0,
        };
        if self.duration <= 0.0 {
            return end;
        }
        let delta = (now - self.start) / self.duration;
        match self.direction {
            Direction::Forward => (self.origin + delta).min(1.0),
            Direction::Backward => (self.origin - delta).max(0.0),
        }
    }

    pub fn is_delayed(&self, now: f32) -> bool {
        now < self.start
    }
}

#[derive(Clone, Debug, Default)]
pub struct Machine {
    state: AnimState,
    run: Option<AnimationRun>,
}

impl Machine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AnimState {
        self.state
    }

    pub fn run(&self) -> Option<&AnimationRun> {
        self.run.as_ref()
    }

    /// Current progress: 0 = hidden snapshot, 1 = visible snapshot.
    pub fn progress(&self, now: f32) -> f32 {
        match (&self.run, self.state) {
            (Some(run), _) => run.progress(now),
            (None, AnimState::Visible) => 1.0,
            (None, _) => 0.0,
        }
    }

    /// Start (or resume) entering. From Hidden the run waits out `delay`; from Exiting
    /// it reverses in place from the current progress with no delay.
    pub fn fire_enter(&mut self, now: f32, delay: f32, duration: f32) {
        match self.state {
            AnimState::Hidden => {
                self.run = Some(AnimationRun {
                    origin: 0.0,
                    direction: Direction::Forward,
                    start: now + delay.max(0.0),
                    duration,
                });
                self.state = AnimState::Entering;
            }
            AnimState::Exiting => {
                let origin = self.progress(now);
                self.run = Some(AnimationRun {
                    origin,
                    direction: Direction::Forward,
                    start: now,
                    duration,
                });
                self.state = AnimState::Entering;
            }
            AnimState::Entering | AnimState::Visible => {}
        }
    }

    /// Start (or reverse into) exiting from the current progress.
    pub fn fire_exit(&mut self, now: f32, duration: f32) {
        match self.state {
            AnimState::Visible | AnimState::Entering => {
                let origin = self.progress(now);
                self.run = Some(AnimationRun {
                    origin,
                    direction: Direction::Backward,
                    start: now,
                    duration,
                });
                self.state = AnimState::Exiting;
            }
            AnimState::Hidden | AnimState::Exiting => {}
        }
    }

    /// Settle a finished run. Returns the stable state reached this call, if any.
    pub fn advance(&mut self, now: f32) -> Option<AnimState> {
        let run = self.run?;
        let p = run.progress(now);
        let settled = match (self.state, run.direction) {
            (AnimState::Entering, Direction::Forward) if p >= 1.0 => AnimState::Visible,
            (AnimState::Exiting, Direction::Backward) if p <= 0.0 => AnimState::Hidden,
            _ => return None,
        };
        self.state = settled;
        self.run = None;
        Some(settled)
    }

    /// Style at `now` for the given snapshots and curve.
    pub fn sample(
        &self,
        hidden: &StyleSnapshot,
        visible: &StyleSnapshot,
        ease: &Easing,
        now: f32,
    ) -> StyleSnapshot {
        interpolate(hidden, visible, ease.apply(self.progress(now)))
    }

    /// Jump straight to Visible, discarding any run (fallback path).
    pub fn snap_visible(&mut self) {
        self.state = AnimState::Visible;
        self.run = None;
    }

    /// Back to Hidden with no run, ready for the next enter.
    pub fn reset(&mut self) {
        self.state = AnimState::Hidden;
        self.run = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) {
        assert!((a - b).abs() <= 1e-5, "left={a} right={b}");
    }

    #[test]
    fn enter_runs_to_visible_over_duration() {
        let mut m = Machine::new();
        m.fire_enter(0.0, 0.0, 2.0);
        assert_eq!(m.state(), AnimState::Entering);
        approx(m.progress(1.0), 0.5);
        assert_eq!(m.advance(1.0), None);
        assert_eq!(m.advance(2.0), Some(AnimState::Visible));
        assert!(m.run().is_none());
        assert_eq!(m.progress(100.0), 1.0);
    }

    #[test]
    fn delay_pins_progress_at_zero_while_entering() {
        let mut m = Machine::new();
        m.fire_enter(0.0, 0.5, 1.0);
        assert_eq!(m.state(), AnimState::Entering);
        assert_eq!(m.progress(0.4), 0.0);
        assert!(m.run().is_some_and(|r| r.is_delayed(0.4)));
        approx(m.progress(1.0), 0.5);
    }

    #[test]
    fn exit_midway_then_reenter_is_continuous() {
        let mut m = Machine::new();
        m.fire_enter(0.0, 0.0, 1.0);
        m.fire_exit(0.6, 1.0);
        approx(m.progress(0.6), 0.6);
        approx(m.progress(0.8), 0.4);
        m.fire_enter(0.8, 0.3, 1.0);
        assert_eq!(m.state(), AnimState::Entering);
        // Reversal ignores the delay and resumes from 0.4.
        approx(m.progress(0.8), 0.4);
        approx(m.progress(0.9), 0.5);
        assert_eq!(m.advance(1.5), Some(AnimState::Visible));
    }

    #[test]
    fn exit_during_delay_settles_hidden_immediately() {
        let mut m = Machine::new();
        m.fire_enter(0.0, 5.0, 1.0);
        m.fire_exit(1.0, 1.0);
        assert_eq!(m.advance(1.0), Some(AnimState::Hidden));
    }

    #[test]
    fn zero_duration_settles_on_the_fire_tick() {
        let mut m = Machine::new();
        m.fire_enter(3.0, 0.0, 0.0);
        assert_eq!(m.advance(3.0), Some(AnimState::Visible));
    }

    #[test]
    fn sample_hits_snapshots_exactly_at_the_ends() {
        let hidden = StyleSnapshot::new().with("opacity", 0.0).with("y", 50.0);
        let visible = StyleSnapshot::new().with("opacity", 1.0).with("y", 0.0);
        let ease = Easing::CubicBezier(crate::interp::EASE_IN_OUT);
        let mut m = Machine::new();
        assert_eq!(m.sample(&hidden, &visible, &ease, 0.0), hidden);
        m.fire_enter(0.0, 0.0, 1.2);
        assert_eq!(m.sample(&hidden, &visible, &ease, 0.0), hidden);
        assert_eq!(m.sample(&hidden, &visible, &ease, 1.2), visible);
    }
}
