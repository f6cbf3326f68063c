//! Spring parameters converted to a time-based easing.
//!
//! The spring is modelled as a unit-step damped harmonic oscillator
//! `x'' + 2ζω₀x' + ω₀²x = ω₀²` starting at rest at 0. Its response is sampled over the
//! time it takes to settle within 1% of the target, so progress 0..1 maps onto that
//! window and the window length doubles as the spring's natural duration.

use serde::{Deserialize, Serialize};

/// Settling band (1% of travel).
const SETTLE_THRESHOLD: f64 = 0.01;

/// ω₀·t at which a critically damped spring is within 1%: solves (1 + u)e^(-u) = 0.01.
const CRITICALLY_DAMPED_SETTLE_FACTOR: f64 = 6.638;

/// Upper bound for barely damped springs that would otherwise ring for minutes.
const MAX_SETTLE_SECS: f64 = 10.0;

/// Physical spring parameters as authored in motion configs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringParams {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            stiffness: 100.0,
            damping: 10.0,
            mass: 1.0,
        }
    }
}

impl SpringParams {
    pub fn new(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let finite = self.stiffness.is_finite() && self.damping.is_finite() && self.mass.is_finite();
        if !finite || self.stiffness <= 0.0 || self.mass <= 0.0 || self.damping < 0.0 {
            return Err(format!(
                "spring requires stiffness > 0, mass > 0, damping >= 0 (got {self:?})"
            ));
        }
        Ok(())
    }

    /// Natural frequency ω₀ = √(k/m).
    fn omega_0(&self) -> f64 {
        (self.stiffness as f64 / self.mass as f64).sqrt()
    }

    /// Damping ratio ζ = c / (2√(km)).
    fn zeta(&self) -> f64 {
        self.damping as f64 / (2.0 * (self.stiffness as f64 * self.mass as f64).sqrt())
    }

    /// Seconds until the response stays within the settling band.
    pub fn settle_duration(&self) -> f32 {
        let omega_0 = self.omega_0();
        let zeta = self.zeta();
        let secs = if zeta <= 0.0 {
            MAX_SETTLE_SECS
        } else if zeta < 1.0 {
            // Envelope e^(-ζω₀t) bounds the oscillation.
            (1.0 / SETTLE_THRESHOLD).ln() / (zeta * omega_0)
        } else if (zeta - 1.0).abs() < 1e-3 {
            CRITICALLY_DAMPED_SETTLE_FACTOR / omega_0
        } else {
            // Dominated by the slow pole.
            let slow = omega_0 * (zeta - (zeta * zeta - 1.0).sqrt());
            (1.0 / SETTLE_THRESHOLD).ln() / slow
        };
        secs.min(MAX_SETTLE_SECS) as f32
    }

    /// Eased position at normalized progress `t` over the settling window.
    /// May overshoot 1.0 for underdamped springs; pinned to exactly 0 and 1 at the ends.
    pub fn ease(&self, t: f32) -> f32 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        let time = t as f64 * self.settle_duration() as f64;
        self.position(time) as f32
    }

    fn position(&self, t: f64) -> f64 {
        let omega_0 = self.omega_0();
        let zeta = self.zeta();
        if zeta < 1.0 {
            let complement = (1.0 - zeta * zeta).sqrt();
            let omega_d = omega_0 * complement;
            let decay = (-zeta * omega_0 * t).exp();
            1.0 - decay * ((omega_d * t).cos() + (zeta / complement) * (omega_d * t).sin())
        } else if (zeta - 1.0).abs() < 1e-3 {
            1.0 - (-omega_0 * t).exp() * (1.0 + omega_0 * t)
        } else {
            let root = (zeta * zeta - 1.0).sqrt();
            let s1 = omega_0 * (zeta - root);
            let s2 = omega_0 * (zeta + root);
            1.0 - (s2 * (-s1 * t).exp() - s1 * (-s2 * t).exp()) / (s2 - s1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_exact() {
        for p in [
            SpringParams::new(150.0, 10.0, 1.0),
            SpringParams::new(100.0, 20.0, 1.0),
            SpringParams::new(100.0, 60.0, 1.0),
        ] {
            assert_eq!(p.ease(0.0), 0.0);
            assert_eq!(p.ease(1.0), 1.0);
        }
    }

    #[test]
    fn underdamped_spring_overshoots_then_settles() {
        // stiffness 150 / damping 10 is the bouncy reveal used on the service cards.
        let p = SpringParams::new(150.0, 10.0, 1.0);
        let peak = (1..100)
            .map(|i| p.ease(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0, "peak={peak}");
        assert!((p.ease(0.99) - 1.0).abs() < 0.02);
    }

    #[test]
    fn critically_damped_spring_is_monotonic() {
        // ζ = 20 / (2 * 10) = 1
        let p = SpringParams::new(100.0, 20.0, 1.0);
        let mut last = 0.0;
        for i in 1..100 {
            let v = p.ease(i as f32 / 100.0);
            assert!(v >= last && v <= 1.0);
            last = v;
        }
    }

    #[test]
    fn more_damping_settles_an_underdamped_spring_sooner() {
        // Underdamped envelope decays as exp(-c/2m * t): stiffness drops out.
        let loose = SpringParams::new(150.0, 10.0, 1.0).settle_duration();
        let firm = SpringParams::new(150.0, 16.0, 1.0).settle_duration();
        assert!(firm < loose, "firm={firm} loose={loose}");
        assert!((loose - 0.921).abs() < 0.01, "loose={loose}");
        assert!((firm - 0.576).abs() < 0.01, "firm={firm}");
        let stiffer = SpringParams::new(400.0, 10.0, 1.0).settle_duration();
        assert!((stiffer - loose).abs() < 1e-3);
    }

    #[test]
    fn rejects_non_positive_stiffness() {
        assert!(SpringParams::new(0.0, 10.0, 1.0).validate().is_err());
        assert!(SpringParams::new(100.0, -1.0, 1.0).validate().is_err());
        assert!(SpringParams::default().validate().is_ok());
    }
}
