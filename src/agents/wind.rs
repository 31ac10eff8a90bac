//! Wind generator prosumer with temporally correlated wind speed (AR(1) process).

use rand::{SeedableRng, rngs::StdRng};

use super::intake::SignalIntake;
use super::types::{Agent, AgentIdentity, Prosumer, TickContext, gaussian_noise};
use crate::signal::BroadcastSignal;

/// A wind turbine that only generates, so its net demand is never positive.
///
/// Wind speed relative to its mean evolves as:
/// ```text
/// m(t) = alpha * m(t-1) + (1 - alpha) * (1 + epsilon(t))
/// ```
/// clamped to \[0, 3\], and output follows a cubic power curve between
/// cut-in and rated speed, flat up to cut-out, and zero beyond.
#[derive(Debug, Clone)]
pub struct WindGenerator {
    identity: AgentIdentity,

    /// Rated output in kilowatts.
    pub rated_kw: f32,

    /// Long-run mean wind speed (m/s).
    pub mean_speed: f32,

    /// AR(1) correlation coefficient (0.0 = uncorrelated, 1.0 = fully persistent).
    pub alpha: f32,

    /// Standard deviation of the AR(1) innovation noise.
    pub noise_std: f32,

    /// Speed below which nothing is generated (m/s).
    pub cut_in: f32,

    /// Speed at which rated output is reached (m/s).
    pub rated_speed: f32,

    /// Speed above which the turbine shuts down (m/s).
    pub cut_out: f32,

    multiplier: f32,
    net_demand: f32,
    intake: SignalIntake,
    rng: StdRng,
}

const MULTIPLIER_MIN: f32 = 0.0;
const MULTIPLIER_MAX: f32 = 3.0;

impl WindGenerator {
    /// Creates a wind generator without a smart meter.
    ///
    /// # Panics
    ///
    /// Panics unless `cut_in < rated_speed <= cut_out`.
    #[expect(clippy::too_many_arguments)]
    pub fn new(
        identity: AgentIdentity,
        rated_kw: f32,
        mean_speed: f32,
        alpha: f32,
        noise_std: f32,
        cut_in: f32,
        rated_speed: f32,
        cut_out: f32,
        seed: u64,
    ) -> Self {
        assert!(
            cut_in < rated_speed && rated_speed <= cut_out,
            "wind speeds must satisfy cut_in < rated_speed <= cut_out"
        );
        Self {
            identity,
            rated_kw: rated_kw.max(0.0),
            mean_speed: mean_speed.max(0.0),
            alpha: alpha.clamp(0.0, 1.0),
            noise_std: noise_std.max(0.0),
            cut_in,
            rated_speed,
            cut_out,
            multiplier: 1.0,
            net_demand: 0.0,
            intake: SignalIntake::new(false),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Fits a smart meter so the generator stores value signals.
    pub fn with_smart_meter(mut self) -> Self {
        self.intake = SignalIntake::new(true);
        self
    }

    /// Output in kilowatts at wind speed `speed`.
    pub fn power_curve_kw(&self, speed: f32) -> f32 {
        if speed < self.cut_in || speed > self.cut_out {
            0.0
        } else if speed >= self.rated_speed {
            self.rated_kw
        } else {
            let frac = (speed.powi(3) - self.cut_in.powi(3))
                / (self.rated_speed.powi(3) - self.cut_in.powi(3));
            self.rated_kw * frac
        }
    }

    /// Advances the AR(1) wind multiplier by one tick and returns the new speed.
    fn advance_speed(&mut self) -> f32 {
        let epsilon = gaussian_noise(&mut self.rng, self.noise_std);
        self.multiplier = self.alpha * self.multiplier + (1.0 - self.alpha) * (1.0 + epsilon);
        self.multiplier = self.multiplier.clamp(MULTIPLIER_MIN, MULTIPLIER_MAX);
        self.mean_speed * self.multiplier
    }

    /// Updates net demand (negative generation) for the tick.
    pub fn step(&mut self, _ctx: &TickContext) {
        let speed = self.advance_speed();
        self.net_demand = -self.power_curve_kw(speed);
    }

    pub fn intake(&self) -> &SignalIntake {
        &self.intake
    }

    pub fn identity_mut(&mut self) -> &mut AgentIdentity {
        &mut self.identity
    }
}

impl Agent for WindGenerator {
    fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    fn net_demand(&self) -> f32 {
        self.net_demand
    }
}

impl Prosumer for WindGenerator {
    fn receive_value_signal(&mut self, signal: &BroadcastSignal, ctx: &TickContext) -> bool {
        self.intake.receive(signal, ctx)
    }
}
