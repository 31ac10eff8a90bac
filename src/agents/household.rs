use rand::{SeedableRng, rngs::StdRng};

use super::intake::SignalIntake;
use super::types::{Agent, AgentIdentity, Prosumer, TickContext, gaussian_noise};
use crate::signal::BroadcastSignal;

/// A household prosumer with a daily consumption pattern.
///
/// Demand follows a sinusoid over the day plus Gaussian noise. A household
/// with a smart meter stores the aggregator's value signal and, when
/// `elasticity > 0`, consumes less while the predicted cost is above its
/// daily mean and more while it is below.
///
/// # Examples
///
/// ```
/// use tariff_sim::agents::{Agent, AgentId, AgentIdentity, Household, TickContext};
///
/// let mut house = Household::new(
///     AgentIdentity::new(AgentId(0), "household"),
///     1.0,   // base_kw
///     0.5,   // amp_kw
///     0.0,   // phase_rad
///     0.0,   // noise_std
///     24,    // ticks_per_day
///     42,    // seed
/// );
/// house.step(&TickContext::new(6, 24));
/// assert!((house.net_demand() - 1.5).abs() < 1e-5);
/// ```
#[derive(Debug, Clone)]
pub struct Household {
    identity: AgentIdentity,

    /// Baseline consumption in kilowatts
    pub base_kw: f32,

    /// Amplitude of the daily sinusoid in kilowatts
    pub amp_kw: f32,

    /// Phase offset of the daily sinusoid in radians
    pub phase_rad: f32,

    /// Standard deviation of the Gaussian noise in kilowatts
    pub noise_std: f32,

    /// Relative demand reduction per unit of relative price increase
    pub elasticity: f32,

    ticks_per_day: usize,
    net_demand: f32,
    intake: SignalIntake,
    rng: StdRng,
}

impl Household {
    /// Creates a household without a smart meter.
    ///
    /// # Arguments
    ///
    /// * `identity` - Agent identity
    /// * `base_kw` - Baseline consumption in kilowatts
    /// * `amp_kw` - Amplitude of the daily variation in kilowatts
    /// * `phase_rad` - Phase offset in radians
    /// * `noise_std` - Standard deviation of Gaussian noise in kilowatts
    /// * `ticks_per_day` - Ticks per simulated day
    /// * `seed` - Random seed for reproducible noise
    pub fn new(
        identity: AgentIdentity,
        base_kw: f32,
        amp_kw: f32,
        phase_rad: f32,
        noise_std: f32,
        ticks_per_day: usize,
        seed: u64,
    ) -> Self {
        Self {
            identity,
            base_kw,
            amp_kw,
            phase_rad,
            noise_std: noise_std.max(0.0),
            elasticity: 0.0,
            ticks_per_day: ticks_per_day.max(1),
            net_demand: 0.0,
            intake: SignalIntake::new(false),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Fits a smart meter and sets the price elasticity.
    pub fn with_smart_meter(mut self, elasticity: f32) -> Self {
        self.intake = SignalIntake::new(true);
        self.elasticity = elasticity.max(0.0);
        self
    }

    /// Noise-free demand at `tick` before any price response.
    pub fn profile_kw(&self, tick: usize) -> f32 {
        let day_pos = (tick % self.ticks_per_day) as f32 / self.ticks_per_day as f32;
        let angle = 2.0 * std::f32::consts::PI * day_pos + self.phase_rad;
        (self.base_kw + self.amp_kw * angle.sin()).max(0.0)
    }

    /// Updates net demand for the tick.
    pub fn step(&mut self, ctx: &TickContext) {
        let noise = gaussian_noise(&mut self.rng, self.noise_std);
        let kw = (self.profile_kw(ctx.tick) + noise).max(0.0);
        self.net_demand = kw * self.price_response(ctx.tick);
    }

    /// Demand multiplier from the stored cost signal; 1.0 without one.
    fn price_response(&self, tick: usize) -> f32 {
        if self.elasticity <= 0.0 {
            return 1.0;
        }
        let (Ok(price), Some(signal)) = (
            self.intake.current_prediction(tick),
            self.intake.predicted_cost(),
        ) else {
            return 1.0;
        };
        let mean = signal.mean();
        if mean <= 0.0 {
            return 1.0;
        }
        (1.0 - self.elasticity * (price / mean - 1.0)).max(0.0)
    }

    pub fn intake(&self) -> &SignalIntake {
        &self.intake
    }

    pub fn identity_mut(&mut self) -> &mut AgentIdentity {
        &mut self.identity
    }
}

impl Agent for Household {
    fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    fn net_demand(&self) -> f32 {
        self.net_demand
    }
}

impl Prosumer for Household {
    fn receive_value_signal(&mut self, signal: &BroadcastSignal, ctx: &TickContext) -> bool {
        self.intake.receive(signal, ctx)
    }
}
