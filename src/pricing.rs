//! Price signal computation from predicted demand.
//!
//! Prices are in £/MWh, which reads as p/kWh after division by 10.

use log::debug;

use crate::error::SignalError;
use crate::signal::{BroadcastSignal, SignalBuffer, assemble};

/// Fraction of the day at which the two-tier high rate starts (07:30).
const MORNING_CHANGE_FRAC: f64 = 7.5 / 24.0;
/// Fraction of the day at which the two-tier low rate resumes (23:30).
const EVENING_CHANGE_FRAC: f64 = 23.5 / 24.0;
/// Predicted demand is divided by this before comparison with capacities in GW.
const DEMAND_TO_GW: f32 = 10.0;
/// Starting price of every aggregator (12.5 p/kWh).
pub const DEFAULT_INITIAL_PRICE: f32 = 125.0;

/// Parameters of the capacity-margin exponential price curve.
///
/// `price = a * exp(b * x) + c`, where `x` is predicted demand over the
/// spare capacity margin, capped at `price_cap`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialCurve {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    /// Maximum system supply capacity (GW).
    pub max_supply_capacity_gw: f32,
    /// Maximum conventional generator capacity (GW).
    pub max_generator_capacity_gw: f32,
    /// Maximum system buy price (£/MWh).
    pub price_cap: f32,
}

impl Default for ExponentialCurve {
    /// Coefficients estimated from Roscoe and Ault (Figure 4).
    fn default() -> Self {
        Self {
            a: 0.0006,
            b: 12.0,
            c: 40.0,
            max_supply_capacity_gw: 80.0,
            max_generator_capacity_gw: 60.0,
            price_cap: 1000.0,
        }
    }
}

impl ExponentialCurve {
    /// Spare capacity margin in GW.
    pub fn margin_gw(&self) -> f32 {
        self.max_supply_capacity_gw - self.max_generator_capacity_gw
    }

    /// Price for a predicted demand value, never above the cap.
    pub fn price(&self, predicted_demand: f32) -> f32 {
        let x = (predicted_demand / DEMAND_TO_GW) / self.margin_gw();
        let price = (self.a as f64 * (self.b as f64 * x as f64).exp() + self.c as f64) as f32;
        if price.is_nan() || price > self.price_cap {
            self.price_cap
        } else {
            price
        }
    }
}

/// Everything a pricing policy may look at.
#[derive(Debug, Clone, Copy)]
pub struct PricingInput<'a> {
    /// Most recent aggregate demand per time-of-day slot.
    pub predicted_demand: &'a SignalBuffer,
    /// Ticks per day.
    pub period: usize,
    /// Current tick.
    pub tick: usize,
    /// The aggregator's net demand at this tick.
    pub net_demand: f32,
}

/// Interchangeable rules for recomputing a price signal.
#[derive(Debug, Clone, PartialEq)]
pub enum PricingPolicy {
    /// The same price in every slot.
    FlatRate { price: f32 },
    /// Economy-7 style tariff: low overnight, high from 07:30 to 23:30.
    TwoTierTimeOfUse { high_price: f32, low_price: f32 },
    /// Exponential in predicted demand relative to spare capacity.
    CapacityExponential(ExponentialCurve),
    /// Scales the current slot up while net demand exceeds the predicted instantaneous demand.
    OverCapacityScaling,
}

impl PricingPolicy {
    /// Computes the next price signal from the previous one.
    ///
    /// The result always has the same length as `previous`.
    pub fn compute(&self, input: &PricingInput<'_>, previous: &SignalBuffer) -> SignalBuffer {
        let mut next = previous.clone();
        match self {
            Self::FlatRate { price } => next.fill_constant(*price),
            Self::TwoTierTimeOfUse {
                high_price,
                low_price,
            } => {
                let (morning, evening) = two_tier_boundaries(input.period);
                for (i, slot) in next.as_mut_slice().iter_mut().enumerate() {
                    let time_of_day = i % input.period;
                    *slot = if time_of_day < morning || time_of_day >= evening {
                        *low_price
                    } else {
                        *high_price
                    };
                }
            }
            Self::CapacityExponential(curve) => {
                for (i, slot) in next.as_mut_slice().iter_mut().enumerate() {
                    *slot = curve.price(input.predicted_demand.get(i));
                }
            }
            Self::OverCapacityScaling => {
                let predicted_instantaneous = 0.0_f32;
                if input.net_demand > predicted_instantaneous {
                    let factor = (1.25 - (-(input.net_demand - predicted_instantaneous) as f64).exp()) as f32;
                    let len = next.len();
                    let slot = input.tick % len;
                    next.as_mut_slice()[slot] *= factor;
                    if slot + input.period < len {
                        next.as_mut_slice()[slot + input.period] *= factor;
                    }
                }
            }
        }
        next
    }

    /// Whether every recomputation marks the signal changed without comparing values.
    pub fn always_changes(&self) -> bool {
        matches!(self, Self::CapacityExponential(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FlatRate { .. } => "flat",
            Self::TwoTierTimeOfUse { .. } => "two_tier",
            Self::CapacityExponential(_) => "exponential",
            Self::OverCapacityScaling => "over_capacity",
        }
    }
}

/// Start of the high-rate window and start of the evening low-rate window.
///
/// Both are truncated to whole ticks.
pub fn two_tier_boundaries(period: usize) -> (usize, usize) {
    let morning = (period as f64 * MORNING_CHANGE_FRAC) as usize;
    let evening = (period as f64 * EVENING_CHANGE_FRAC) as usize;
    (morning, evening)
}

/// The aggregator's price signal and its dirty bit.
///
/// `changed` is raised by any recomputation that alters the values and
/// cleared once a broadcast built from the signal has been taken.
#[derive(Debug, Clone)]
pub struct PriceSignal {
    buffer: SignalBuffer,
    changed: bool,
}

impl PriceSignal {
    /// A new signal of `len` slots at `initial_price`, marked changed.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::ZeroLength`] if `len == 0`.
    pub fn new(len: usize, initial_price: f32) -> Result<Self, SignalError> {
        Ok(Self {
            buffer: SignalBuffer::filled(len, initial_price)?,
            changed: true,
        })
    }

    /// Applies `policy` and updates the dirty bit.
    pub fn update(&mut self, policy: &PricingPolicy, input: &PricingInput<'_>) {
        let next = policy.compute(input, &self.buffer);
        if policy.always_changes() || !next.equals_contents(&self.buffer) {
            self.changed = true;
        }
        self.buffer = next;
    }

    /// Builds a broadcast starting at `tick` if the signal changed since the last one.
    ///
    /// Clears the dirty bit on success.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::ZeroLength`] if `len == 0`.
    pub fn take_broadcast(
        &mut self,
        tick: usize,
        len: usize,
    ) -> Result<Option<BroadcastSignal>, SignalError> {
        if !self.changed {
            debug!("price signal unchanged at tick {tick}, skipping broadcast");
            return Ok(None);
        }
        let values = assemble(&self.buffer, tick, len)?;
        self.changed = false;
        Ok(Some(BroadcastSignal::new(tick, values)))
    }

    /// Price applicable at `tick`.
    pub fn price_at(&self, tick: usize) -> f32 {
        self.buffer.get(tick)
    }

    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn buffer(&self) -> &SignalBuffer {
        &self.buffer
    }
}
