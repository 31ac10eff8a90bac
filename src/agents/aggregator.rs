//! The price-setting agent that serves a group of prosumers.

use log::{debug, info, warn};

use super::types::{Agent, AgentIdentity, Prosumer, TickContext};
use crate::error::SignalError;
use crate::pricing::{PriceSignal, PricingInput, PricingPolicy};
use crate::signal::SignalBuffer;

/// Outcome of one aggregator tick.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorReport {
    /// Sum of linked prosumers' net demand (kW).
    pub net_demand_kw: f32,
    /// Time-of-day slot the demand was recorded in.
    pub time_of_day: usize,
    /// Price applicable at this tick after recomputation.
    pub price: f32,
    /// Number of prosumers that accepted the broadcast, if one was sent.
    pub broadcast_receivers: Option<usize>,
}

/// A retail energy aggregator.
///
/// Every tick it sums its customers' net demand, records the sum as the
/// predicted demand for the same time of day tomorrow, recomputes its price
/// signal and, at the start of each day, broadcasts the signal if it changed.
#[derive(Debug, Clone)]
pub struct Aggregator {
    identity: AgentIdentity,
    ticks_per_day: usize,
    net_demand: f32,
    predicted_demand: SignalBuffer,
    price: PriceSignal,
    policy: PricingPolicy,
    broadcast_len: Option<usize>,
}

impl Aggregator {
    /// Creates an aggregator.
    ///
    /// The price signal gets one slot per value of `base_demand`, starting
    /// flat at `initial_price`. The predicted demand profile is the first
    /// day of `base_demand` multiplied by `demand_scale`, repeated when the
    /// base profile is shorter than a day.
    ///
    /// A base profile that is not a whole number of days is allowed but logged.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::ZeroLength`] if `base_demand` is empty or
    /// `ticks_per_day == 0`.
    pub fn new(
        identity: AgentIdentity,
        base_demand: &[f32],
        demand_scale: f32,
        ticks_per_day: usize,
        policy: PricingPolicy,
        initial_price: f32,
    ) -> Result<Self, SignalError> {
        if base_demand.is_empty() || ticks_per_day == 0 {
            return Err(SignalError::ZeroLength);
        }
        if base_demand.len() % ticks_per_day != 0 {
            warn!(
                "{identity}: base demand of {} ticks is not a whole number of {ticks_per_day}-tick days; \
                 the price signal will repeat within a day",
                base_demand.len()
            );
        }

        let predicted: Vec<f32> = (0..ticks_per_day)
            .map(|t| base_demand[t % base_demand.len()] * demand_scale)
            .collect();

        Ok(Self {
            identity,
            ticks_per_day,
            net_demand: 0.0,
            predicted_demand: SignalBuffer::from_values(predicted)?,
            price: PriceSignal::new(base_demand.len(), initial_price)?,
            policy,
            broadcast_len: None,
        })
    }

    /// Broadcasts `len` ticks instead of the full price signal length.
    pub fn with_broadcast_len(mut self, len: usize) -> Self {
        self.broadcast_len = Some(len);
        self
    }

    /// Runs one tick against already-stepped customers.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::ZeroLength`] if a zero broadcast length was configured.
    pub fn step(
        &mut self,
        ctx: &TickContext,
        customers: &mut [&mut dyn Prosumer],
    ) -> Result<AggregatorReport, SignalError> {
        let time_of_day = ctx.tick % self.ticks_per_day;

        // 1. Aggregate demand
        let sum_demand: f32 = customers.iter().map(|c| c.net_demand()).sum();
        self.net_demand = sum_demand;

        // 2. Naive prediction: tomorrow at this time looks like today
        debug!("{}: predicted demand at {time_of_day} set to {sum_demand}", self.identity);
        self.predicted_demand.set(time_of_day, sum_demand);

        // 3. Price recomputation
        let input = PricingInput {
            predicted_demand: &self.predicted_demand,
            period: self.ticks_per_day,
            tick: ctx.tick,
            net_demand: self.net_demand,
        };
        self.price.update(&self.policy, &input);

        // 4. Daily broadcast
        let mut broadcast_receivers = None;
        if time_of_day == 0 {
            let len = self.broadcast_len.unwrap_or(self.price.len());
            if let Some(signal) = self.price.take_broadcast(ctx.tick, len)? {
                let accepted = customers
                    .iter_mut()
                    .map(|customer| customer.receive_value_signal(&signal, ctx))
                    .filter(|&ok| ok)
                    .count();
                info!(
                    "{}: broadcast {len}-tick {} signal at tick {}, accepted by {accepted} of {} prosumers",
                    self.identity,
                    self.policy.name(),
                    ctx.tick,
                    customers.len()
                );
                broadcast_receivers = Some(accepted);
            }
        }

        Ok(AggregatorReport {
            net_demand_kw: sum_demand,
            time_of_day,
            price: self.price.price_at(ctx.tick),
            broadcast_receivers,
        })
    }

    /// Price applicable at `tick`.
    pub fn current_price(&self, tick: usize) -> f32 {
        self.price.price_at(tick)
    }

    pub fn price_signal(&self) -> &PriceSignal {
        &self.price
    }

    pub fn predicted_demand(&self) -> &SignalBuffer {
        &self.predicted_demand
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    pub fn identity_mut(&mut self) -> &mut AgentIdentity {
        &mut self.identity
    }
}

impl Agent for Aggregator {
    fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    fn net_demand(&self) -> f32 {
        self.net_demand
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::types::AgentId;
    use crate::pricing::{DEFAULT_INITIAL_PRICE, ExponentialCurve};
    use crate::signal::BroadcastSignal;

    struct FixedProsumer {
        identity: AgentIdentity,
        demand: f32,
        accepts: bool,
        received: Vec<BroadcastSignal>,
    }

    impl FixedProsumer {
        fn new(id: u64, demand: f32) -> Self {
            Self {
                identity: AgentIdentity::new(AgentId(id), "fixed"),
                demand,
                accepts: true,
                received: Vec::new(),
            }
        }

        fn rejecting(id: u64, demand: f32) -> Self {
            Self {
                accepts: false,
                ..Self::new(id, demand)
            }
        }
    }

    impl Agent for FixedProsumer {
        fn identity(&self) -> &AgentIdentity {
            &self.identity
        }

        fn net_demand(&self) -> f32 {
            self.demand
        }
    }

    impl Prosumer for FixedProsumer {
        fn receive_value_signal(&mut self, signal: &BroadcastSignal, _ctx: &TickContext) -> bool {
            self.received.push(signal.clone());
            self.accepts
        }
    }

    fn aggregator(policy: PricingPolicy, period: usize, days: usize) -> Aggregator {
        Aggregator::new(
            AgentIdentity::new(AgentId(0), "aggregator"),
            &vec![1.0; period * days],
            1.0,
            period,
            policy,
            DEFAULT_INITIAL_PRICE,
        )
        .unwrap()
    }

    #[test]
    fn sums_customer_demand_into_prediction() {
        let mut agg = aggregator(PricingPolicy::FlatRate { price: 125.0 }, 4, 1);
        let mut a = FixedProsumer::new(1, 2.0);
        let mut b = FixedProsumer::new(2, -1.0);
        let mut c = FixedProsumer::new(3, 3.0);
        let mut customers: Vec<&mut dyn Prosumer> = vec![&mut a, &mut b, &mut c];

        let report = agg.step(&TickContext::new(0, 4), &mut customers).unwrap();
        assert_eq!(report.net_demand_kw, 4.0);
        assert_eq!(agg.net_demand(), 4.0);
        assert_eq!(agg.predicted_demand().get(0), 4.0);
        assert_eq!(agg.predicted_demand().get(1), 1.0);
    }

    #[test]
    fn broadcasts_only_at_period_start() {
        let mut agg = aggregator(
            PricingPolicy::CapacityExponential(ExponentialCurve::default()),
            4,
            2,
        );
        let mut a = FixedProsumer::new(1, 1.0);
        for tick in 0..9 {
            let mut customers: Vec<&mut dyn Prosumer> = vec![&mut a];
            let report = agg.step(&TickContext::new(tick, 4), &mut customers).unwrap();
            assert_eq!(report.broadcast_receivers.is_some(), tick % 4 == 0);
        }
        assert_eq!(a.received.len(), 3);
        assert_eq!(a.received[1].valid_from, 4);
        assert_eq!(a.received[1].len(), 8);
    }

    #[test]
    fn broadcast_starts_at_current_tick() {
        let mut agg = aggregator(
            PricingPolicy::TwoTierTimeOfUse {
                high_price: 125.0,
                low_price: 48.0,
            },
            48,
            1,
        )
        .with_broadcast_len(60);
        let mut a = FixedProsumer::new(1, 1.0);
        let mut customers: Vec<&mut dyn Prosumer> = vec![&mut a];
        agg.step(&TickContext::new(48, 48), &mut customers).unwrap();

        let signal = &a.received[0];
        assert_eq!(signal.len(), 60);
        let values = signal.values.as_slice();
        assert_eq!(values[14], 48.0);
        assert_eq!(values[15], 125.0);
        assert_eq!(values[47], 48.0);
        // Second copy wraps back to the start of the day
        assert_eq!(values[48], 48.0);
        assert_eq!(values[59], 48.0);
    }

    #[test]
    fn two_day_broadcast_repeats_the_tiers() {
        let mut agg = aggregator(
            PricingPolicy::TwoTierTimeOfUse {
                high_price: 125.0,
                low_price: 48.0,
            },
            48,
            1,
        )
        .with_broadcast_len(96);
        let mut a = FixedProsumer::new(1, 1.0);
        let mut customers: Vec<&mut dyn Prosumer> = vec![&mut a];
        agg.step(&TickContext::new(48, 48), &mut customers).unwrap();

        let values = a.received[0].values.as_slice();
        assert_eq!(values.len(), 96);
        assert_eq!(values[48 + 14], 48.0);
        assert_eq!(values[48 + 15], 125.0);
        assert_eq!(values[48 + 47], 48.0);
    }

    #[test]
    fn broadcast_counts_only_accepting_prosumers() {
        let mut agg = aggregator(PricingPolicy::FlatRate { price: 100.0 }, 4, 1);
        let mut a = FixedProsumer::new(1, 1.0);
        let mut b = FixedProsumer::rejecting(2, 1.0);
        let mut c = FixedProsumer::new(3, 1.0);
        let mut customers: Vec<&mut dyn Prosumer> = vec![&mut a, &mut b, &mut c];

        let report = agg.step(&TickContext::new(0, 4), &mut customers).unwrap();
        assert_eq!(report.broadcast_receivers, Some(2));
        assert_eq!(b.received.len(), 1);
    }

    #[test]
    fn unchanged_flat_rate_is_broadcast_once() {
        let mut agg = aggregator(PricingPolicy::FlatRate { price: 125.0 }, 2, 1);
        let mut a = FixedProsumer::new(1, 1.0);
        for tick in 0..6 {
            let mut customers: Vec<&mut dyn Prosumer> = vec![&mut a];
            agg.step(&TickContext::new(tick, 2), &mut customers).unwrap();
        }
        assert_eq!(a.received.len(), 1);
    }

    #[test]
    fn prediction_feeds_this_ticks_price() {
        let curve = ExponentialCurve::default();
        let mut agg = aggregator(PricingPolicy::CapacityExponential(curve), 4, 1);
        let mut a = FixedProsumer::new(1, 150.0);
        let mut customers: Vec<&mut dyn Prosumer> = vec![&mut a];
        let report = agg.step(&TickContext::new(2, 4), &mut customers).unwrap();
        assert_eq!(report.price, curve.price(150.0));
        assert_eq!(agg.current_price(6), curve.price(150.0));
    }

    #[test]
    fn empty_base_demand_is_rejected() {
        let result = Aggregator::new(
            AgentIdentity::new(AgentId(0), "aggregator"),
            &[],
            1.0,
            4,
            PricingPolicy::FlatRate { price: 1.0 },
            DEFAULT_INITIAL_PRICE,
        );
        assert!(matches!(result, Err(SignalError::ZeroLength)));
    }

    #[test]
    fn uneven_base_demand_still_builds() {
        let agg = Aggregator::new(
            AgentIdentity::new(AgentId(0), "aggregator"),
            &[1.0, 2.0, 3.0, 4.0, 5.0],
            0.5,
            4,
            PricingPolicy::FlatRate { price: 1.0 },
            DEFAULT_INITIAL_PRICE,
        )
        .unwrap();
        assert_eq!(agg.price_signal().len(), 5);
        assert_eq!(agg.predicted_demand().as_slice(), &[0.5, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn zero_broadcast_length_fails_the_tick() {
        let mut agg = aggregator(PricingPolicy::FlatRate { price: 125.0 }, 2, 1).with_broadcast_len(0);
        let mut customers: Vec<&mut dyn Prosumer> = Vec::new();
        let result = agg.step(&TickContext::new(0, 2), &mut customers);
        assert_eq!(result, Err(SignalError::ZeroLength));
    }
}
