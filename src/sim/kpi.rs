//! Post-hoc market indicators computed from tick records.

use std::fmt;

use super::types::TickRecord;

/// Aggregate indicators derived from a complete market run.
///
/// Computed from `Vec<TickRecord>` so the report always agrees with the
/// per-tick data.
#[derive(Debug, Clone)]
pub struct MarketReport {
    /// Number of ticks covered.
    pub ticks: usize,
    /// Highest total net demand in any tick (kW).
    pub peak_demand_kw: f32,
    /// Lowest total net demand in any tick (kW; negative means net export).
    pub min_demand_kw: f32,
    /// Mean total net demand (kW).
    pub mean_demand_kw: f32,
    /// Mean price over all aggregators and ticks.
    pub mean_price: f32,
    /// Highest price seen.
    pub max_price: f32,
    /// Total energy drawn over the run (kWh, sum of demand * dt).
    pub energy_kwh: f32,
    /// Number of broadcasts sent.
    pub broadcasts: usize,
}

impl MarketReport {
    /// Computes all indicators from the complete record vector.
    ///
    /// # Arguments
    ///
    /// * `records` - Complete tick records
    /// * `dt_hours` - Tick duration in hours
    pub fn from_records(records: &[TickRecord], dt_hours: f32) -> Self {
        if records.is_empty() {
            return Self {
                ticks: 0,
                peak_demand_kw: 0.0,
                min_demand_kw: 0.0,
                mean_demand_kw: 0.0,
                mean_price: 0.0,
                max_price: 0.0,
                energy_kwh: 0.0,
                broadcasts: 0,
            };
        }

        let mut peak = f32::NEG_INFINITY;
        let mut min = f32::INFINITY;
        let mut demand_sum = 0.0_f32;
        let mut price_sum = 0.0_f32;
        let mut price_count = 0_usize;
        let mut max_price = f32::NEG_INFINITY;
        let mut broadcasts = 0_usize;

        for r in records {
            let demand = r.total_demand_kw();
            peak = peak.max(demand);
            min = min.min(demand);
            demand_sum += demand;

            for a in &r.aggregators {
                price_sum += a.price;
                price_count += 1;
                max_price = max_price.max(a.price);
                if a.broadcast_receivers.is_some() {
                    broadcasts += 1;
                }
            }
        }

        let (mean_price, max_price) = if price_count > 0 {
            (price_sum / price_count as f32, max_price)
        } else {
            (0.0, 0.0)
        };

        Self {
            ticks: records.len(),
            peak_demand_kw: peak,
            min_demand_kw: min,
            mean_demand_kw: demand_sum / records.len() as f32,
            mean_price,
            max_price,
            energy_kwh: demand_sum * dt_hours,
            broadcasts,
        }
    }
}

impl fmt::Display for MarketReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Market Report ---")?;
        writeln!(f, "Ticks:                 {}", self.ticks)?;
        writeln!(f, "Peak demand:           {:.2} kW", self.peak_demand_kw)?;
        writeln!(f, "Minimum demand:        {:.2} kW", self.min_demand_kw)?;
        writeln!(f, "Mean demand:           {:.2} kW", self.mean_demand_kw)?;
        writeln!(f, "Energy drawn:          {:.2} kWh", self.energy_kwh)?;
        writeln!(f, "Mean price:            {:.2} £/MWh", self.mean_price)?;
        writeln!(f, "Max price:             {:.2} £/MWh", self.max_price)?;
        write!(f, "Broadcasts sent:       {}", self.broadcasts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentId;
    use crate::sim::types::AggregatorRecord;

    fn record(tick: usize, demand: f32, price: f32, broadcast: bool) -> TickRecord {
        TickRecord {
            tick,
            time_hr: tick as f32 * 0.5,
            time_of_day: tick % 48,
            prosumers: 2,
            aggregators: vec![AggregatorRecord {
                aggregator: AgentId(0),
                net_demand_kw: demand,
                price,
                broadcast_receivers: broadcast.then_some(2),
            }],
        }
    }

    #[test]
    fn empty_records_give_zero_report() {
        let report = MarketReport::from_records(&[], 0.5);
        assert_eq!(report.ticks, 0);
        assert_eq!(report.broadcasts, 0);
        assert_eq!(report.peak_demand_kw, 0.0);
    }

    #[test]
    fn indicators_from_known_records() {
        let records = vec![
            record(0, 4.0, 100.0, true),
            record(1, -2.0, 50.0, false),
            record(2, 1.0, 150.0, false),
        ];
        let report = MarketReport::from_records(&records, 0.5);
        assert_eq!(report.ticks, 3);
        assert_eq!(report.peak_demand_kw, 4.0);
        assert_eq!(report.min_demand_kw, -2.0);
        assert!((report.mean_demand_kw - 1.0).abs() < 1e-6);
        assert!((report.energy_kwh - 1.5).abs() < 1e-6);
        assert!((report.mean_price - 100.0).abs() < 1e-4);
        assert_eq!(report.max_price, 150.0);
        assert_eq!(report.broadcasts, 1);
    }

    #[test]
    fn display_does_not_panic() {
        let report = MarketReport::from_records(&[record(0, 1.0, 1.0, true)], 1.0);
        assert!(format!("{report}").contains("Broadcasts sent"));
    }
}
