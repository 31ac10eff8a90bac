//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use log::info;
use serde::Deserialize;
use thiserror::Error;

use crate::agents::{AgentIdentity, Aggregator, Household, IdAllocator, WindGenerator};
use crate::pricing::{DEFAULT_INITIAL_PRICE, ExponentialCurve, PricingPolicy};
use crate::sim::engine::Market;
use crate::sim::network::Adjacency;
use crate::sim::population::Population;
use crate::sim::types::SimConfig;

/// Seed offset for household RNGs.
const HOUSEHOLD_SEED_OFFSET: u64 = 1_000;
/// Seed offset for wind generator RNGs, away from the household range.
const WIND_SEED_OFFSET: u64 = 2_000_000;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Timing and global parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Aggregator parameters.
    #[serde(default)]
    pub aggregator: AggregatorConfig,
    /// Pricing policy selection and coefficients.
    #[serde(default)]
    pub pricing: PricingConfig,
    /// Household population.
    #[serde(default)]
    pub households: HouseholdConfig,
    /// Wind generator population.
    #[serde(default)]
    pub wind: WindConfig,
}

/// Timing and global parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Ticks per simulated day (must be > 0).
    pub ticks_per_day: usize,
    /// Number of days to simulate (must be > 0).
    pub days: usize,
    /// Master random seed.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ticks_per_day: 48,
            days: 2,
            seed: 42,
        }
    }
}

/// Aggregator parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AggregatorConfig {
    /// Base demand profile; defaults to one noise-free day of the household population.
    pub base_demand: Option<Vec<f32>>,
    /// Multiplier from base demand units to predicted customer demand.
    pub base_demand_scale: f32,
    /// Broadcast length in ticks; defaults to the full price signal.
    pub broadcast_length: Option<usize>,
    /// Starting price in every slot (£/MWh).
    pub initial_price: f32,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            base_demand: None,
            base_demand_scale: 1.0,
            broadcast_length: None,
            initial_price: DEFAULT_INITIAL_PRICE,
        }
    }
}

/// Pricing policy selection and coefficients.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PricingConfig {
    /// `"flat"`, `"two_tier"`, `"exponential"`, or `"over_capacity"`.
    pub policy: String,
    /// Price for the flat policy.
    pub flat_price: f32,
    /// Day rate for the two-tier policy.
    pub high_price: f32,
    /// Night rate for the two-tier policy.
    pub low_price: f32,
    /// Exponential curve scale.
    pub a: f32,
    /// Exponential curve rate.
    pub b: f32,
    /// Exponential curve offset.
    pub c: f32,
    /// Maximum system supply capacity (GW).
    pub max_supply_capacity_gw: f32,
    /// Maximum conventional generator capacity (GW).
    pub max_generator_capacity_gw: f32,
    /// Price ceiling for the exponential policy.
    pub price_cap: f32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        let curve = ExponentialCurve::default();
        Self {
            policy: "exponential".to_string(),
            flat_price: 125.0,
            high_price: 125.0,
            low_price: 48.0,
            a: curve.a,
            b: curve.b,
            c: curve.c,
            max_supply_capacity_gw: curve.max_supply_capacity_gw,
            max_generator_capacity_gw: curve.max_generator_capacity_gw,
            price_cap: curve.price_cap,
        }
    }
}

impl PricingConfig {
    /// Available policy names.
    pub const POLICIES: &[&str] = &["flat", "two_tier", "exponential", "over_capacity"];

    /// Builds the configured policy, or `None` for an unknown name.
    pub fn policy(&self) -> Option<PricingPolicy> {
        match self.policy.as_str() {
            "flat" => Some(PricingPolicy::FlatRate {
                price: self.flat_price,
            }),
            "two_tier" => Some(PricingPolicy::TwoTierTimeOfUse {
                high_price: self.high_price,
                low_price: self.low_price,
            }),
            "exponential" => Some(PricingPolicy::CapacityExponential(ExponentialCurve {
                a: self.a,
                b: self.b,
                c: self.c,
                max_supply_capacity_gw: self.max_supply_capacity_gw,
                max_generator_capacity_gw: self.max_generator_capacity_gw,
                price_cap: self.price_cap,
            })),
            "over_capacity" => Some(PricingPolicy::OverCapacityScaling),
            _ => None,
        }
    }
}

/// Household population parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HouseholdConfig {
    /// Number of households.
    pub count: usize,
    /// Baseline consumption (kW).
    pub base_kw: f32,
    /// Sinusoidal amplitude (kW).
    pub amp_kw: f32,
    /// Phase offset (radians).
    pub phase_rad: f32,
    /// Gaussian noise standard deviation (kW).
    pub noise_std: f32,
    /// Whether households can receive value signals.
    pub smart_meter: bool,
    /// Price elasticity of smart-metered households (>= 0).
    pub elasticity: f32,
}

impl Default for HouseholdConfig {
    fn default() -> Self {
        Self {
            count: 20,
            base_kw: 0.8,
            amp_kw: 0.7,
            phase_rad: 1.2,
            noise_std: 0.05,
            smart_meter: true,
            elasticity: 0.2,
        }
    }
}

/// Wind generator population parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindConfig {
    /// Number of turbines.
    pub count: usize,
    /// Rated output (kW).
    pub rated_kw: f32,
    /// Mean wind speed (m/s).
    pub mean_speed: f32,
    /// AR(1) correlation coefficient (0.0–1.0).
    pub alpha: f32,
    /// AR(1) innovation noise standard deviation.
    pub noise_std: f32,
    /// Cut-in speed (m/s).
    pub cut_in: f32,
    /// Rated speed (m/s).
    pub rated_speed: f32,
    /// Cut-out speed (m/s).
    pub cut_out: f32,
    /// Whether turbines can receive value signals.
    pub smart_meter: bool,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            count: 1,
            rated_kw: 6.0,
            mean_speed: 7.0,
            alpha: 0.9,
            noise_std: 0.4,
            cut_in: 3.0,
            rated_speed: 12.0,
            cut_out: 25.0,
            smart_meter: false,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.ticks_per_day"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: capacity-exponential pricing.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Returns the flat-rate preset: 12.5 p/kWh at all times.
    pub fn flat_rate() -> Self {
        Self {
            pricing: PricingConfig {
                policy: "flat".to_string(),
                ..PricingConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the Economy 7 preset: 12.5 p/kWh by day, 4.8 p/kWh by night.
    pub fn economy_seven() -> Self {
        Self {
            pricing: PricingConfig {
                policy: "two_tier".to_string(),
                high_price: 125.0,
                low_price: 48.0,
                ..PricingConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "flat_rate", "economy_seven"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "flat_rate" => Ok(Self::flat_rate()),
            "economy_seven" => Ok(Self::economy_seven()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid. A base demand
    /// that is not a whole number of days is not an error.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.ticks_per_day == 0 {
            errors.push(ConfigError::new("simulation.ticks_per_day", "must be > 0"));
        }
        if s.days == 0 {
            errors.push(ConfigError::new("simulation.days", "must be > 0"));
        }

        let agg = &self.aggregator;
        if agg.base_demand.as_ref().is_some_and(Vec::is_empty) {
            errors.push(ConfigError::new("aggregator.base_demand", "must not be empty"));
        }
        if agg.broadcast_length == Some(0) {
            errors.push(ConfigError::new("aggregator.broadcast_length", "must be > 0"));
        }

        let p = &self.pricing;
        if p.policy().is_none() {
            errors.push(ConfigError::new(
                "pricing.policy",
                format!(
                    "must be one of {}, got \"{}\"",
                    PricingConfig::POLICIES.join(", "),
                    p.policy
                ),
            ));
        }
        if p.policy == "exponential" {
            if p.max_supply_capacity_gw <= p.max_generator_capacity_gw {
                errors.push(ConfigError::new(
                    "pricing.max_supply_capacity_gw",
                    "must be > pricing.max_generator_capacity_gw",
                ));
            }
            if p.price_cap <= 0.0 {
                errors.push(ConfigError::new("pricing.price_cap", "must be > 0"));
            }
        }

        if self.households.elasticity < 0.0 {
            errors.push(ConfigError::new("households.elasticity", "must be >= 0"));
        }

        let w = &self.wind;
        if !(w.cut_in < w.rated_speed && w.rated_speed <= w.cut_out) {
            errors.push(ConfigError::new(
                "wind.rated_speed",
                "must satisfy wind.cut_in < wind.rated_speed <= wind.cut_out",
            ));
        }
        if !(0.0..=1.0).contains(&w.alpha) {
            errors.push(ConfigError::new("wind.alpha", "must be in [0.0, 1.0]"));
        }

        errors
    }

    /// Builds a market with one aggregator linked to every prosumer.
    ///
    /// The aggregator gets the first id, then households, then wind turbines.
    ///
    /// # Errors
    ///
    /// Returns the first validation error, if any.
    pub fn build_market(&self) -> Result<Market<Adjacency>, ConfigError> {
        if let Some(e) = self.validate().into_iter().next() {
            return Err(e);
        }

        let s = &self.simulation;
        let sim_config = SimConfig::new(s.ticks_per_day, s.days, s.seed);
        let mut ids = IdAllocator::default();
        let mut population = Population::default();
        let mut network = Adjacency::default();

        let aggregator_id = ids.allocate();
        let h = &self.households;
        let households: Vec<Household> = (0..h.count)
            .map(|i| {
                let house = Household::new(
                    AgentIdentity::new(ids.allocate(), "household"),
                    h.base_kw,
                    h.amp_kw,
                    h.phase_rad,
                    h.noise_std,
                    s.ticks_per_day,
                    s.seed.wrapping_add(HOUSEHOLD_SEED_OFFSET + i as u64),
                );
                if h.smart_meter {
                    house.with_smart_meter(h.elasticity)
                } else {
                    house
                }
            })
            .collect();

        let base_demand = match &self.aggregator.base_demand {
            Some(profile) => profile.clone(),
            None => (0..s.ticks_per_day)
                .map(|t| households.iter().map(|house| house.profile_kw(t)).sum())
                .collect(),
        };
        let policy = self
            .pricing
            .policy()
            .ok_or_else(|| ConfigError::new("pricing.policy", "unknown policy"))?;
        let mut aggregator = Aggregator::new(
            AgentIdentity::new(aggregator_id, "aggregator"),
            &base_demand,
            self.aggregator.base_demand_scale,
            s.ticks_per_day,
            policy,
            self.aggregator.initial_price,
        )
        .map_err(|e| ConfigError::new("aggregator.base_demand", e.to_string()))?;
        if let Some(len) = self.aggregator.broadcast_length {
            aggregator = aggregator.with_broadcast_len(len);
        }
        population.insert(aggregator);

        for house in households {
            network.link(aggregator_id, population.insert(house));
        }

        let w = &self.wind;
        for i in 0..w.count {
            let turbine = WindGenerator::new(
                AgentIdentity::new(ids.allocate(), "wind"),
                w.rated_kw,
                w.mean_speed,
                w.alpha,
                w.noise_std,
                w.cut_in,
                w.rated_speed,
                w.cut_out,
                s.seed.wrapping_add(WIND_SEED_OFFSET + i as u64),
            );
            let turbine = if w.smart_meter {
                turbine.with_smart_meter()
            } else {
                turbine
            };
            network.link(aggregator_id, population.insert(turbine));
        }

        info!(
            "built market: {} households, {} wind turbines, {} pricing",
            h.count, w.count, self.pricing.policy
        );
        Ok(Market::new(sim_config, population, network))
    }
}
