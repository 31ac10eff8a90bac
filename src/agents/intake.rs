//! Prosumer-side storage of broadcast value signals.

use log::{debug, warn};

use super::types::TickContext;
use crate::error::SignalError;
use crate::signal::{BroadcastSignal, SignalBuffer};

/// A prosumer's memory of the most recent value signal.
///
/// Local index 0 of the stored buffer is the tick the signal was received;
/// [`SignalIntake::current_prediction`] reads it relative to that tick.
#[derive(Debug, Clone, Default)]
pub struct SignalIntake {
    /// Whether the agent can receive signals at all.
    has_smart_meter: bool,
    predicted_cost: Option<SignalBuffer>,
    prediction_valid_tick: usize,
}

impl SignalIntake {
    pub fn new(has_smart_meter: bool) -> Self {
        Self {
            has_smart_meter,
            predicted_cost: None,
            prediction_valid_tick: 0,
        }
    }

    pub fn has_smart_meter(&self) -> bool {
        self.has_smart_meter
    }

    /// Realigns `signal` against `ctx.tick` and stores it.
    ///
    /// With `offset = now - signal.valid_from`, the stored buffer holds
    /// `len - offset` slots:
    /// - `offset >= 0`: the elapsed prefix is dropped and the rest starts at index 0.
    /// - `offset < 0`: the signal starts at index `-offset`; earlier slots keep
    ///   their previous values when the buffer is reused, zeros otherwise.
    ///
    /// A signal that has fully elapsed (`offset >= len`) is rejected and the
    /// stored buffer left as it was.
    pub fn receive(&mut self, signal: &BroadcastSignal, ctx: &TickContext) -> bool {
        if !self.has_smart_meter {
            return true;
        }

        let now = ctx.tick;
        let length = signal.len() as i64;
        let offset = now as i64 - signal.valid_from as i64;
        if offset != 0 {
            debug!(
                "signal valid from tick {} received at tick {now} (offset {offset})",
                signal.valid_from
            );
        }

        let effective_len = length - offset;
        if effective_len <= 0 {
            warn!(
                "dropping signal of length {length} valid from tick {}: fully elapsed at tick {now}",
                signal.valid_from
            );
            return false;
        }
        let effective_len = effective_len as usize;

        let reuse = self
            .predicted_cost
            .as_ref()
            .is_some_and(|b| b.len() == effective_len);
        if !reuse {
            debug!("re-defining predicted cost buffer to {effective_len} slots");
            match SignalBuffer::new(effective_len) {
                Ok(fresh) => self.predicted_cost = Some(fresh),
                Err(_) => return false,
            }
        }
        let Some(buffer) = self.predicted_cost.as_mut() else {
            return false;
        };

        let src = signal.values.as_slice();
        let dst = buffer.as_mut_slice();
        if offset < 0 {
            let at = (-offset) as usize;
            dst[at..at + src.len()].copy_from_slice(src);
        } else {
            dst.copy_from_slice(&src[offset as usize..]);
        }

        self.prediction_valid_tick = now;
        true
    }

    /// Predicted cost applicable at `tick`.
    ///
    /// Reads slot `(tick - prediction_valid_tick) mod len`, so ticks before
    /// receipt wrap to the end of the stored signal.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::Uninitialized`] before the first signal is stored.
    pub fn current_prediction(&self, tick: usize) -> Result<f32, SignalError> {
        let buffer = self
            .predicted_cost
            .as_ref()
            .ok_or(SignalError::Uninitialized)?;
        let elapsed = tick as i64 - self.prediction_valid_tick as i64;
        Ok(buffer.get(elapsed.rem_euclid(buffer.len() as i64) as usize))
    }

    /// The stored signal, if any.
    pub fn predicted_cost(&self) -> Option<&SignalBuffer> {
        self.predicted_cost.as_ref()
    }

    /// Tick that local index 0 of the stored signal refers to.
    pub fn prediction_valid_tick(&self) -> usize {
        self.prediction_valid_tick
    }
}
