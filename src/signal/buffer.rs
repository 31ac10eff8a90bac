//! Fixed-length numeric signal with circular tick addressing.

use crate::error::SignalError;

/// A fixed-length sequence of per-tick values addressed modulo its length.
///
/// Slot `t % len` holds the value that applies at absolute tick `t`, so a
/// one-day buffer repeats every day. The length is never zero: every
/// constructor rejects an empty buffer with [`SignalError::ZeroLength`].
///
/// # Examples
///
/// ```
/// use tariff_sim::signal::SignalBuffer;
///
/// let mut buf = SignalBuffer::new(4).unwrap();
/// buf.set(6, 2.5);
/// assert_eq!(buf.get(2), 2.5);
/// assert_eq!(buf.get(10), 2.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SignalBuffer {
    values: Vec<f32>,
}

impl SignalBuffer {
    /// Creates a zero-filled buffer of `len` slots.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::ZeroLength`] if `len == 0`.
    pub fn new(len: usize) -> Result<Self, SignalError> {
        Self::filled(len, 0.0)
    }

    /// Creates a buffer of `len` slots all holding `value`.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::ZeroLength`] if `len == 0`.
    pub fn filled(len: usize, value: f32) -> Result<Self, SignalError> {
        if len == 0 {
            return Err(SignalError::ZeroLength);
        }
        Ok(Self {
            values: vec![value; len],
        })
    }

    /// Wraps existing values in a buffer.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::ZeroLength`] if `values` is empty.
    pub fn from_values(values: Vec<f32>) -> Result<Self, SignalError> {
        if values.is_empty() {
            return Err(SignalError::ZeroLength);
        }
        Ok(Self { values })
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value applicable at absolute tick `tick`.
    pub fn get(&self, tick: usize) -> f32 {
        self.values[tick % self.values.len()]
    }

    /// Stores `value` in the slot for absolute tick `tick`.
    pub fn set(&mut self, tick: usize, value: f32) {
        let len = self.values.len();
        self.values[tick % len] = value;
    }

    /// Overwrites every slot with `value`.
    pub fn fill_constant(&mut self, value: f32) {
        self.values.fill(value);
    }

    /// Reallocates to `new_len` zeroed slots, discarding the old contents.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::ZeroLength`] if `new_len == 0`; the buffer is left untouched.
    pub fn resize(&mut self, new_len: usize) -> Result<(), SignalError> {
        *self = Self::new(new_len)?;
        Ok(())
    }

    /// Returns `true` when both buffers hold exactly the same values.
    pub fn equals_contents(&self, other: &SignalBuffer) -> bool {
        self.values == other.values
    }

    /// Arithmetic mean of all slots.
    pub fn mean(&self) -> f32 {
        self.values.iter().sum::<f32>() / self.values.len() as f32
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.values
    }
}
