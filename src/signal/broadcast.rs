use super::buffer::SignalBuffer;
use crate::error::SignalError;

/// A window of the price signal pushed to prosumers.
///
/// `values[k]` applies at absolute tick `valid_from + k`.
#[derive(Debug, Clone, PartialEq)]
pub struct BroadcastSignal {
    /// Tick from which the first value is valid.
    pub valid_from: usize,
    /// Signal values, one per tick.
    pub values: SignalBuffer,
}

impl BroadcastSignal {
    pub fn new(valid_from: usize, values: SignalBuffer) -> Self {
        Self { valid_from, values }
    }

    /// Declared length of the signal.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Copies a circular window of `source` into a new buffer of `requested_len` slots.
///
/// The output satisfies `out.get(k) == source.get(start_tick + k)` for every
/// `k < requested_len`: the tail of `source` from the current slot comes
/// first, followed by whole copies of `source` and a final partial copy
/// from its start.
///
/// # Errors
///
/// Returns [`SignalError::ZeroLength`] if `requested_len == 0`.
///
/// # Examples
///
/// ```
/// use tariff_sim::signal::{SignalBuffer, assemble};
///
/// let source = SignalBuffer::from_values(vec![1.0, 2.0, 3.0]).unwrap();
/// let out = assemble(&source, 4, 5).unwrap();
/// assert_eq!(out.as_slice(), &[2.0, 3.0, 1.0, 2.0, 3.0]);
/// ```
pub fn assemble(
    source: &SignalBuffer,
    start_tick: usize,
    requested_len: usize,
) -> Result<SignalBuffer, SignalError> {
    if requested_len == 0 {
        return Err(SignalError::ZeroLength);
    }

    let src = source.as_slice();
    let len = src.len();
    let start_idx = start_tick % len;
    let mut out = Vec::with_capacity(requested_len);

    // 1. Remainder of the current cycle
    let head = (len - start_idx).min(requested_len);
    out.extend_from_slice(&src[start_idx..start_idx + head]);

    // 2. Whole copies
    let full_copies = (requested_len - 1) / len;
    for _ in 0..full_copies {
        let take = (requested_len - out.len()).min(len);
        if take == 0 {
            break;
        }
        out.extend_from_slice(&src[..take]);
    }

    // 3. Tail from the start of the source
    let remaining = requested_len - out.len();
    out.extend_from_slice(&src[..remaining]);

    SignalBuffer::from_values(out)
}
