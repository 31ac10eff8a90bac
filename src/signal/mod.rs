//! Time-indexed signals and their broadcast packaging.

/// Signal broadcast assembly.
pub mod broadcast;
pub mod buffer;

pub use broadcast::{BroadcastSignal, assemble};
pub use buffer::SignalBuffer;
