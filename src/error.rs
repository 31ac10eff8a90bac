//! Error types shared by the signal, agent, and market layers.

use thiserror::Error;

use crate::agents::AgentId;

/// Market result type.
pub type Result<T> = std::result::Result<T, MarketError>;

/// Misuse of a [`SignalBuffer`](crate::signal::SignalBuffer).
///
/// Both variants are programmer errors: they are never transient and are not retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignalError {
    #[error("signal buffer length must be > 0")]
    ZeroLength,

    #[error("signal buffer read before it was initialized")]
    Uninitialized,
}

/// Errors that abort a market tick.
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("aggregator {aggregator} is linked to {target}, a {kind} without the prosumer capability")]
    RelationshipTypeMismatch {
        aggregator: AgentId,
        target: AgentId,
        kind: &'static str,
    },

    #[error("agent {0} is not registered")]
    UnknownAgent(AgentId),

    #[error(transparent)]
    Signal(#[from] SignalError),
}
