//! File output for market runs.

pub mod export;
