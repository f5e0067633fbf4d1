//! Configuration module for the bending force computation.
//!
//! Numerical policy (sine floor, execution mode) and the per-type bending
//! moduli.

mod parameters;

pub use parameters::{BendingModuli, ExecutionMode, HelfrichConfig, DEFAULT_SINE_FLOOR};
