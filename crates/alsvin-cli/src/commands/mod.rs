//! CLI command implementations.

pub mod common;
pub mod eval;
pub mod synth;
pub mod train;
