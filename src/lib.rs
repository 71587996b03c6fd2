//! Share price prover library surface.
//!
//! Symbolic model of liquidity accrual with protocol fees, plus a Z3 harness that proves the
//! supply share price never decreases across an accrue followed by previews.

pub mod error;
pub mod protocols;
pub mod runtime;
pub mod solver;
pub mod symbolic;
pub mod utils;
