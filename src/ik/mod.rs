//! IK Chain Solver
//!
//! CCD over bounded joint chains. Chains are solved one after another on
//! the same evolving local pose, so later chains see earlier corrections.

pub mod ccd;

pub use ccd::{CcdSolver, IkOutcome};
