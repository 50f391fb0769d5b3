//! Integer-programming seed for the population initializer.
//!
//! The whale optimizer seeds one population slot from a MILP relaxation of
//! the wave selection problem. The solver behind that seed is an injectable
//! capability with a single operation, so tests can stub it and builds
//! without a MILP backend still work: with the `milp` feature enabled the
//! real CBC-backed implementation is compiled, otherwise a stub that always
//! reports "no seed" takes its place.

use crate::instance::WaveInstance;
use crate::solution::Wave;

/// Per-aisle penalty in the seed objective, discouraging gratuitous aisles
/// without affecting which orders are worth picking.
pub const AISLE_EPSILON: f64 = 1e-3;

/// A solver capable of producing a seed wave within a millisecond budget.
///
/// Implementations return [`Wave::empty`] on timeout or infeasibility; the
/// driver treats an empty seed as an all-zero individual.
pub trait IlpSolver {
    fn solve(&self, instance: &WaveInstance, budget_ms: u64) -> Wave;
}

// When built with the `milp` feature, expose the CBC implementation
#[cfg(feature = "milp")]
mod cbc;
#[cfg(feature = "milp")]
pub use cbc::CbcSolver;

// Otherwise provide a lightweight stub so the rest of the codebase can compile
#[cfg(not(feature = "milp"))]
mod cbc_stub {
    use super::IlpSolver;
    use crate::instance::WaveInstance;
    use crate::solution::Wave;

    /// Stand-in seed solver used when the `milp` feature is disabled.
    /// Always reports "no seed found".
    #[derive(Debug, Default)]
    pub struct CbcSolver;

    impl CbcSolver {
        pub fn new() -> Self {
            CbcSolver
        }
    }

    impl IlpSolver for CbcSolver {
        fn solve(&self, _instance: &WaveInstance, _budget_ms: u64) -> Wave {
            Wave::empty()
        }
    }
}

#[cfg(not(feature = "milp"))]
pub use cbc_stub::CbcSolver;

/// The default seed solver for this build.
pub fn default_ilp() -> Box<dyn IlpSolver> {
    Box::new(CbcSolver::new())
}
