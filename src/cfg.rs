//! Convergence criteria and failure policies
use log::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{error::Error, prelude::Epoch};

const fn default_max_iterations() -> usize {
    50
}

const fn default_iterate_corrections() -> bool {
    false
}

const fn default_tolerance() -> Option<f64> {
    None
}

/// Tightest tolerance meaningful for f64 light times anchored to
/// nanosecond resolution [Epoch](crate::prelude::Epoch)s.
pub(crate) const DEFAULT_TOLERANCE_S: f64 = 1.0E-12;

/// Behavior when the iteration count reaches
/// [ConvergenceCriteria::max_iterations] without satisfying the tolerance.
#[derive(Default, Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FailureHandling {
    /// Return the last estimate as if it had converged.
    /// The caller gets no indication that the tolerance was not met.
    #[default]
    AcceptSilently,
    /// Log a warning carrying the residual, then accept the last
    /// estimate and terminate.
    WarnAndAccept,
    /// Abort the solve attempt with [Error::Divergence].
    Fail,
}

/// [ConvergenceCriteria] parametrizes the light-time fixed-point
/// iteration: tolerance, iteration limit, correction update strategy and
/// failure policy. Build once, share across solvers; read-only afterwards.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConvergenceCriteria {
    /// Recompute the summed correction on every iteration.
    /// When left off (default), corrections are evaluated once up front
    /// and refreshed a single time when the light time first meets the
    /// tolerance, to verify they are stable too.
    #[cfg_attr(
        feature = "serde",
        serde(default = "default_iterate_corrections")
    )]
    pub iterate_corrections: bool,
    /// Iteration limit, at which the failure policy applies.
    #[cfg_attr(feature = "serde", serde(default = "default_max_iterations"))]
    pub max_iterations: usize,
    /// Accepted difference between two subsequent light-time estimates,
    /// in seconds. None (default) selects the tightest tolerance the
    /// numeric types support.
    #[cfg_attr(feature = "serde", serde(default = "default_tolerance"))]
    pub tolerance_s: Option<f64>,
    /// Policy applied when the iteration limit is reached.
    #[cfg_attr(feature = "serde", serde(default))]
    pub failure: FailureHandling,
}

impl Default for ConvergenceCriteria {
    fn default() -> Self {
        Self {
            iterate_corrections: default_iterate_corrections(),
            max_iterations: default_max_iterations(),
            tolerance_s: default_tolerance(),
            failure: FailureHandling::default(),
        }
    }
}

impl ConvergenceCriteria {
    /// Copies and returns [ConvergenceCriteria] with updated tolerance, in seconds.
    pub fn with_tolerance_s(mut self, tolerance_s: f64) -> Self {
        self.tolerance_s = Some(tolerance_s);
        self
    }

    /// Copies and returns [ConvergenceCriteria] with updated iteration limit.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Copies and returns [ConvergenceCriteria] with corrections
    /// recomputed on every iteration.
    pub fn with_iterated_corrections(mut self) -> Self {
        self.iterate_corrections = true;
        self
    }

    /// Copies and returns [ConvergenceCriteria] with updated [FailureHandling].
    pub fn with_failure_handling(mut self, failure: FailureHandling) -> Self {
        self.failure = failure;
        self
    }

    /// Effective tolerance, in seconds.
    pub fn tolerance_s(&self) -> f64 {
        self.tolerance_s.unwrap_or(DEFAULT_TOLERANCE_S)
    }

    /// Convergence test for one iteration of the light-time solution.
    /// ## Input
    /// - previous_s: light-time estimate of the previous iteration [s]
    /// - new_s: light-time estimate of this iteration [s]
    /// - iterations: iterations performed so far
    /// - correction_s: currently summed correction [s]
    /// - reference: anchoring [Epoch] (diagnostics only)
    /// - update_corrections: whether corrections are being refreshed on
    ///   every pass. May be flipped on here: when the light time first
    ///   meets the tolerance with stale corrections, one extra pass is
    ///   forced to confirm the corrections are stable as well.
    pub(crate) fn is_converged(
        &self,
        previous_s: f64,
        new_s: f64,
        iterations: usize,
        correction_s: f64,
        reference: Epoch,
        update_corrections: &mut bool,
    ) -> Result<bool, Error> {
        let residual_s = (new_s - previous_s).abs();

        if residual_s < self.tolerance_s() {
            if !*update_corrections {
                *update_corrections = true;
                Ok(false)
            } else {
                Ok(true)
            }
        } else if iterations == self.max_iterations {
            // unconverged: low accuracy state providers, too stringent
            // tolerance, or a pathological correction model
            match self.failure {
                FailureHandling::AcceptSilently => Ok(true),
                FailureHandling::WarnAndAccept => {
                    warn!(
                        "light time unconverged at level {:.3E} s (correction {:.3E} s, reference {}), accepting last estimate",
                        residual_s, correction_s, reference,
                    );
                    Ok(true)
                },
                FailureHandling::Fail => Err(Error::Divergence {
                    residual_s,
                    correction_s,
                    reference,
                }),
            }
        } else {
            Ok(false)
        }
    }
}
