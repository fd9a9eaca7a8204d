use thiserror::Error;

use crate::prelude::Epoch;

#[derive(Debug, PartialEq, Error)]
pub enum Error {
    /// The fixed-point iteration did not satisfy the convergence
    /// tolerance within the allowed number of iterations, and the
    /// [FailureHandling::Fail](crate::prelude::FailureHandling) policy
    /// is active. Carries the last residual (difference between the two
    /// most recent light-time estimates, in seconds), the summed
    /// correction at that point, and the anchoring [Epoch].
    /// A caller may retry with a looser tolerance; we never retry internally.
    #[error("light time unconverged at level {residual_s} s (correction {correction_s} s, reference {reference})")]
    Divergence {
        residual_s: f64,
        correction_s: f64,
        reference: Epoch,
    },

    /// A retransmission delay vector must either cover every link end,
    /// or only the interior link ends (outermost transmitter and receiver
    /// then default to zero). Any other length is a setup error and the
    /// solve attempt is aborted before any leg is processed.
    #[error("invalid retransmission delays: found {found} for {link_ends} link ends")]
    InvalidRetransmissionDelays { found: usize, link_ends: usize },

    /// A non-zero retransmission delay at an interior reference link end
    /// is ambiguous: it cannot be split between the reception side and
    /// the transmission side of that node. Not supported.
    #[error("ambiguous non-zero retransmission delay at interior reference link end {index}")]
    AmbiguousReferenceDelay { index: usize },

    /// The reference link end index must designate one of the
    /// `number_of_legs + 1` ends of the path.
    #[error("reference link end {index} out of range ({link_ends} link ends)")]
    InvalidReferenceLinkEnd { index: usize, link_ends: usize },

    /// A signal path needs at least one leg.
    #[error("signal path without any leg")]
    EmptyPath,
}
