//! Single leg light-time solver
use std::sync::Arc;

use log::debug;

use crate::{
    cfg::ConvergenceCriteria,
    constants::SPEED_OF_LIGHT_M_S,
    correction::{total_correction_s, FunctionCorrection, LightTimeCorrection},
    error::Error,
    prelude::{Duration, Epoch, StateProvider, Vector3, Vector6},
};

/// Ordered correction list attached to one leg.
pub type Corrections = Vec<Box<dyn LightTimeCorrection + Send + Sync>>;

/// Warm start for one leg: boundary [Epoch]s of a previous (or adjacent)
/// solution. Link end states are re-evaluated from the providers at
/// these [Epoch]s, so only the times are carried over.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LegBoundaryGuess {
    /// Transmission [Epoch]
    pub tx_epoch: Epoch,
    /// Reception [Epoch]
    pub rx_epoch: Epoch,
}

/// Complete result of one single-leg solve attempt. All diagnostics are
/// carried here rather than on the solver, which therefore stays
/// immutable and shareable across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct LegSolution {
    /// Solved light time [s], corrections included
    pub light_time_s: f64,
    /// Euclidean distance divided by the speed of light [s]
    pub ideal_light_time_s: f64,
    /// Summed corrections [s]
    pub correction_s: f64,
    /// Transmission [Epoch]
    pub tx_epoch: Epoch,
    /// Reception [Epoch]
    pub rx_epoch: Epoch,
    /// Transmitter state at transmission [Epoch]
    pub tx_state: Vector6<f64>,
    /// Receiver state at reception [Epoch]
    pub rx_state: Vector6<f64>,
    /// Iterations performed until acceptance
    pub iterations: usize,
}

impl LegSolution {
    /// Solved light time as [Duration].
    pub fn light_time(&self) -> Duration {
        Duration::from_seconds(self.light_time_s)
    }

    /// Vector from transmitter (at transmission [Epoch]) to receiver
    /// (at reception [Epoch]), in meters.
    pub fn range_vector_m(&self) -> Vector3<f64> {
        (self.rx_state.fixed_rows::<3>(0) - self.tx_state.fixed_rows::<3>(0)).into()
    }

    /// Boundary [Epoch]s of this solution, to warm start a later attempt.
    pub fn boundary_guess(&self) -> LegBoundaryGuess {
        LegBoundaryGuess {
            tx_epoch: self.tx_epoch,
            rx_epoch: self.rx_epoch,
        }
    }
}

/// [LightTimeSolver] solves the light time between two link ends
/// (one signal leg), self consistently with the motion of both ends
/// during signal propagation and with the attached
/// [LightTimeCorrection]s.
pub struct LightTimeSolver {
    /// [ConvergenceCriteria] parametrization
    pub criteria: ConvergenceCriteria,
    /// Transmitting link end
    tx: Arc<dyn StateProvider + Send + Sync>,
    /// Receiving link end
    rx: Arc<dyn StateProvider + Send + Sync>,
    /// Summed [LightTimeCorrection]s
    corrections: Corrections,
}

impl LightTimeSolver {
    /// Builds a new [LightTimeSolver] for one leg.
    /// ## Input
    /// - tx: transmitting link end [StateProvider]
    /// - rx: receiving link end [StateProvider]
    /// - corrections: propagation delay [Corrections], summed on evaluation
    /// - criteria: [ConvergenceCriteria] parametrization
    pub fn new(
        tx: Arc<dyn StateProvider + Send + Sync>,
        rx: Arc<dyn StateProvider + Send + Sync>,
        corrections: Corrections,
        criteria: ConvergenceCriteria,
    ) -> Self {
        Self {
            tx,
            rx,
            corrections,
            criteria,
        }
    }

    /// Builds a new [LightTimeSolver] with corrections expressed as
    /// plain functions of link end states and [Epoch]s, each wrapped
    /// into a [FunctionCorrection].
    pub fn from_functions<F>(
        tx: Arc<dyn StateProvider + Send + Sync>,
        rx: Arc<dyn StateProvider + Send + Sync>,
        functions: Vec<F>,
        criteria: ConvergenceCriteria,
    ) -> Self
    where
        F: Fn(&Vector6<f64>, &Vector6<f64>, Epoch, Epoch) -> f64 + Send + Sync + 'static,
    {
        let corrections = functions
            .into_iter()
            .map(|func| {
                Box::new(FunctionCorrection::new(func)) as Box<dyn LightTimeCorrection + Send + Sync>
            })
            .collect();

        Self::new(tx, rx, corrections, criteria)
    }

    /// Attached [LightTimeCorrection]s.
    pub fn corrections(&self) -> &[Box<dyn LightTimeCorrection + Send + Sync>] {
        &self.corrections
    }

    /// Solves this leg from a zero light-time seed.
    /// ## Input
    /// - reference: anchoring [Epoch]
    /// - reference_at_reception: true if the reference [Epoch] is the
    ///   reception time, false if it is the transmission time
    pub fn solve(
        &self,
        reference: Epoch,
        reference_at_reception: bool,
    ) -> Result<LegSolution, Error> {
        self.solve_with_guess(reference, reference_at_reception, None)
    }

    /// Solves this leg, warm started from a [LegBoundaryGuess] when one
    /// is provided (typically when chaining legs along a signal path),
    /// from a zero light-time seed otherwise.
    pub fn solve_with_guess(
        &self,
        reference: Epoch,
        reference_at_reception: bool,
        guess: Option<&LegBoundaryGuess>,
    ) -> Result<LegSolution, Error> {
        let (mut tx_epoch, mut rx_epoch) = match guess {
            Some(guess) => (guess.tx_epoch, guess.rx_epoch),
            None => (reference, reference),
        };

        let mut tx_state = self.tx.state_at(tx_epoch);
        let mut rx_state = self.rx.state_at(rx_epoch);

        // corrections at the seed, then first estimate
        let mut correction_s =
            total_correction_s(&self.corrections, &tx_state, &rx_state, tx_epoch, rx_epoch);

        let mut ideal_s = ideal_light_time_s(&tx_state, &rx_state);
        let mut previous_s = ideal_s + correction_s;

        let mut iterations = 0;
        let mut converged = false;
        let mut update_corrections = self.criteria.iterate_corrections;

        while !converged {
            if update_corrections {
                correction_s = total_correction_s(
                    &self.corrections,
                    &tx_state,
                    &rx_state,
                    tx_epoch,
                    rx_epoch,
                );
            }

            // move the non anchored end by the previous light-time estimate
            if reference_at_reception {
                rx_epoch = reference;
                tx_epoch = reference - Duration::from_seconds(previous_s);
                tx_state = self.tx.state_at(tx_epoch);
            } else {
                tx_epoch = reference;
                rx_epoch = reference + Duration::from_seconds(previous_s);
                rx_state = self.rx.state_at(rx_epoch);
            }

            ideal_s = ideal_light_time_s(&tx_state, &rx_state);
            let new_s = ideal_s + correction_s;

            converged = self.criteria.is_converged(
                previous_s,
                new_s,
                iterations,
                correction_s,
                reference,
                &mut update_corrections,
            )?;

            previous_s = new_s;
            iterations += 1;
        }

        debug!(
            "{} - light time: {:.12E} s ({} iterations)",
            reference, previous_s, iterations
        );

        Ok(LegSolution {
            light_time_s: previous_s,
            ideal_light_time_s: ideal_s,
            correction_s,
            tx_epoch,
            rx_epoch,
            tx_state,
            rx_state,
            iterations,
        })
    }

    /// Light time only, when boundary states are of no interest.
    pub fn light_time(
        &self,
        reference: Epoch,
        reference_at_reception: bool,
    ) -> Result<f64, Error> {
        let solution = self.solve(reference, reference_at_reception)?;
        Ok(solution.light_time_s)
    }

    /// "Measured" vector from transmitter at transmission time to
    /// receiver at reception time, in meters.
    pub fn range_vector(
        &self,
        reference: Epoch,
        reference_at_reception: bool,
    ) -> Result<Vector3<f64>, Error> {
        let solution = self.solve(reference, reference_at_reception)?;
        Ok(solution.range_vector_m())
    }

    /// Closed form partial derivative of the light time with respect to
    /// the position of one link end, at fixed boundary states and
    /// [Epoch]s (typically those of a converged [LegSolution]).
    /// The summed correction is re-evaluated at the provided states
    /// before forming the sensitivity.
    /// ## Input
    /// - tx_state: transmitter state at transmission [Epoch]
    /// - rx_state: receiver state at reception [Epoch]
    /// - tx_epoch: transmission [Epoch]
    /// - rx_epoch: reception [Epoch]
    /// - wrt_receiver: partial with respect to receiver position (true)
    ///   or transmitter position (false)
    pub fn partial_wrt_link_end_position(
        &self,
        tx_state: &Vector6<f64>,
        rx_state: &Vector6<f64>,
        tx_epoch: Epoch,
        rx_epoch: Epoch,
        wrt_receiver: bool,
    ) -> Vector3<f64> {
        let correction_s =
            total_correction_s(&self.corrections, tx_state, rx_state, tx_epoch, rx_epoch);

        let relative_position: Vector3<f64> =
            (rx_state.fixed_rows::<3>(0) - tx_state.fixed_rows::<3>(0)).into();

        let sign = if wrt_receiver { 1.0 } else { -1.0 };

        relative_position.normalize() * (1.0 + correction_s / relative_position.norm()) * sign
    }
}

/// Euclidean light time: distance over the speed of light, from the
/// position components only.
fn ideal_light_time_s(tx_state: &Vector6<f64>, rx_state: &Vector6<f64>) -> f64 {
    (rx_state.fixed_rows::<3>(0) - tx_state.fixed_rows::<3>(0)).norm() / SPEED_OF_LIGHT_M_S
}
