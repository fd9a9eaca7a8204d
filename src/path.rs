//! Multi leg signal path solver
use std::sync::Arc;

use itertools::Itertools;
use log::debug;

use crate::{
    ancillary::AncillarySettings,
    cfg::ConvergenceCriteria,
    error::Error,
    prelude::{Duration, Epoch, StateProvider, Vector6},
    solver::{LegSolution, LightTimeSolver},
};

/// Complete result of one multi-leg solve attempt.
/// Interior link ends appear twice in the flattened arrays, once as a
/// leg's receiver and once as the next leg's transmitter; both slots
/// agree by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSolution {
    /// Total light time over the path [s], per link-end retransmission
    /// delays included
    pub total_light_time_s: f64,
    /// Per leg [LegSolution]s, ordered from outermost transmitter
    /// (leg 0) to outermost receiver
    pub legs: Vec<LegSolution>,
    /// Flattened link end [Epoch]s: leg i occupies slots 2i
    /// (transmission) and 2i+1 (reception)
    pub link_end_epochs: Vec<Epoch>,
    /// Flattened link end states, same layout as [Self::link_end_epochs]
    pub link_end_states: Vec<Vector6<f64>>,
}

impl PathSolution {
    /// Total light time as [Duration].
    pub fn total_light_time(&self) -> Duration {
        Duration::from_seconds(self.total_light_time_s)
    }

    /// Summed Euclidean light times over all legs [s], corrections and
    /// retransmission delays excluded.
    pub fn total_ideal_light_time_s(&self) -> f64 {
        self.legs.iter().map(|leg| leg.ideal_light_time_s).sum()
    }

    /// Summed corrections over all legs [s].
    pub fn total_correction_s(&self) -> f64 {
        self.legs.iter().map(|leg| leg.correction_s).sum()
    }
}

/// [MultiLegLightTimeSolver] chains one [LightTimeSolver] per leg to
/// solve an entire signal path (for example ground station → spacecraft
/// → ground station), anchored at one reference link end. Epochs and
/// states are propagated leg by leg away from the reference link end in
/// both directions, each solved leg providing the boundary condition of
/// the next.
pub struct MultiLegLightTimeSolver {
    /// One [LightTimeSolver] per leg, ordered from outermost
    /// transmitter to outermost receiver
    legs: Vec<LightTimeSolver>,
}

impl MultiLegLightTimeSolver {
    /// Builds a new [MultiLegLightTimeSolver] from one [LightTimeSolver]
    /// per leg, ordered from outermost transmitter to outermost receiver.
    /// Adjacent solvers must share their interior link end provider.
    pub fn new(legs: Vec<LightTimeSolver>) -> Result<Self, Error> {
        if legs.is_empty() {
            return Err(Error::EmptyPath);
        }
        Ok(Self { legs })
    }

    /// Builds a new [MultiLegLightTimeSolver] over these link ends,
    /// without any propagation delay correction. Each adjacent provider
    /// pair forms one leg, sharing the interior link ends.
    /// Use [Self::new] when per-leg corrections are needed.
    pub fn from_link_ends(
        link_ends: &[Arc<dyn StateProvider + Send + Sync>],
        criteria: ConvergenceCriteria,
    ) -> Result<Self, Error> {
        let legs = link_ends
            .iter()
            .cloned()
            .tuple_windows()
            .map(|(tx, rx)| LightTimeSolver::new(tx, rx, vec![], criteria))
            .collect();

        Self::new(legs)
    }

    /// Number of legs along this path.
    pub fn number_of_legs(&self) -> usize {
        self.legs.len()
    }

    /// Number of link ends along this path (legs + 1).
    pub fn number_of_link_ends(&self) -> usize {
        self.legs.len() + 1
    }

    /// Per leg [LightTimeSolver]s.
    pub fn legs(&self) -> &[LightTimeSolver] {
        &self.legs
    }

    /// Solves light time over the entire path.
    /// ## Input
    /// - reference: anchoring [Epoch]
    /// - reference_link_end: index of the link end the reference [Epoch]
    ///   is tied to, 0 (outermost transmitter) to number of legs
    ///   (outermost receiver)
    /// - ancillary: possible [AncillarySettings], carrying the
    ///   retransmission delay vector
    pub fn solve(
        &self,
        reference: Epoch,
        reference_link_end: usize,
        ancillary: Option<&AncillarySettings>,
    ) -> Result<PathSolution, Error> {
        let number_of_legs = self.legs.len();
        let link_ends = number_of_legs + 1;

        if reference_link_end >= link_ends {
            return Err(Error::InvalidReferenceLinkEnd {
                index: reference_link_end,
                link_ends,
            });
        }

        let delays_s = self.retransmission_delays(ancillary)?;

        // A delay at an interior reference link end cannot be split
        // between its reception and transmission sides.
        if reference_link_end != 0
            && reference_link_end != link_ends - 1
            && delays_s[reference_link_end] != 0.0
        {
            return Err(Error::AmbiguousReferenceDelay {
                index: reference_link_end,
            });
        }

        let mut total_light_time_s = delays_s[reference_link_end];

        // Walk from the reference link end down to the outermost
        // transmitter, anchored at reception times.
        let mut lower_legs = Vec::with_capacity(reference_link_end);
        let mut current_reception = reference - Duration::from_seconds(delays_s[reference_link_end]);

        for leg_index in (0..reference_link_end).rev() {
            let solution = self.legs[leg_index].solve(current_reception, true)?;

            let leg_light_time_s = solution.light_time_s + delays_s[leg_index];
            current_reception -= Duration::from_seconds(leg_light_time_s);
            total_light_time_s += leg_light_time_s;

            lower_legs.push(solution);
        }

        // back to transmitter → receiver ordering
        lower_legs.reverse();

        // Walk from the reference link end up to the outermost
        // receiver, anchored at transmission times.
        let mut upper_legs = Vec::with_capacity(number_of_legs - reference_link_end);
        let mut current_transmission =
            reference + Duration::from_seconds(delays_s[reference_link_end]);

        for leg_index in reference_link_end..number_of_legs {
            let solution = self.legs[leg_index].solve(current_transmission, false)?;

            let leg_light_time_s = solution.light_time_s + delays_s[leg_index + 1];
            current_transmission += Duration::from_seconds(leg_light_time_s);
            total_light_time_s += leg_light_time_s;

            upper_legs.push(solution);
        }

        let legs: Vec<LegSolution> = lower_legs.into_iter().chain(upper_legs).collect();

        let link_end_epochs = legs
            .iter()
            .flat_map(|leg| [leg.tx_epoch, leg.rx_epoch])
            .collect();

        let link_end_states = legs
            .iter()
            .flat_map(|leg| [leg.tx_state, leg.rx_state])
            .collect();

        debug!(
            "{} - path light time: {:.12E} s over {} legs",
            reference, total_light_time_s, number_of_legs,
        );

        Ok(PathSolution {
            total_light_time_s,
            legs,
            link_end_epochs,
            link_end_states,
        })
    }

    /// Resolves the retransmission delay vector to one value per link
    /// end, before any leg is solved.
    fn retransmission_delays(
        &self,
        ancillary: Option<&AncillarySettings>,
    ) -> Result<Vec<f64>, Error> {
        let link_ends = self.number_of_link_ends();

        match ancillary.and_then(|settings| settings.retransmission_delays()) {
            None => Ok(vec![0.0; link_ends]),
            Some(delays_s) => {
                if delays_s.len() == link_ends {
                    Ok(delays_s.to_vec())
                } else if delays_s.len() == link_ends - 2 {
                    // interior link ends only: outermost ends default to zero
                    let mut padded = Vec::with_capacity(link_ends);
                    padded.push(0.0);
                    padded.extend_from_slice(delays_s);
                    padded.push(0.0);
                    Ok(padded)
                } else {
                    Err(Error::InvalidRetransmissionDelays {
                        found: delays_s.len(),
                        link_ends,
                    })
                }
            },
        }
    }
}
