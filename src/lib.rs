#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

// private modules
mod ancillary;
mod cfg;
mod correction;
mod error;
mod path;
mod provider;
mod solver;

pub mod constants;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::ancillary::{AncillaryKey, AncillarySettings};
    pub use crate::cfg::{ConvergenceCriteria, FailureHandling};
    pub use crate::constants::SPEED_OF_LIGHT_M_S;
    pub use crate::correction::{
        ConstantCorrection, FirstOrderRelativisticCorrection, FunctionCorrection,
        LightTimeCorrection,
    };
    pub use crate::error::Error;
    pub use crate::path::{MultiLegLightTimeSolver, PathSolution};
    pub use crate::provider::StateProvider;
    pub use crate::solver::{Corrections, LegBoundaryGuess, LegSolution, LightTimeSolver};
    // re-export
    pub use hifitime::{Duration, Epoch, TimeScale};
    pub use nalgebra::{Vector3, Vector6};
}

// pub export
pub use error::Error;
