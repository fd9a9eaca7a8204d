use crate::prelude::{Epoch, Vector6};

/// Any link end (ground station, spacecraft, celestial body) is
/// represented by a [StateProvider]: a pure function of time returning
/// position and velocity. Implementations may be backed by ephemeris
/// interpolation, Keplerian propagation or a constant; the solver never
/// owns the backing data and will evaluate the provider repeatedly
/// within one solve attempt, so evaluation should be cheap.
pub trait StateProvider {
    /// Position (m, components 0..3) and velocity (m.s⁻¹, components 3..6)
    /// of this link end at requested [Epoch].
    /// Any error here directly reflects on the accuracy of the solution.
    fn state_at(&self, t: Epoch) -> Vector6<f64>;
}

impl<F: Fn(Epoch) -> Vector6<f64>> StateProvider for F {
    fn state_at(&self, t: Epoch) -> Vector6<f64> {
        self(t)
    }
}
