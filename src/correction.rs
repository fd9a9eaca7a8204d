//! Propagation delay corrections
use crate::{
    constants::SPEED_OF_LIGHT_M_S,
    prelude::{Epoch, Vector6},
};

/// [LightTimeCorrection] models one contribution causing the signal
/// delay to deviate from the Euclidean value: troposphere, relativistic
/// bending, instrumental biases.. Apply one of the proposed models or
/// your own equations. All corrections attached to a leg are summed,
/// their order has no impact.
pub trait LightTimeCorrection {
    /// Signed delay contribution, in seconds of light time.
    /// ## Input
    /// - tx_state: transmitter state at transmission [Epoch]
    /// - rx_state: receiver state at reception [Epoch]
    /// - t_tx: transmission [Epoch]
    /// - t_rx: reception [Epoch]
    fn delay_s(
        &self,
        tx_state: &Vector6<f64>,
        rx_state: &Vector6<f64>,
        t_tx: Epoch,
        t_rx: Epoch,
    ) -> f64;
}

/// Adapter wrapping a custom correction equation into a
/// [LightTimeCorrection].
pub struct FunctionCorrection {
    func: Box<dyn Fn(&Vector6<f64>, &Vector6<f64>, Epoch, Epoch) -> f64 + Send + Sync>,
}

impl FunctionCorrection {
    /// Wraps a custom correction equation, expressed as a function of
    /// both link end states and both [Epoch]s, returning seconds of delay.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Vector6<f64>, &Vector6<f64>, Epoch, Epoch) -> f64 + Send + Sync + 'static,
    {
        Self {
            func: Box::new(func),
        }
    }
}

impl LightTimeCorrection for FunctionCorrection {
    fn delay_s(
        &self,
        tx_state: &Vector6<f64>,
        rx_state: &Vector6<f64>,
        t_tx: Epoch,
        t_rx: Epoch,
    ) -> f64 {
        (self.func)(tx_state, rx_state, t_tx, t_rx)
    }
}

/// Fixed signed delay, independent of geometry and time.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ConstantCorrection {
    /// Delay [s]
    pub delay_s: f64,
}

impl ConstantCorrection {
    pub fn new(delay_s: f64) -> Self {
        Self { delay_s }
    }
}

impl LightTimeCorrection for ConstantCorrection {
    fn delay_s(&self, _: &Vector6<f64>, _: &Vector6<f64>, _: Epoch, _: Epoch) -> f64 {
        self.delay_s
    }
}

/// First order relativistic (Shapiro) delay due to the gravitational
/// field of a central body located at the frame origin:
/// (1+γ) μ/c³ ln((r_tx + r_rx + r) / (r_tx + r_rx - r)).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FirstOrderRelativisticCorrection {
    /// Gravitational parameter of the perturbing body (m³ s⁻²)
    pub mu_m3_s2: f64,
    /// PPN γ, 1.0 in general relativity
    pub gamma: f64,
}

impl FirstOrderRelativisticCorrection {
    /// Shapiro delay for the perturbing body of given gravitational
    /// parameter, with γ = 1 (general relativity).
    pub fn new(mu_m3_s2: f64) -> Self {
        Self {
            mu_m3_s2,
            gamma: 1.0,
        }
    }

    /// Copies and returns [Self] with updated PPN γ.
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }
}

impl LightTimeCorrection for FirstOrderRelativisticCorrection {
    fn delay_s(&self, tx_state: &Vector6<f64>, rx_state: &Vector6<f64>, _: Epoch, _: Epoch) -> f64 {
        let r_tx = tx_state.fixed_rows::<3>(0).norm();
        let r_rx = rx_state.fixed_rows::<3>(0).norm();
        let r = (rx_state.fixed_rows::<3>(0) - tx_state.fixed_rows::<3>(0)).norm();

        (1.0 + self.gamma) * self.mu_m3_s2 / SPEED_OF_LIGHT_M_S.powi(3)
            * ((r_tx + r_rx + r) / (r_tx + r_rx - r)).ln()
    }
}

/// Sums all corrections at the provided states and [Epoch]s.
pub(crate) fn total_correction_s(
    corrections: &[Box<dyn LightTimeCorrection + Send + Sync>],
    tx_state: &Vector6<f64>,
    rx_state: &Vector6<f64>,
    t_tx: Epoch,
    t_rx: Epoch,
) -> f64 {
    corrections
        .iter()
        .map(|correction| correction.delay_s(tx_state, rx_state, t_tx, t_rx))
        .sum()
}
