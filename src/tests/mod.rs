mod single_leg;

use std::sync::{Arc, Once};

use log::LevelFilter;

use crate::prelude::{Epoch, StateProvider, Vector3, Vector6};

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::builder()
            .is_test(true)
            .filter_level(LevelFilter::Debug)
            .init();
    });
}

/// Stationary link end
pub struct FixedPoint(pub Vector6<f64>);

impl StateProvider for FixedPoint {
    fn state_at(&self, _: Epoch) -> Vector6<f64> {
        self.0
    }
}

pub fn stationary(x_m: f64, y_m: f64, z_m: f64) -> Arc<dyn StateProvider + Send + Sync> {
    Arc::new(FixedPoint(Vector6::new(x_m, y_m, z_m, 0.0, 0.0, 0.0)))
}

/// Link end in uniform rectilinear motion
pub struct UniformMotion {
    pub reference: Epoch,
    pub position_m: Vector3<f64>,
    pub velocity_m_s: Vector3<f64>,
}

impl StateProvider for UniformMotion {
    fn state_at(&self, t: Epoch) -> Vector6<f64> {
        let dt_s = (t - self.reference).to_seconds();
        let position_m = self.position_m + self.velocity_m_s * dt_s;

        Vector6::new(
            position_m[0],
            position_m[1],
            position_m[2],
            self.velocity_m_s[0],
            self.velocity_m_s[1],
            self.velocity_m_s[2],
        )
    }
}
