//! Ancillary solve settings
use std::collections::HashMap;

/// Well known keys of the [AncillarySettings] bag.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AncillaryKey {
    /// Per link-end retransmission (transponder turnaround) delays, in
    /// seconds. Either one value per link end, or one per interior link
    /// end only (outermost transmitter and receiver then default to zero).
    RetransmissionDelays,
}

/// [AncillarySettings] carry solve-specific extra parameters that are
/// not part of the state-provider or correction contracts, as a keyed
/// bag. Currently limited to floating point vectors.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct AncillarySettings {
    double_vectors: HashMap<AncillaryKey, Vec<f64>>,
}

impl AncillarySettings {
    /// Copies and returns [AncillarySettings] with this vector attached.
    pub fn with_double_vector(mut self, key: AncillaryKey, values: Vec<f64>) -> Self {
        self.double_vectors.insert(key, values);
        self
    }

    /// Vector attached under this key, if any.
    pub fn double_vector(&self, key: AncillaryKey) -> Option<&[f64]> {
        self.double_vectors.get(&key).map(|values| values.as_slice())
    }

    /// Copies and returns [AncillarySettings] with this retransmission
    /// delay vector (in seconds) attached.
    pub fn with_retransmission_delays(self, delays_s: Vec<f64>) -> Self {
        self.with_double_vector(AncillaryKey::RetransmissionDelays, delays_s)
    }

    /// Attached retransmission delay vector, if any.
    pub fn retransmission_delays(&self) -> Option<&[f64]> {
        self.double_vector(AncillaryKey::RetransmissionDelays)
    }
}
