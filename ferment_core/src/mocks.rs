//! Test and helper mocks for ferment_core

use ferment_traits::{BoxError, Gateway, TempPoint};

/// A gateway that fails every request; every client call degrades to its sentinel.
pub struct OfflineGateway;

fn offline(circuit: &str) -> BoxError {
    Box::new(std::io::Error::other(format!(
        "gateway unreachable (circuit {circuit})"
    )))
}

impl Gateway for OfflineGateway {
    fn temperature(&self, circuit: &str) -> Result<TempPoint, BoxError> {
        Err(offline(circuit))
    }

    fn digital_input(&self, circuit: &str) -> Result<bool, BoxError> {
        Err(offline(circuit))
    }

    fn relay(&self, circuit: &str) -> Result<bool, BoxError> {
        Err(offline(circuit))
    }

    fn set_relay(&self, circuit: &str, _on: bool) -> Result<(), BoxError> {
        Err(offline(circuit))
    }
}
