//! Blocking HTTP client for an EVOK-style gateway.
use std::time::Duration;

use ferment_traits::{BoxError, Gateway, TempPoint};

use crate::error::Result;
use crate::wire::{self, Flavor};

pub struct HttpGateway {
    agent: ureq::Agent,
    base_url: String,
    flavor: Flavor,
}

impl HttpGateway {
    /// `base_url` is the JSON root, e.g. `http://192.168.2.77:8080/json`.
    pub fn new(base_url: impl Into<String>, timeout: Duration, flavor: Flavor) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            flavor,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, kind: &str, circuit: &str) -> String {
        format!("{}/{kind}/{circuit}", self.base_url)
    }

    fn get(&self, url: &str) -> Result<String> {
        let resp = self
            .agent
            .get(url)
            .set("Accept", "application/json")
            .call()?;
        Ok(resp.into_string()?)
    }
}

impl Gateway for HttpGateway {
    fn temperature(&self, circuit: &str) -> std::result::Result<TempPoint, BoxError> {
        let body = self.get(&self.url(self.flavor.path(), circuit))?;
        let point = wire::parse_temp(self.flavor, &body)?;
        tracing::trace!(circuit, value = ?point.value, valid = point.valid, "temperature");
        Ok(point)
    }

    fn digital_input(&self, circuit: &str) -> std::result::Result<bool, BoxError> {
        let body = self.get(&self.url("di", circuit))?;
        Ok(wire::parse_level(&body)?)
    }

    fn relay(&self, circuit: &str) -> std::result::Result<bool, BoxError> {
        let body = self.get(&self.url("ro", circuit))?;
        Ok(wire::parse_level(&body)?)
    }

    fn set_relay(&self, circuit: &str, on: bool) -> std::result::Result<(), BoxError> {
        let url = self.url("ro", circuit);
        self.agent
            .post(&url)
            .set("Accept", "application/json")
            .send_json(wire::relay_body(on))
            .map_err(crate::error::GatewayError::from)?;
        tracing::debug!(circuit, on, "relay written");
        Ok(())
    }
}
