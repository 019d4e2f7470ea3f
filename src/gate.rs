//! Pre-flight checks that turn unsupported features into skips
use reqwest::StatusCode;

use crate::discovery::RequestTemplate;
use crate::executor::MapRequestExecutor;
use crate::matrix::Capability;
use crate::report::Skip;

/// A declared class satisfies a requirement when it equals it or ends with it.
/// Matching is case-sensitive.
pub fn conforms_to(declared: &[String], required: &str) -> bool {
    declared
        .iter()
        .any(|class| class == required || class.ends_with(required))
}

pub fn require_conformance(declared: &[String], required: &[String]) -> Result<(), Skip> {
    let missing: Vec<&str> = required
        .iter()
        .filter(|r| !conforms_to(declared, r))
        .map(String::as_str)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Skip(format!(
            "Conformance class not declared: {}",
            missing.join(", ")
        )))
    }
}

/// Probes optional parameters with short timeouts.
#[derive(Debug, Clone)]
pub struct CapabilitySkipGate {
    prober: MapRequestExecutor,
}

impl CapabilitySkipGate {
    pub fn new(prober: MapRequestExecutor) -> Self {
        Self { prober }
    }

    /// `false` when the server answers 400 or 501, or the probe itself fails.
    pub async fn probe_parameter_supported(&self, template: &RequestTemplate, name: &str, value: &str) -> bool {
        let url = template.url_with(&[(name, value.to_string())]);
        match self.prober.execute(&url).await {
            Ok(response) if matches!(response.status, StatusCode::BAD_REQUEST | StatusCode::NOT_IMPLEMENTED) => {
                tracing::warn!(param = name, status = response.status.as_u16(), "Parameter not supported");
                false
            }
            Ok(response) => {
                tracing::debug!(param = name, status = response.status.as_u16(), "Parameter accepted");
                true
            }
            Err(e) => {
                tracing::warn!(param = name, error = %e, "Probe failed, assuming unsupported");
                false
            }
        }
    }

    pub async fn probe(&self, template: &RequestTemplate, capability: Capability) -> bool {
        self.probe_parameter_supported(template, capability.param_name(), capability.probe_value())
            .await
    }

    /// Like [`probe`](Self::probe), but as a skip.
    pub async fn require(&self, template: &RequestTemplate, capability: Capability) -> Result<(), Skip> {
        if self.probe(template, capability).await {
            Ok(())
        } else {
            Err(Skip(format!(
                "Server does not support the {} parameter",
                capability.param_name()
            )))
        }
    }
}
