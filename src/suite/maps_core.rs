//! Maps core conformance tests
use crate::config::MAPS_CORE_CLASS;
use crate::error::FailureCause;
use crate::gate::conforms_to;
use crate::report::{CaseRecord, CaseStatus, Failure, Halt, Skip};

use super::Suite;

impl Suite {
    /// Every collection with a map link answers with an image.
    pub(super) async fn map_operation(&self, records: &mut Vec<CaseRecord>) -> Result<(), Halt> {
        let resources = self.discovery.map_resources(self.config.collection_limit).await?;
        if resources.is_empty() {
            return Err(Skip::new("No collections expose a map link").into());
        }

        for resource in resources {
            let response = self.executor.execute(&resource.href).await?;
            let content_type = response.content_type().unwrap_or_default().to_string();

            if content_type.starts_with("image/") {
                records.push(CaseRecord {
                    label: resource.collection_id,
                    query: content_type,
                    url: Some(resource.href.to_string()),
                    status: CaseStatus::Passed,
                });
                continue;
            }

            let reason = format!(
                "Expected an image Content-Type, got '{}' (HTTP {})",
                content_type,
                response.status.as_u16()
            );
            records.push(CaseRecord {
                label: resource.collection_id.clone(),
                query: content_type,
                url: Some(resource.href.to_string()),
                status: CaseStatus::Failed {
                    cause: FailureCause::Assertion,
                    reason: reason.clone(),
                },
            });
            return Err(Failure::assertion(format!(
                "Collection '{}' at {}: {}",
                resource.collection_id, resource.href, reason
            ))
            .into());
        }

        Ok(())
    }

    pub(super) async fn conformance_success(&self) -> Result<(), Halt> {
        let declared = self
            .discovery
            .conformance_classes()
            .await?
            .ok_or_else(|| Failure::assertion("'conformsTo' is missing from /conformance"))?;

        if conforms_to(&declared, MAPS_CORE_CLASS) {
            Ok(())
        } else {
            tracing::info!(declared = ?declared, "Declared conformance classes");
            Err(Failure::assertion(format!("Conformance class '{}' is not declared", MAPS_CORE_CLASS)).into())
        }
    }
}
