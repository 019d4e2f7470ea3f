//! Background conformance class tests
use crate::matrix::Capability;
use crate::report::{CaseRecord, Halt};

use super::Suite;

impl Suite {
    pub(super) async fn bgcolor_definition(&self, records: &mut Vec<CaseRecord>) -> Result<(), Halt> {
        let templates = self.discover_templates().await?;
        self.require_background_conformance().await?;

        let style = self.resolve_style(&templates.resource.collection_id).await;
        match &style {
            Some(s) if s.background.is_some() => {
                tracing::info!(style_id = %s.id, background = ?s.background, "Checking style background priority")
            }
            _ => tracing::info!("No style background, checking default white"),
        }

        let cases = self.generator.bgcolor_definition(style);
        self.run_cases(&templates, &cases, records).await
    }

    pub(super) async fn transparent_definition(&self, records: &mut Vec<CaseRecord>) -> Result<(), Halt> {
        let templates = self.discover_templates().await?;
        self.require_background_conformance().await?;

        let cases = self.generator.transparent_definition();
        self.run_cases(&templates, &cases, records).await
    }

    pub(super) async fn void_color_definition(&self, records: &mut Vec<CaseRecord>) -> Result<(), Halt> {
        let templates = self.discover_templates().await?;
        self.require_background_conformance().await?;

        let cases = self.generator.void_color_definition();
        self.run_cases(&templates, &cases, records).await
    }

    pub(super) async fn void_transparent_definition(&self, records: &mut Vec<CaseRecord>) -> Result<(), Halt> {
        let templates = self.discover_templates().await?;
        self.require_background_conformance().await?;
        self.gate.require(&templates.void, Capability::VoidTransparent).await?;

        let cases = self.generator.void_transparent_definition();
        self.run_cases(&templates, &cases, records).await
    }

    /// The full transparent x bgcolor matrix, then the void cases the server
    /// supports.
    pub(super) async fn background_map_success(&self, records: &mut Vec<CaseRecord>) -> Result<(), Halt> {
        let templates = self.discover_templates().await?;
        self.require_background_conformance().await?;

        let mut cases = self.generator.background_matrix();
        cases.extend(self.generator.background_void_cases());
        self.run_cases(&templates, &cases, records).await
    }
}
