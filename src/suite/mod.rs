//! Abstract tests and the per-test run sequence
//!
//! Every background test walks the same states: discover a map resource,
//! check the declared conformance classes, probe optional parameters, then
//! execute its cases one after another. The first failing case fails the test;
//! earlier case records are kept in the report.

mod background;
mod maps_core;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::color::{ColorResolver, parse_css_color};
use crate::config::Config;
use crate::discovery::{MapResource, RequestTemplate, ResourceDiscovery};
use crate::error::{SuiteError, SuiteResult};
use crate::evaluate::{OutcomeEvaluator, Verdict};
use crate::executor::MapRequestExecutor;
use crate::gate::{CapabilitySkipGate, require_conformance};
use crate::inspect::MapImage;
use crate::matrix::{Capability, Extent, ParameterCase, ParameterMatrixGenerator, StyleParam};
use crate::policy::DefaultPolicyResolver;
use crate::report::{CaseRecord, CaseStatus, Failure, Halt, Skip, SuiteReport, TestOutcome, TestReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbstractTest {
    MapOperation,
    ConformanceSuccess,
    BgcolorDefinition,
    TransparentDefinition,
    VoidColorDefinition,
    VoidTransparentDefinition,
    BackgroundMapSuccess,
}

impl AbstractTest {
    pub const ALL: [AbstractTest; 7] = [
        AbstractTest::MapOperation,
        AbstractTest::ConformanceSuccess,
        AbstractTest::BgcolorDefinition,
        AbstractTest::TransparentDefinition,
        AbstractTest::VoidColorDefinition,
        AbstractTest::VoidTransparentDefinition,
        AbstractTest::BackgroundMapSuccess,
    ];

    pub fn id(self) -> &'static str {
        match self {
            AbstractTest::MapOperation => "/conf/core/map-op",
            AbstractTest::ConformanceSuccess => "/conf/core/conformance-success",
            AbstractTest::BgcolorDefinition => "/conf/background/bgcolor-definition",
            AbstractTest::TransparentDefinition => "/conf/background/transparent-definition",
            AbstractTest::VoidColorDefinition => "/conf/background/void-color-definition",
            AbstractTest::VoidTransparentDefinition => "/conf/background/void-transparent-definition",
            AbstractTest::BackgroundMapSuccess => "/conf/background/map-success",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            AbstractTest::MapOperation => "Map retrieval operation",
            AbstractTest::ConformanceSuccess => "Maps core conformance declared",
            AbstractTest::BgcolorDefinition => "bgcolor parameter definition",
            AbstractTest::TransparentDefinition => "transparent parameter definition",
            AbstractTest::VoidColorDefinition => "void-color parameter definition",
            AbstractTest::VoidTransparentDefinition => "void-transparent parameter definition",
            AbstractTest::BackgroundMapSuccess => "Background parameters on map responses",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id() == id)
    }
}

impl fmt::Display for AbstractTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Request templates derived from one discovered map resource
#[derive(Debug, Clone)]
pub struct MapTemplates {
    pub resource: MapResource,
    pub valid: RequestTemplate,
    pub void: RequestTemplate,
}

impl MapTemplates {
    pub fn for_extent(&self, extent: Extent) -> &RequestTemplate {
        match extent {
            Extent::Valid => &self.valid,
            Extent::Void => &self.void,
        }
    }
}

/// Run CPU-bound work off the runtime, giving up after `deadline`.
///
/// The blocking thread is not cancelled; its result is discarded.
async fn blocking_with_deadline<T, F>(url: &str, deadline: Duration, work: F) -> SuiteResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    match tokio::time::timeout(deadline, tokio::task::spawn_blocking(work)).await {
        Ok(joined) => Ok(joined?),
        Err(_) => {
            tracing::warn!(url, ?deadline, "Decoding exceeded the read timeout");
            Err(SuiteError::Timeout { url: url.to_string() })
        }
    }
}

pub struct Suite {
    config: Arc<Config>,
    discovery: ResourceDiscovery,
    executor: MapRequestExecutor,
    gate: CapabilitySkipGate,
    policy: DefaultPolicyResolver,
    evaluator: OutcomeEvaluator,
    generator: ParameterMatrixGenerator,
}

impl Suite {
    pub fn new(config: Arc<Config>) -> SuiteResult<Self> {
        let iut = config.require_iut()?;
        let format = config.map.format.clone();

        let discovery = ResourceDiscovery::new(iut, config.timeouts.discovery())?;
        let executor = MapRequestExecutor::new(config.timeouts.map(), format.clone())?;
        let gate = CapabilitySkipGate::new(MapRequestExecutor::new(config.timeouts.precheck(), format)?);

        Ok(Self {
            policy: DefaultPolicyResolver::new(ColorResolver::default()),
            generator: ParameterMatrixGenerator::new(config.map.sample_inset),
            evaluator: OutcomeEvaluator::new(),
            discovery,
            executor,
            gate,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn run(&self) -> SuiteReport {
        self.run_tests(&AbstractTest::ALL).await
    }

    pub async fn run_tests(&self, tests: &[AbstractTest]) -> SuiteReport {
        let started_at = Utc::now();
        tracing::info!(iut = %self.discovery.root(), tests = tests.len(), "Starting suite");

        let mut reports = Vec::with_capacity(tests.len());
        for test in tests {
            reports.push(self.run_test(*test).await);
        }

        let report = SuiteReport {
            iut: self.discovery.root().to_string(),
            started_at,
            finished_at: Utc::now(),
            tests: reports,
        };
        tracing::info!(
            passed = report.passed(),
            failed = report.failed(),
            skipped = report.skipped(),
            "Suite finished"
        );
        report
    }

    pub async fn run_test(&self, test: AbstractTest) -> TestReport {
        tracing::info!(test = test.id(), "Running {}", test.title());

        let mut cases = Vec::new();
        let result = match test {
            AbstractTest::MapOperation => self.map_operation(&mut cases).await,
            AbstractTest::ConformanceSuccess => self.conformance_success().await,
            AbstractTest::BgcolorDefinition => self.bgcolor_definition(&mut cases).await,
            AbstractTest::TransparentDefinition => self.transparent_definition(&mut cases).await,
            AbstractTest::VoidColorDefinition => self.void_color_definition(&mut cases).await,
            AbstractTest::VoidTransparentDefinition => self.void_transparent_definition(&mut cases).await,
            AbstractTest::BackgroundMapSuccess => self.background_map_success(&mut cases).await,
        };

        let outcome = TestOutcome::from(result);
        match &outcome {
            TestOutcome::Passed => tracing::info!(test = test.id(), "Passed"),
            TestOutcome::Skipped { reason } => tracing::warn!(test = test.id(), %reason, "Skipped"),
            TestOutcome::Failed { cause, reason } => {
                tracing::error!(test = test.id(), ?cause, %reason, "Failed")
            }
        }

        TestReport {
            id: test.id().to_string(),
            title: test.title().to_string(),
            outcome,
            cases,
        }
    }

    /// First collection exposing a map link, with its valid and void templates.
    pub async fn discover_templates(&self) -> Result<MapTemplates, Halt> {
        let resource = self
            .discovery
            .first_map_resource()
            .await?
            .ok_or_else(|| Skip::new("No map resources found in the collections"))?;

        tracing::info!(collection_id = %resource.collection_id, href = %resource.href, "Using map resource");

        let map = &self.config.map;
        let template = |bbox: &str| {
            RequestTemplate::new(resource.href.clone(), map.format.clone(), bbox, map.width, map.height)
        };

        Ok(MapTemplates {
            valid: template(&map.valid_bbox),
            void: template(&map.void_bbox),
            resource,
        })
    }

    pub async fn require_background_conformance(&self) -> Result<(), Halt> {
        let declared = self
            .discovery
            .conformance_classes()
            .await?
            .ok_or_else(|| Skip::new("No 'conformsTo' list found at /conformance"))?;

        require_conformance(&declared, &self.config.required_classes)?;
        Ok(())
    }

    /// Execute one case and compare the sampled pixels with its expected outcome.
    pub async fn evaluate_case(&self, template: &RequestTemplate, case: &ParameterCase) -> Result<(), Failure> {
        let expected = self.policy.expected(case).map_err(SuiteError::from)?;
        let url = template.url_with(&case.query_pairs());

        let response = self.executor.execute(&url).await?;
        response.ensure_ok()?;

        let body = response.body.clone();
        let image = blocking_with_deadline(url.as_str(), self.config.timeouts.map().read, move || {
            MapImage::decode(&body)
        })
        .await?
        .map_err(|source| SuiteError::Decode {
            url: url.to_string(),
            source,
        })?;

        let samples = image.sample(case.sampling);
        tracing::debug!(case = %case.label, samples = ?samples, expected = ?expected, "Sampled");

        match self.evaluator.evaluate(&case.checks, &expected, &samples) {
            Verdict::Pass => Ok(()),
            Verdict::Fail(reason) => Err(Failure::assertion(reason)),
        }
    }

    /// Run cases in order. Cases needing an unsupported parameter are recorded
    /// as skipped; the first failing case stops the run.
    pub async fn run_cases(
        &self,
        templates: &MapTemplates,
        cases: &[ParameterCase],
        records: &mut Vec<CaseRecord>,
    ) -> Result<(), Halt> {
        let mut supported: HashMap<Capability, bool> = HashMap::new();

        for case in cases {
            let template = templates.for_extent(case.extent);
            let query = case.query_string();

            let mut unsupported = None;
            for capability in &case.requires {
                let ok = match supported.get(capability) {
                    Some(ok) => *ok,
                    None => {
                        let ok = self.gate.probe(template, *capability).await;
                        tracing::info!(param = capability.param_name(), supported = ok, "Pre-check");
                        supported.insert(*capability, ok);
                        ok
                    }
                };
                if !ok {
                    unsupported = Some(*capability);
                    break;
                }
            }

            if let Some(capability) = unsupported {
                records.push(CaseRecord {
                    label: case.label.clone(),
                    query,
                    url: None,
                    status: CaseStatus::Skipped {
                        reason: format!("{} not supported", capability.param_name()),
                    },
                });
                continue;
            }

            let url = template.url_with(&case.query_pairs());
            tracing::info!(case = %case.label, %query, "Executing case");

            match self.evaluate_case(template, case).await {
                Ok(()) => records.push(CaseRecord {
                    label: case.label.clone(),
                    query,
                    url: Some(url.to_string()),
                    status: CaseStatus::Passed,
                }),
                Err(failure) => {
                    let passed = records
                        .iter()
                        .filter(|r| r.status == CaseStatus::Passed)
                        .count();
                    let message = format!(
                        "Case '{}' [{}] failed: {} (GET {}; {} earlier case(s) passed)",
                        case.label, query, failure.message, url, passed
                    );
                    records.push(CaseRecord {
                        label: case.label.clone(),
                        query,
                        url: Some(url.to_string()),
                        status: CaseStatus::Failed {
                            cause: failure.cause,
                            reason: failure.message,
                        },
                    });
                    return Err(Failure::new(failure.cause, message).into());
                }
            }
        }

        Ok(())
    }

    /// Style for the style-priority case. A configured id wins over discovery;
    /// a background that is not a CSS color is dropped.
    pub async fn resolve_style(&self, collection_id: &str) -> Option<StyleParam> {
        let style = &self.config.style;
        let id = match &style.id {
            Some(id) => id.clone(),
            None if style.auto_discover => self.discovery.first_style_id(collection_id).await?,
            None => return None,
        };

        let background = match &style.background {
            Some(bg) if style.id.is_some() => Some(bg.clone()),
            _ => self.discovery.style_background(collection_id, &id).await,
        };

        // Style documents use CSS color syntax; pass it on as `#RRGGBB`.
        let background = background.and_then(|bg| match parse_css_color(&bg) {
            Ok(rgb) => Some(rgb.to_string()),
            Err(e) => {
                tracing::warn!(style_id = %id, background = %bg, error = %e, "Ignoring style background");
                None
            }
        });

        Some(StyleParam { id, background })
    }
}
