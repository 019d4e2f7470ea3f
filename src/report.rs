//! Tagged test outcomes and the suite report
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{FailureCause, SuiteError};

/// A test (or part of one) does not apply to the server under test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skip(pub String);

impl Skip {
    pub fn new(reason: impl Into<String>) -> Self {
        Skip(reason.into())
    }
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub cause: FailureCause,
    pub message: String,
}

impl Failure {
    pub fn new(cause: FailureCause, message: impl Into<String>) -> Self {
        Self {
            cause,
            message: message.into(),
        }
    }

    pub fn assertion(message: impl Into<String>) -> Self {
        Self::new(FailureCause::Assertion, message)
    }
}

impl From<SuiteError> for Failure {
    fn from(err: SuiteError) -> Self {
        Self::new(err.cause(), err.to_string())
    }
}

/// Early exit from a test body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Halt {
    Skip(Skip),
    Fail(Failure),
}

impl From<Skip> for Halt {
    fn from(skip: Skip) -> Self {
        Halt::Skip(skip)
    }
}

impl From<Failure> for Halt {
    fn from(failure: Failure) -> Self {
        Halt::Fail(failure)
    }
}

impl From<SuiteError> for Halt {
    fn from(err: SuiteError) -> Self {
        Halt::Fail(err.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CaseStatus {
    Passed,
    Skipped { reason: String },
    Failed { cause: FailureCause, reason: String },
}

/// Result of one request variant, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseRecord {
    pub label: String,
    pub query: String,
    pub url: Option<String>,
    #[serde(flatten)]
    pub status: CaseStatus,
}

impl fmt::Display for CaseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match &self.status {
            CaseStatus::Passed => "PASS".to_string(),
            CaseStatus::Skipped { reason } => format!("SKIP ({})", reason),
            CaseStatus::Failed { reason, .. } => format!("FAIL ({})", reason),
        };
        write!(f, "{} [{}]: {}", self.label, self.query, status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TestOutcome {
    Passed,
    Failed { cause: FailureCause, reason: String },
    Skipped { reason: String },
}

impl TestOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, TestOutcome::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TestOutcome::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, TestOutcome::Skipped { .. })
    }
}

impl From<Result<(), Halt>> for TestOutcome {
    fn from(result: Result<(), Halt>) -> Self {
        match result {
            Ok(()) => TestOutcome::Passed,
            Err(Halt::Skip(Skip(reason))) => TestOutcome::Skipped { reason },
            Err(Halt::Fail(Failure { cause, message })) => TestOutcome::Failed {
                cause,
                reason: message,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TestReport {
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub outcome: TestOutcome,
    pub cases: Vec<CaseRecord>,
}

impl TestReport {
    /// The record of the case that failed the test, if any.
    pub fn failed_case(&self) -> Option<&CaseRecord> {
        self.cases
            .iter()
            .find(|c| matches!(c.status, CaseStatus::Failed { .. }))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub iut: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub tests: Vec<TestReport>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.tests.iter().filter(|t| t.outcome.is_passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.tests.iter().filter(|t| t.outcome.is_failed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.tests.iter().filter(|t| t.outcome.is_skipped()).count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    pub fn test(&self, id: &str) -> Option<&TestReport> {
        self.tests.iter().find(|t| t.id == id)
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "OGC API Maps background suite against {}", self.iut)?;
        writeln!(
            f,
            "Started {}, finished {}",
            self.started_at.to_rfc3339(),
            self.finished_at.to_rfc3339()
        )?;

        for test in &self.tests {
            writeln!(f)?;
            match &test.outcome {
                TestOutcome::Passed => writeln!(f, "PASS {} - {}", test.id, test.title)?,
                TestOutcome::Skipped { reason } => {
                    writeln!(f, "SKIP {} - {}", test.id, test.title)?;
                    writeln!(f, "     {}", reason)?;
                }
                TestOutcome::Failed { cause, reason } => {
                    writeln!(f, "FAIL {} - {}", test.id, test.title)?;
                    writeln!(f, "     [{:?}] {}", cause, reason)?;
                }
            }
            for case in &test.cases {
                writeln!(f, "       {}", case)?;
            }
        }

        writeln!(f)?;
        write!(
            f,
            "{} passed, {} failed, {} skipped",
            self.passed(),
            self.failed(),
            self.skipped()
        )
    }
}
