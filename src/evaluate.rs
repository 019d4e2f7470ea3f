//! Comparison of sampled pixels against expected outcomes
//!
//! A check passes when at least one sampled point matches. RGB and alpha are
//! matched independently, so they may be satisfied by different points; this
//! tolerates corners that carry data or anti-aliased edges.

use crate::inspect::SampledPixel;
use crate::matrix::{Channel, Check};
use crate::policy::ExpectedOutcome;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(String),
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OutcomeEvaluator;

impl OutcomeEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(
        &self,
        checks: &[Check],
        expected: &ExpectedOutcome,
        samples: &[SampledPixel],
    ) -> Verdict {
        if checks.is_empty() {
            return Verdict::Fail("case declares no checks".to_string());
        }
        if samples.is_empty() {
            return Verdict::Fail("no sample points inside the image".to_string());
        }

        let mut failures = Vec::new();
        for check in checks {
            let (matched, wanted) = match check.channel {
                Channel::Rgb => {
                    if !expected.rgb_asserted(check.region) {
                        tracing::debug!(%check, "Skipping RGB check for fully transparent area");
                        continue;
                    }
                    let rgb = expected.rgb(check.region);
                    (samples.iter().any(|s| s.rgb == rgb), rgb.to_string())
                }
                Channel::Alpha => {
                    let alpha = expected.alpha(check.region);
                    (samples.iter().any(|s| s.alpha == alpha), alpha.to_string())
                }
            };

            if !matched {
                failures.push(format!(
                    "{} mismatch: expected {} at any sample point, sampled [{}]",
                    check,
                    wanted,
                    describe(samples)
                ));
            }
        }

        if failures.is_empty() {
            Verdict::Pass
        } else {
            Verdict::Fail(failures.join("; "))
        }
    }
}

fn describe(samples: &[SampledPixel]) -> String {
    samples
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
