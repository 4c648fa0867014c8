//! Built-in review strategies.
//!
//! Each strategy differs only in identity, scheduling hints, focus text and
//! the category taxonomy it reports in.

use crate::task::CapabilityTier;

use super::ReviewStrategy;

pub const SECURITY_TASK: &str = "security";
pub const BREAKING_CHANGES_TASK: &str = "breaking-changes";
pub const TEST_COVERAGE_TASK: &str = "test-coverage";
pub const PERFORMANCE_TASK: &str = "performance";
pub const QUALITY_TASK: &str = "quality";

#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityStrategy;

impl ReviewStrategy for SecurityStrategy {
    fn name(&self) -> &str {
        SECURITY_TASK
    }

    fn execution_priority(&self) -> i32 {
        0
    }

    fn capability_tier(&self) -> CapabilityTier {
        CapabilityTier::Deep
    }

    fn focus(&self) -> &str {
        "You are a security reviewer. Look for injection flaws, unsafe handling of \
         untrusted input, authentication and authorization gaps, leaked secrets and \
         insecure cryptography introduced by this change. Rate exploitable issues \
         as critical."
    }

    fn categories(&self) -> &[&'static str] {
        &[
            "sql-injection",
            "injection",
            "xss",
            "authentication",
            "authorization",
            "secrets",
            "crypto",
            "input-validation",
            "security",
        ]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BreakingChangeStrategy;

impl ReviewStrategy for BreakingChangeStrategy {
    fn name(&self) -> &str {
        BREAKING_CHANGES_TASK
    }

    fn execution_priority(&self) -> i32 {
        1
    }

    fn capability_tier(&self) -> CapabilityTier {
        CapabilityTier::Balanced
    }

    fn focus(&self) -> &str {
        "You review public interfaces. Report removed or renamed exports, changed \
         signatures, altered wire or storage formats and behavior changes that \
         existing callers would observe."
    }

    fn categories(&self) -> &[&'static str] {
        &["api-change", "breaking-change", "compatibility", "migration"]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TestCoverageStrategy;

impl ReviewStrategy for TestCoverageStrategy {
    fn name(&self) -> &str {
        TEST_COVERAGE_TASK
    }

    fn execution_priority(&self) -> i32 {
        2
    }

    fn capability_tier(&self) -> CapabilityTier {
        CapabilityTier::Fast
    }

    fn focus(&self) -> &str {
        "You review test coverage. Report new or changed behavior that lacks tests, \
         tests that no longer exercise what they claim and missing edge cases."
    }

    fn categories(&self) -> &[&'static str] {
        &["testing", "coverage", "edge-case"]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceStrategy;

impl ReviewStrategy for PerformanceStrategy {
    fn name(&self) -> &str {
        PERFORMANCE_TASK
    }

    fn execution_priority(&self) -> i32 {
        3
    }

    fn capability_tier(&self) -> CapabilityTier {
        CapabilityTier::Balanced
    }

    fn focus(&self) -> &str {
        "You review performance. Report accidental quadratic work, redundant I/O or \
         queries inside loops, unbounded allocations and blocking calls on async paths."
    }

    fn categories(&self) -> &[&'static str] {
        &["performance", "memory", "concurrency", "io"]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QualityStrategy;

impl ReviewStrategy for QualityStrategy {
    fn name(&self) -> &str {
        QUALITY_TASK
    }

    fn execution_priority(&self) -> i32 {
        4
    }

    fn capability_tier(&self) -> CapabilityTier {
        CapabilityTier::Fast
    }

    fn focus(&self) -> &str {
        "You review code quality. Report logic errors, unhandled failure paths, \
         dead code and naming or structure that will mislead maintainers."
    }

    fn categories(&self) -> &[&'static str] {
        &["bug", "error-handling", "maintainability", "style", "quality"]
    }
}
