//! Core types for scenario fixtures.
//!
//! A fixture names an initial context, a sequence of contract calls with
//! their expected outcomes, and the ledger invariants that must hold once
//! every step ran.

use serde::Deserialize;
use serde_json::Value;

use crate::dispatch::{Call, CallResponse};

/// Parsed fixture definition - the top-level YAML structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    /// Fixture metadata
    pub fixture: FixtureMeta,
    /// Initial transaction context
    #[serde(default)]
    pub setup: FixtureSetup,
    /// Steps to execute, in order
    pub steps: Vec<Step>,
    /// Invariants to verify after the last step
    #[serde(default)]
    pub invariants: Vec<Invariant>,
}

/// Fixture metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureMeta {
    /// Human-readable fixture name
    pub name: String,
    /// Description of what this fixture exercises
    pub description: Option<String>,
}

/// Context applied after the environment reset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureSetup {
    /// Privileged principal for owner-only operations
    pub contract_owner: Option<String>,
    /// Default acting principal
    pub sender: Option<String>,
    /// Starting block height
    pub block_height: Option<u64>,
}

/// A single step in the fixture sequence.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Step {
    /// Move the clock forward
    AdvanceBlocks {
        /// Number of blocks to advance
        advance_blocks: u64,
    },
    /// A contract call
    Call(Box<CallStep>),
}

/// A contract call with its expected outcome.
///
/// `sender`, `caller` and `block_height` override the fixture context for
/// this step only.
#[derive(Debug, Clone, Deserialize)]
pub struct CallStep {
    /// Human-readable step name
    pub name: Option<String>,
    /// Acting principal for this call
    pub sender: Option<String>,
    /// Contract impersonated as the issuer of this call
    pub caller: Option<String>,
    /// Block height for this call
    pub block_height: Option<u64>,
    /// Target contract name
    pub contract: String,
    /// Operation and arguments
    pub call: Call,
    /// Expected outcome, success when omitted
    #[serde(default)]
    pub expect: Expectation,
}

/// Expected outcome of a call step.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Expectation {
    /// Whether the call must succeed. Defaults to `true` unless `error` is set.
    pub success: Option<bool>,
    /// Expected failure code
    pub error: Option<u16>,
    /// Expected return value, matched as a subset of the actual value
    pub value: Option<Value>,
}

impl Expectation {
    /// Whether the call is expected to succeed
    pub fn expects_success(&self) -> bool {
        self.success.unwrap_or(self.error.is_none())
    }
}

/// Invariant definitions for fixture verification.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Invariant {
    /// Full ledger consistency check
    LedgerConsistency {
        /// Whether to run the ledger consistency check
        ledger_consistency: bool,
    },
}

/// Result of executing a single call step.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// 1-based position of the step in the fixture
    pub step: usize,
    /// Step name, if any
    pub name: Option<String>,
    /// Target contract
    pub contract: String,
    /// Operation name
    pub operation: &'static str,
    /// Outcome returned by the environment
    pub response: CallResponse,
}

impl StepResult {
    /// Label used in reports
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("step {} ({})", self.step, name),
            None => format!("step {} ({}.{})", self.step, self.contract, self.operation),
        }
    }
}

/// Result of a complete fixture execution.
#[derive(Debug, Clone)]
pub struct FixtureResult {
    /// Fixture name
    pub fixture_name: String,
    /// Whether the fixture passed
    pub success: bool,
    /// Per-step results
    pub step_results: Vec<StepResult>,
    /// Step expectation mismatches (if any)
    pub verification_errors: Vec<String>,
    /// Invariant errors (if any)
    pub invariant_errors: Vec<String>,
}

impl FixtureResult {
    /// Check if all verifications passed.
    pub fn all_passed(&self) -> bool {
        self.success && self.verification_errors.is_empty() && self.invariant_errors.is_empty()
    }

    /// Every failure message, step mismatches first
    pub fn errors(&self) -> impl Iterator<Item = &String> {
        self.verification_errors
            .iter()
            .chain(self.invariant_errors.iter())
    }
}
