//! Fixture execution engine.
//!
//! Runs a fixture in four phases: reset and setup, step execution,
//! expectation verification (per step), and invariant checking.

use std::path::Path;

use anyhow::Result;
use log::{debug, info};
use serde_json::Value;

use super::invariants::check_invariants;
use super::parser::{parse_fixture, parse_fixture_file};
use super::types::{CallStep, Expectation, Fixture, FixtureResult, Step, StepResult};
use crate::context::Principal;
use crate::dispatch::CallResponse;
use crate::environment::Environment;

/// Run a fixture from a YAML string on a fresh environment.
pub fn run_fixture(yaml: &str) -> Result<FixtureResult> {
    let fixture = parse_fixture(yaml)?;
    let mut env = Environment::new();
    Ok(execute_fixture(&fixture, &mut env))
}

/// Run a fixture from a file path on a fresh environment.
pub fn run_fixture_file(path: &Path) -> Result<FixtureResult> {
    let fixture = parse_fixture_file(path)?;
    let mut env = Environment::new();
    Ok(execute_fixture(&fixture, &mut env))
}

/// Execute a parsed fixture. The environment is reset first.
pub fn execute_fixture(fixture: &Fixture, env: &mut Environment) -> FixtureResult {
    let fixture_name = fixture.fixture.name.clone();
    info!("Running fixture '{}'", fixture_name);

    // Phase 1: Reset and apply setup
    env.reset();
    if let Some(owner) = &fixture.setup.contract_owner {
        env.set_contract_owner(owner.as_str());
    }
    if let Some(sender) = &fixture.setup.sender {
        env.set_tx_sender(sender.as_str());
    }
    if let Some(height) = fixture.setup.block_height {
        env.set_block_height(height);
    }

    // Phase 2 and 3: Execute steps, verifying each outcome
    let mut step_results = Vec::new();
    let mut verification_errors = Vec::new();
    for (index, step) in fixture.steps.iter().enumerate() {
        match step {
            Step::AdvanceBlocks { advance_blocks } => {
                let height = env.advance_blocks(*advance_blocks);
                debug!("Advanced {} blocks to height {}", advance_blocks, height);
            }
            Step::Call(call_step) => {
                let result = execute_call_step(env, index + 1, call_step);
                if let Err(e) = verify_step(&result, &call_step.expect) {
                    verification_errors.push(format!("{}: {}", result.label(), e));
                }
                step_results.push(result);
            }
        }
    }

    // Phase 4: Check invariants
    let invariant_errors = check_invariants(env.storage(), &fixture.invariants);

    let success = verification_errors.is_empty() && invariant_errors.is_empty();
    info!(
        "Fixture '{}' {} ({} calls)",
        fixture_name,
        if success { "passed" } else { "failed" },
        step_results.len()
    );
    FixtureResult {
        fixture_name,
        success,
        step_results,
        verification_errors,
        invariant_errors,
    }
}

fn execute_call_step(env: &mut Environment, position: usize, step: &CallStep) -> StepResult {
    let mut context = env.context().clone();
    if let Some(sender) = &step.sender {
        context.sender = Some(Principal::from(sender.as_str()));
    }
    if let Some(caller) = &step.caller {
        context.contract_caller = Some(caller.clone());
    }
    if let Some(height) = step.block_height {
        context.block_height = height;
    }
    let saved = env.replace_context(context);

    let operation = step.call.operation();
    let response = env.call(&step.contract, step.call.clone());
    debug!(
        "Step {}: {}.{} -> {:?}",
        position, step.contract, operation, response
    );

    env.replace_context(saved);
    StepResult {
        step: position,
        name: step.name.clone(),
        contract: step.contract.clone(),
        operation,
        response,
    }
}

/// Compare a call outcome against its expectation.
fn verify_step(result: &StepResult, expect: &Expectation) -> std::result::Result<(), String> {
    let response: &CallResponse = &result.response;

    let expected_success = expect.expects_success();
    if response.success != expected_success {
        return Err(match response.error {
            Some(code) => format!("expected success, got error {}", code),
            None => format!(
                "expected failure{}, got success",
                expect
                    .error
                    .map(|code| format!(" with {}", code))
                    .unwrap_or_default()
            ),
        });
    }

    if let Some(code) = expect.error {
        if response.error != Some(code) {
            return Err(format!(
                "expected error {}, got {:?}",
                code, response.error
            ));
        }
    }

    if let Some(expected) = &expect.value {
        let actual = response.value.as_ref().unwrap_or(&Value::Null);
        if !value_matches(actual, expected) {
            return Err(format!("expected value {}, got {}", expected, actual));
        }
    }
    Ok(())
}

/// Subset match: every field of `expected` must be present in `actual` and
/// match recursively. Arrays and scalars compare element by element.
pub fn value_matches(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Object(actual), Value::Object(expected)) => expected.iter().all(|(key, value)| {
            actual
                .get(key)
                .is_some_and(|actual| value_matches(actual, value))
        }),
        (Value::Array(actual), Value::Array(expected)) => {
            actual.len() == expected.len()
                && actual
                    .iter()
                    .zip(expected)
                    .all(|(actual, expected)| value_matches(actual, expected))
        }
        _ => actual == expected,
    }
}
