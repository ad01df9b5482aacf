//! YAML fixture parsing.

use std::path::Path;

use anyhow::{anyhow, Context, Result};

use super::types::{CallStep, Fixture, Step};
use crate::contracts::ContractName;

/// Parse a fixture from a YAML string.
pub fn parse_fixture(yaml: &str) -> Result<Fixture> {
    let fixture: Fixture = serde_yaml::from_str(yaml).context("Failed to parse fixture YAML")?;

    validate_fixture(&fixture)?;
    Ok(fixture)
}

/// Parse a fixture from a file path.
pub fn parse_fixture_file(path: &Path) -> Result<Fixture> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read fixture file: {}", path.display()))?;
    parse_fixture(&content)
        .with_context(|| format!("Invalid fixture file: {}", path.display()))
}

fn validate_fixture(fixture: &Fixture) -> Result<()> {
    if fixture.fixture.name.trim().is_empty() {
        return Err(anyhow!("Fixture name cannot be empty"));
    }
    if fixture.steps.is_empty() {
        return Err(anyhow!(
            "Fixture '{}' must define at least one step",
            fixture.fixture.name
        ));
    }
    for (index, step) in fixture.steps.iter().enumerate() {
        if let Step::Call(call) = step {
            validate_call_step(index + 1, call)?;
        }
    }
    Ok(())
}

fn validate_call_step(position: usize, step: &CallStep) -> Result<()> {
    let step_name = step.name.as_deref().unwrap_or("unnamed");

    // Unknown contracts are a legitimate expectation (404), so only reject
    // the obviously contradictory cases.
    if step.contract.trim().is_empty() {
        return Err(anyhow!(
            "Step {} '{}': contract cannot be empty",
            position,
            step_name
        ));
    }

    let expect = &step.expect;
    if expect.success == Some(true) && expect.error.is_some() {
        return Err(anyhow!(
            "Step {} '{}': expects success and error {} at once",
            position,
            step_name,
            expect.error.unwrap_or_default()
        ));
    }
    if !expect.expects_success() && expect.value.is_some() {
        return Err(anyhow!(
            "Step {} '{}': failing calls carry no value",
            position,
            step_name
        ));
    }

    if ContractName::parse(&step.contract).is_err() && expect.expects_success() {
        return Err(anyhow!(
            "Step {} '{}': unknown contract '{}' cannot succeed",
            position,
            step_name,
            step.contract
        ));
    }
    Ok(())
}
