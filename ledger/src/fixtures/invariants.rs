//! Invariant checking for fixture testing.
//!
//! Maps the fixture's declared invariants onto the ledger checks and
//! renders every violation as a message.

use super::types::Invariant;
use crate::invariants::check_ledger;
use crate::storage::MemoryStorage;

/// Check all declared invariants against the final storage.
///
/// Returns a list of invariant violation messages. Empty list means all passed.
pub fn check_invariants(storage: &MemoryStorage, invariants: &[Invariant]) -> Vec<String> {
    let mut errors = Vec::new();

    for invariant in invariants {
        match invariant {
            Invariant::LedgerConsistency {
                ledger_consistency: true,
            } => {
                errors.extend(
                    check_ledger(storage)
                        .into_iter()
                        .map(|violation| format!("Ledger consistency: {}", violation)),
                );
            }
            // Disabled checks (value = false)
            Invariant::LedgerConsistency { .. } => {}
        }
    }

    errors
}
