//! Scenario fixtures
//!
//! Declarative YAML scenarios: authors specify the initial context, a
//! sequence of contract calls with expected outcomes, and the invariants to
//! verify. The runner resets an [`Environment`](crate::Environment), replays
//! the calls and reports every mismatch.
//!
//! ```yaml
//! fixture:
//!   name: "unverified_lender"
//! setup:
//!   sender: mallory
//! steps:
//!   - contract: loan-management
//!     call:
//!       operation: createLoan
//!       borrower: alice
//!       assetId: 1
//!       principalAmount: 100
//!       interestRate: 5
//!       termLength: 10
//!       totalPayments: 1
//!     expect:
//!       error: 401
//! invariants:
//!   - ledger_consistency: true
//! ```

pub mod invariants;
pub mod parser;
pub mod runner;
pub mod types;

pub use invariants::check_invariants;
pub use parser::{parse_fixture, parse_fixture_file};
pub use runner::{execute_fixture, run_fixture, run_fixture_file, value_matches};
pub use types::{
    CallStep, Expectation, Fixture, FixtureMeta, FixtureResult, FixtureSetup, Invariant, Step,
    StepResult,
};
