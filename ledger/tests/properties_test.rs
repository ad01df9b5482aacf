//! Property-based tests for the collateral ledger
//!
//! Properties tested:
//! - Asset and loan ids are sequential from 1 and never reused
//! - Principals never registered as lenders are reported unverified, never missing
//! - Payments never exceed the schedule and the final one closes the loan

use collateral_ledger::contracts::{LoanStatus, LoanTerms, NewAsset};
use collateral_ledger::{check_ledger, Call, Environment, Principal};
use proptest::prelude::*;
use serde_json::json;

const OWNER: &str = "owner";
const LENDER: &str = "lender";
const BORROWER: &str = "borrower";

fn asset(index: u64) -> NewAsset {
    NewAsset {
        name: format!("Machine {}", index),
        description: "Test machine".to_string(),
        serial_number: format!("SN-{}", index),
        manufacturer: "Acme".to_string(),
        manufacture_date: 2000 + index,
        value: 1_000 * (index + 1),
    }
}

fn with_lender() -> Environment {
    let mut env = Environment::new();
    env.set_contract_owner(OWNER);
    env.set_tx_sender(OWNER);
    let response = env.submit(Call::RegisterLender {
        lender: Principal::from(LENDER),
        name: "Lender".to_string(),
        license_id: "LIC".to_string(),
    });
    assert!(response.success);
    env
}

// Property 1: ids are sequential and failures consume none
proptest! {
    #[test]
    fn test_ids_sequential(ops in prop::collection::vec((any::<bool>(), 0u64..6, 0u64..4), 1..30)) {
        let mut env = with_lender();
        let mut assets = 0u64;
        let mut loans = 0u64;

        for (is_loan, asset_id, total_payments) in ops {
            if is_loan {
                env.set_tx_sender(LENDER);
                let response = env.submit(Call::CreateLoan(LoanTerms {
                    borrower: Principal::from(BORROWER),
                    asset_id,
                    principal_amount: 100,
                    interest_rate: 1,
                    term_length: 10,
                    total_payments,
                }));
                let valid = (1..=assets).contains(&asset_id) && total_payments > 0;
                prop_assert_eq!(response.success, valid);
                if valid {
                    loans += 1;
                    prop_assert_eq!(response.value, Some(json!(loans)));
                }
            } else {
                env.set_tx_sender(BORROWER);
                let response = env.submit(Call::RegisterAsset(asset(assets)));
                assets += 1;
                prop_assert_eq!(response.value, Some(json!(assets)));
            }
        }

        prop_assert_eq!(env.storage().vars().last_asset_id, assets);
        prop_assert_eq!(env.storage().vars().last_loan_id, loans);
        let ids: Vec<u64> = env.storage().maps().loans.keys().copied().collect();
        prop_assert_eq!(ids, (1..=loans).collect::<Vec<_>>());
    }
}

// Property 2: unknown principals are unverified, not missing
proptest! {
    #[test]
    fn test_unregistered_principal_unverified(name in "[A-Z0-9]{1,40}") {
        prop_assume!(name != LENDER);
        let mut env = with_lender();
        let response = env.submit(Call::IsVerifiedLender {
            lender: Principal::from(name.as_str()),
        });
        prop_assert!(response.success);
        prop_assert_eq!(response.value, Some(json!(false)));
    }
}

// Property 3: the payment schedule bounds repayment
proptest! {
    #[test]
    fn test_payment_schedule(total_payments in 1u64..12, attempts in 1u64..20) {
        let mut env = with_lender();
        env.set_tx_sender(BORROWER);
        prop_assert!(env.submit(Call::RegisterAsset(asset(0))).success);
        env.set_tx_sender(LENDER);
        let created = env
            .submit(Call::CreateLoan(LoanTerms {
                borrower: Principal::from(BORROWER),
                asset_id: 1,
                principal_amount: 1_200,
                interest_rate: 3,
                term_length: 365,
                total_payments,
            }))
            .success;
        prop_assert!(created);

        env.set_tx_sender(BORROWER);
        let loans = env.loan_management().unwrap();
        for attempt in 1..=attempts {
            env.advance_blocks(1);
            let result = env.transact(|storage, ctx| loans.make_payment(storage, ctx, 1, 100));
            prop_assert_eq!(result.is_ok(), attempt <= total_payments);
            prop_assert!(check_ledger(env.storage()).is_empty());
        }

        let loan = env.transact(|storage, _| loans.get_loan(storage, 1)).unwrap();
        prop_assert_eq!(loan.payments_made, attempts.min(total_payments));
        let closed = attempts >= total_payments;
        prop_assert_eq!(loan.status == LoanStatus::Closed, closed);
    }
}
