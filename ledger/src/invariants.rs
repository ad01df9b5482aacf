// Ledger-wide consistency checks
//
// Run against a storage snapshot after a sequence of calls. Every check is
// read-only and reports all violations it finds rather than stopping at the
// first one.

use thiserror::Error;

use crate::config::{FIRST_RECORD_NUMBER, FIRST_SEQUENTIAL_ID};
use crate::context::Principal;
use crate::contracts::{AssetId, AssetStatus, CollateralStatus, LoanId, LoanStatus};
use crate::storage::MemoryStorage;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("asset ids are not sequential: expected {expected:?}, found {found:?}")]
    AssetIdGap {
        expected: Vec<AssetId>,
        found: Vec<AssetId>,
    },

    #[error("loan ids are not sequential: expected {expected:?}, found {found:?}")]
    LoanIdGap {
        expected: Vec<LoanId>,
        found: Vec<LoanId>,
    },

    #[error("loan {loan_id}: {made} payments made out of {total}")]
    PaymentsExceedSchedule { loan_id: LoanId, made: u64, total: u64 },

    #[error("loan {loan_id}: payments {found:?} recorded, expected 1..={made}")]
    PaymentRecordMismatch {
        loan_id: LoanId,
        made: u64,
        found: Vec<u64>,
    },

    #[error("payment {payment_number} recorded for unknown loan {loan_id}")]
    OrphanPayment { loan_id: LoanId, payment_number: u64 },

    #[error("active loan {loan_id}: asset {asset_id} is missing")]
    MissingAsset { loan_id: LoanId, asset_id: AssetId },

    #[error("active loan {loan_id}: asset {asset_id} is not collateralized")]
    AssetNotCollateralized { loan_id: LoanId, asset_id: AssetId },

    #[error("active loan {loan_id}: asset {asset_id} owned by {owner:?}, borrower is {borrower}")]
    AssetNotWithBorrower {
        loan_id: LoanId,
        asset_id: AssetId,
        owner: Option<Principal>,
        borrower: Principal,
    },

    #[error("active loan {loan_id}: no active collateral for asset {asset_id}")]
    CollateralNotActive { loan_id: LoanId, asset_id: AssetId },

    #[error("active loan {loan_id}: collateral for asset {asset_id} points at loan {found}")]
    CollateralLoanMismatch {
        loan_id: LoanId,
        asset_id: AssetId,
        found: LoanId,
    },

    #[error("asset {asset_id}: inspection counter is {counter}, {recorded} inspections recorded")]
    InspectionCountMismatch {
        asset_id: AssetId,
        counter: u64,
        recorded: u64,
    },
}

/// Check every ledger invariant. An empty result means the ledger is consistent.
pub fn check_ledger(storage: &MemoryStorage) -> Vec<Violation> {
    let mut violations = Vec::new();
    check_sequential_ids(storage, &mut violations);
    check_payments(storage, &mut violations);
    check_active_loans(storage, &mut violations);
    check_inspection_counters(storage, &mut violations);
    violations
}

fn check_sequential_ids(storage: &MemoryStorage, violations: &mut Vec<Violation>) {
    let expected: Vec<AssetId> = (FIRST_SEQUENTIAL_ID..=storage.vars().last_asset_id).collect();
    let found: Vec<AssetId> = storage.maps().assets.keys().copied().collect();
    if expected != found {
        violations.push(Violation::AssetIdGap { expected, found });
    }

    let expected: Vec<LoanId> = (FIRST_SEQUENTIAL_ID..=storage.vars().last_loan_id).collect();
    let found: Vec<LoanId> = storage.maps().loans.keys().copied().collect();
    if expected != found {
        violations.push(Violation::LoanIdGap { expected, found });
    }
}

fn check_payments(storage: &MemoryStorage, violations: &mut Vec<Violation>) {
    let maps = storage.maps();

    for (&loan_id, loan) in &maps.loans {
        if loan.payments_made > loan.total_payments {
            violations.push(Violation::PaymentsExceedSchedule {
                loan_id,
                made: loan.payments_made,
                total: loan.total_payments,
            });
        }

        let found: Vec<u64> = maps
            .payments
            .range((loan_id, 0)..=(loan_id, u64::MAX))
            .map(|(&(_, number), _)| number)
            .collect();
        let expected: Vec<u64> = (FIRST_RECORD_NUMBER..=loan.payments_made).collect();
        if found != expected {
            violations.push(Violation::PaymentRecordMismatch {
                loan_id,
                made: loan.payments_made,
                found,
            });
        }
    }

    for &(loan_id, payment_number) in maps.payments.keys() {
        if !maps.loans.contains_key(&loan_id) {
            violations.push(Violation::OrphanPayment {
                loan_id,
                payment_number,
            });
        }
    }
}

fn check_active_loans(storage: &MemoryStorage, violations: &mut Vec<Violation>) {
    let maps = storage.maps();

    for (&loan_id, loan) in &maps.loans {
        if loan.status != LoanStatus::Active {
            continue;
        }
        let asset_id = loan.asset_id;

        match maps.assets.get(&asset_id) {
            None => violations.push(Violation::MissingAsset { loan_id, asset_id }),
            Some(asset) => {
                if asset.status != AssetStatus::Collateralized {
                    violations.push(Violation::AssetNotCollateralized { loan_id, asset_id });
                }
                if asset.owner.as_ref() != Some(&loan.borrower) {
                    violations.push(Violation::AssetNotWithBorrower {
                        loan_id,
                        asset_id,
                        owner: asset.owner.clone(),
                        borrower: loan.borrower.clone(),
                    });
                }
            }
        }

        match maps.collaterals.get(&asset_id) {
            Some(collateral) if collateral.status == CollateralStatus::Active => {
                if collateral.loan_id != loan_id {
                    violations.push(Violation::CollateralLoanMismatch {
                        loan_id,
                        asset_id,
                        found: collateral.loan_id,
                    });
                }
            }
            _ => violations.push(Violation::CollateralNotActive { loan_id, asset_id }),
        }
    }
}

fn check_inspection_counters(storage: &MemoryStorage, violations: &mut Vec<Violation>) {
    let maps = storage.maps();

    for (&asset_id, &counter) in &maps.asset_inspection_count {
        let recorded = maps
            .inspections
            .range((asset_id, 0)..=(asset_id, u64::MAX))
            .count() as u64;
        if counter != recorded {
            violations.push(Violation::InspectionCountMismatch {
                asset_id,
                counter,
                recorded,
            });
        }
    }

    // Inspections without any counter
    let mut uncounted: Vec<AssetId> = maps
        .inspections
        .keys()
        .map(|&(asset_id, _)| asset_id)
        .filter(|asset_id| !maps.asset_inspection_count.contains_key(asset_id))
        .collect();
    uncounted.dedup();
    for asset_id in uncounted {
        let recorded = maps
            .inspections
            .range((asset_id, 0)..=(asset_id, u64::MAX))
            .count() as u64;
        violations.push(Violation::InspectionCountMismatch {
            asset_id,
            counter: 0,
            recorded,
        });
    }
}
