// Loan Management contract
//
// Originates loans from verified lenders against registered assets and
// collects repayments. Loan creation and closure fan out into the other
// contracts through nested calls attributed to `loan-management`:
//
// create_loan: transfer asset to borrower -> mark asset collateralized
//              -> register collateral
// close_loan:  mark asset available -> release collateral
//              (skipped once the asset is pledged to a newer loan)
//
// Every check runs before the first write. Nested effects are not rolled
// back if a later one fails; with the standard wiring they cannot fail once
// validation passed.
//
// State machine per loan: active -> closed (terminal)

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::context::{Principal, TxContext};
use crate::error::{ContractError, ContractResult};

use super::asset::{AssetId, AssetRegistry, AssetStatus};
use super::collateral::CollateralMonitoring;
use super::lender::LenderVerification;
use super::{ContractName, LedgerStorage};

/// Sequential loan identifier, starting at 1
pub type LoanId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoanStatus {
    Active,
    Closed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentStatus {
    Completed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub lender: Principal,
    pub borrower: Principal,
    pub asset_id: AssetId,
    pub principal_amount: u64,
    pub interest_rate: u64,
    /// Duration in blocks
    pub term_length: u64,
    pub start_date: u64,
    /// `start_date + term_length`
    pub end_date: u64,
    pub status: LoanStatus,
    pub payments_made: u64,
    pub total_payments: u64,
}

/// Repayment record, keyed by (loan id, payment number)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub amount: u64,
    pub date: u64,
    pub status: PaymentStatus,
}

/// Parameters for `create_loan`. The lender is always the sender.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTerms {
    pub borrower: Principal,
    pub asset_id: AssetId,
    pub principal_amount: u64,
    pub interest_rate: u64,
    pub term_length: u64,
    pub total_payments: u64,
}

/// Storage backing loan management
pub trait LoanStorage {
    /// Last allocated loan id, 0 when none was allocated yet
    fn last_loan_id(&self) -> LoanId;
    fn set_last_loan_id(&mut self, id: LoanId);

    fn get_loan(&self, id: LoanId) -> Option<Loan>;
    fn set_loan(&mut self, id: LoanId, loan: Loan);

    fn get_payment(&self, loan_id: LoanId, payment_number: u64) -> Option<Payment>;
    fn set_payment(&mut self, loan_id: LoanId, payment_number: u64, payment: Payment);
}

/// Loan management, holding the contracts it calls into
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoanManagement {
    assets: AssetRegistry,
    lenders: LenderVerification,
    collateral: CollateralMonitoring,
}

impl LoanManagement {
    pub const NAME: ContractName = ContractName::LoanManagement;

    pub fn new(
        assets: AssetRegistry,
        lenders: LenderVerification,
        collateral: CollateralMonitoring,
    ) -> Self {
        Self {
            assets,
            lenders,
            collateral,
        }
    }

    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    pub fn lenders(&self) -> &LenderVerification {
        &self.lenders
    }

    pub fn collateral(&self) -> &CollateralMonitoring {
        &self.collateral
    }

    /// Originate a loan from the sender (the lender) to `terms.borrower`
    pub fn create_loan<S: LedgerStorage + ?Sized>(
        &self,
        storage: &mut S,
        ctx: &TxContext,
        terms: LoanTerms,
    ) -> ContractResult<LoanId> {
        // Step 1: the sender must be an active verified lender
        let lender = ctx.sender()?.clone();
        if !self.lenders.is_verified_lender(storage, &lender)? {
            return Err(ContractError::UnverifiedLender);
        }

        // Step 2: the pledged asset must exist
        self.assets.get_asset(storage, terms.asset_id)?;

        // Step 3: schedule sanity
        if terms.total_payments == 0 {
            return Err(ContractError::InvalidState);
        }
        let end_date = ctx
            .block_height
            .checked_add(terms.term_length)
            .ok_or(ContractError::InvalidState)?;

        // Step 4: record the loan
        let loan_id = storage.last_loan_id() + 1;
        storage.set_last_loan_id(loan_id);
        storage.set_loan(
            loan_id,
            Loan {
                lender: lender.clone(),
                borrower: terms.borrower.clone(),
                asset_id: terms.asset_id,
                principal_amount: terms.principal_amount,
                interest_rate: terms.interest_rate,
                term_length: terms.term_length,
                start_date: ctx.block_height,
                end_date,
                status: LoanStatus::Active,
                payments_made: 0,
                total_payments: terms.total_payments,
            },
        );

        // Step 5: pledge the asset
        let nested = ctx.nested(Self::NAME);
        self.assets
            .transfer_asset(storage, &nested, terms.asset_id, &terms.borrower)?;
        self.assets.update_asset_status(
            storage,
            &nested,
            terms.asset_id,
            AssetStatus::Collateralized,
        )?;
        self.collateral
            .register_collateral(storage, &nested, terms.asset_id, loan_id)?;

        info!(
            "Loan {} created: lender {} borrower {} asset {} ({} payments)",
            loan_id, lender, terms.borrower, terms.asset_id, terms.total_payments
        );
        Ok(loan_id)
    }

    pub fn get_loan<S: LedgerStorage + ?Sized>(
        &self,
        storage: &S,
        loan_id: LoanId,
    ) -> ContractResult<Loan> {
        storage.get_loan(loan_id).ok_or(ContractError::NotFound)
    }

    /// Record the borrower's next payment and return its number.
    /// The final scheduled payment closes the loan.
    pub fn make_payment<S: LedgerStorage + ?Sized>(
        &self,
        storage: &mut S,
        ctx: &TxContext,
        loan_id: LoanId,
        amount: u64,
    ) -> ContractResult<u64> {
        let mut loan = self.get_loan(storage, loan_id)?;
        if !ctx.is_sender(&loan.borrower) {
            return Err(ContractError::Unauthorized);
        }
        if loan.status != LoanStatus::Active {
            return Err(ContractError::InvalidState);
        }
        let payment_number = loan.payments_made + 1;
        if payment_number > loan.total_payments {
            return Err(ContractError::InvalidState);
        }

        storage.set_payment(
            loan_id,
            payment_number,
            Payment {
                amount,
                date: ctx.block_height,
                status: PaymentStatus::Completed,
            },
        );
        loan.payments_made = payment_number;
        let fully_repaid = payment_number == loan.total_payments;
        storage.set_loan(loan_id, loan);

        debug!(
            "Payment {} of {} recorded for loan {}",
            payment_number, amount, loan_id
        );

        if fully_repaid {
            self.close_loan(storage, ctx, loan_id)?;
        }
        Ok(payment_number)
    }

    pub fn get_payment<S: LedgerStorage + ?Sized>(
        &self,
        storage: &S,
        loan_id: LoanId,
        payment_number: u64,
    ) -> ContractResult<Payment> {
        storage
            .get_payment(loan_id, payment_number)
            .ok_or(ContractError::NotFound)
    }

    /// Close a loan on behalf of its lender or borrower and release the pledge
    pub fn close_loan<S: LedgerStorage + ?Sized>(
        &self,
        storage: &mut S,
        ctx: &TxContext,
        loan_id: LoanId,
    ) -> ContractResult<()> {
        let mut loan = self.get_loan(storage, loan_id)?;
        if !ctx.is_sender(&loan.lender) && !ctx.is_sender(&loan.borrower) {
            return Err(ContractError::Unauthorized);
        }
        // A loan closes exactly once
        if loan.status == LoanStatus::Closed {
            return Err(ContractError::InvalidState);
        }

        let asset_id = loan.asset_id;
        loan.status = LoanStatus::Closed;
        storage.set_loan(loan_id, loan);

        // The asset was re-pledged; the newer loan still holds it
        if let Ok(collateral) = self.collateral.get_collateral(storage, asset_id) {
            if collateral.loan_id != loan_id {
                debug!(
                    "Loan {} closed, asset {} stays pledged to loan {}",
                    loan_id, asset_id, collateral.loan_id
                );
                return Ok(());
            }
        }

        let nested = ctx.nested(Self::NAME);
        self.assets
            .update_asset_status(storage, &nested, asset_id, AssetStatus::Available)?;
        self.collateral
            .release_collateral(storage, &nested, asset_id)?;

        info!("Loan {} closed, asset {} released", loan_id, asset_id);
        Ok(())
    }
}
