// In-memory ledger storage
//
// Three namespaces shared by all contracts:
// - maps: records keyed by id or composite key
//     assets:                 <asset_id>                  -> Asset
//     verified_lenders:       <principal>                 -> LenderRecord
//     loans:                  <loan_id>                   -> Loan
//     payments:               <loan_id><payment_number>   -> Payment
//     collaterals:            <asset_id>                  -> Collateral
//     inspections:            <asset_id><inspection_id>   -> Inspection
//     asset_inspection_count: <asset_id>                  -> u64
// - vars: scalar counters (last allocated asset and loan ids)
// - nfts: reserved, no contract writes to it
//
// Ordered maps keep iteration deterministic for snapshots and invariant checks.

use std::collections::BTreeMap;

use log::trace;

use crate::context::Principal;
use crate::contracts::{
    Asset, AssetId, AssetStorage, Collateral, CollateralStorage, Inspection, InspectionId,
    LenderRecord, LenderStorage, Loan, LoanId, LoanStorage, Payment,
};

/// Record namespace
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Maps {
    pub assets: BTreeMap<AssetId, Asset>,
    pub verified_lenders: BTreeMap<Principal, LenderRecord>,
    pub loans: BTreeMap<LoanId, Loan>,
    pub payments: BTreeMap<(LoanId, u64), Payment>,
    pub collaterals: BTreeMap<AssetId, Collateral>,
    pub inspections: BTreeMap<(AssetId, InspectionId), Inspection>,
    pub asset_inspection_count: BTreeMap<AssetId, u64>,
}

/// Scalar namespace
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Vars {
    pub last_asset_id: AssetId,
    pub last_loan_id: LoanId,
}

/// Reserved token namespace: token id -> owner
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Nfts {
    pub owners: BTreeMap<String, Principal>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryStorage {
    maps: Maps,
    vars: Vars,
    nfts: Nfts,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every namespace back to empty
    pub fn clear(&mut self) {
        trace!("Clearing ledger storage");
        *self = Self::default();
    }

    pub fn maps(&self) -> &Maps {
        &self.maps
    }

    pub fn vars(&self) -> &Vars {
        &self.vars
    }

    pub fn nfts(&self) -> &Nfts {
        &self.nfts
    }

    /// Whether nothing was ever written since creation or the last `clear`
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl AssetStorage for MemoryStorage {
    fn last_asset_id(&self) -> AssetId {
        self.vars.last_asset_id
    }

    fn set_last_asset_id(&mut self, id: AssetId) {
        trace!("vars.last-asset-id = {}", id);
        self.vars.last_asset_id = id;
    }

    fn get_asset(&self, id: AssetId) -> Option<Asset> {
        self.maps.assets.get(&id).cloned()
    }

    fn set_asset(&mut self, id: AssetId, asset: Asset) {
        trace!("maps.assets[{}] = {:?}", id, asset.status);
        self.maps.assets.insert(id, asset);
    }
}

impl LenderStorage for MemoryStorage {
    fn get_lender(&self, lender: &Principal) -> Option<LenderRecord> {
        self.maps.verified_lenders.get(lender).cloned()
    }

    fn set_lender(&mut self, lender: &Principal, record: LenderRecord) {
        trace!("maps.verified-lenders[{}] active={}", lender, record.is_active);
        self.maps.verified_lenders.insert(lender.clone(), record);
    }
}

impl LoanStorage for MemoryStorage {
    fn last_loan_id(&self) -> LoanId {
        self.vars.last_loan_id
    }

    fn set_last_loan_id(&mut self, id: LoanId) {
        trace!("vars.last-loan-id = {}", id);
        self.vars.last_loan_id = id;
    }

    fn get_loan(&self, id: LoanId) -> Option<Loan> {
        self.maps.loans.get(&id).cloned()
    }

    fn set_loan(&mut self, id: LoanId, loan: Loan) {
        trace!("maps.loans[{}] = {:?} ({} paid)", id, loan.status, loan.payments_made);
        self.maps.loans.insert(id, loan);
    }

    fn get_payment(&self, loan_id: LoanId, payment_number: u64) -> Option<Payment> {
        self.maps.payments.get(&(loan_id, payment_number)).cloned()
    }

    fn set_payment(&mut self, loan_id: LoanId, payment_number: u64, payment: Payment) {
        trace!("maps.payments[{}, {}] = {}", loan_id, payment_number, payment.amount);
        self.maps.payments.insert((loan_id, payment_number), payment);
    }
}

impl CollateralStorage for MemoryStorage {
    fn get_collateral(&self, asset_id: AssetId) -> Option<Collateral> {
        self.maps.collaterals.get(&asset_id).cloned()
    }

    fn set_collateral(&mut self, asset_id: AssetId, collateral: Collateral) {
        trace!(
            "maps.collaterals[{}] = {:?} for loan {}",
            asset_id,
            collateral.status,
            collateral.loan_id
        );
        self.maps.collaterals.insert(asset_id, collateral);
    }

    fn get_inspection(
        &self,
        asset_id: AssetId,
        inspection_id: InspectionId,
    ) -> Option<Inspection> {
        self.maps
            .inspections
            .get(&(asset_id, inspection_id))
            .cloned()
    }

    fn set_inspection(
        &mut self,
        asset_id: AssetId,
        inspection_id: InspectionId,
        inspection: Inspection,
    ) {
        trace!("maps.inspections[{}, {}] = {}", asset_id, inspection_id, inspection.condition);
        self.maps
            .inspections
            .insert((asset_id, inspection_id), inspection);
    }

    fn inspection_count(&self, asset_id: AssetId) -> Option<u64> {
        self.maps.asset_inspection_count.get(&asset_id).copied()
    }

    fn set_inspection_count(&mut self, asset_id: AssetId, count: u64) {
        trace!("maps.asset-inspection-count[{}] = {}", asset_id, count);
        self.maps.asset_inspection_count.insert(asset_id, count);
    }
}
