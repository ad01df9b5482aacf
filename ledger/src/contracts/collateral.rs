// Collateral Monitoring contract
//
// Tracks assets pledged against loans and their inspection history.
// Collateral is registered and released only through the manager contract
// (loan management); inspections can be recorded by anyone while the
// collateral is active.
//
// State machine per collateral: active -> released (terminal)

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::config::{NEVER_INSPECTED, UNKNOWN_CONDITION};
use crate::context::{Principal, TxContext};
use crate::error::{ContractError, ContractResult};

use super::asset::AssetId;
use super::loan::LoanId;
use super::ContractName;

/// Sequential inspection number per asset, starting at 1
pub type InspectionId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollateralStatus {
    Active,
    Released,
}

/// Pledge record, keyed by asset id
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collateral {
    pub loan_id: LoanId,
    pub status: CollateralStatus,
    /// Block height of the latest inspection, `NEVER_INSPECTED` until the first one
    pub last_inspection_date: u64,
    pub condition: String,
}

/// Inspection record, keyed by (asset id, inspection id)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub inspector: Principal,
    pub date: u64,
    pub condition: String,
    pub notes: String,
}

/// Storage backing collateral monitoring
pub trait CollateralStorage {
    fn get_collateral(&self, asset_id: AssetId) -> Option<Collateral>;
    fn set_collateral(&mut self, asset_id: AssetId, collateral: Collateral);

    fn get_inspection(&self, asset_id: AssetId, inspection_id: InspectionId)
        -> Option<Inspection>;
    fn set_inspection(
        &mut self,
        asset_id: AssetId,
        inspection_id: InspectionId,
        inspection: Inspection,
    );

    /// Inspection counter, `None` if never initialised for this asset
    fn inspection_count(&self, asset_id: AssetId) -> Option<u64>;
    fn set_inspection_count(&mut self, asset_id: AssetId, count: u64);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollateralMonitoring {
    manager: ContractName,
}

impl Default for CollateralMonitoring {
    fn default() -> Self {
        Self::new(ContractName::LoanManagement)
    }
}

impl CollateralMonitoring {
    /// Create a monitor that accepts registrations and releases from `manager` only
    pub fn new(manager: ContractName) -> Self {
        Self { manager }
    }

    fn require_manager(&self, ctx: &TxContext) -> ContractResult<()> {
        if ctx.is_called_by(self.manager) {
            Ok(())
        } else {
            Err(ContractError::Unauthorized)
        }
    }

    pub fn register_collateral<S: CollateralStorage + ?Sized>(
        &self,
        storage: &mut S,
        ctx: &TxContext,
        asset_id: AssetId,
        loan_id: LoanId,
    ) -> ContractResult<()> {
        self.require_manager(ctx)?;

        storage.set_collateral(
            asset_id,
            Collateral {
                loan_id,
                status: CollateralStatus::Active,
                last_inspection_date: NEVER_INSPECTED,
                condition: UNKNOWN_CONDITION.to_string(),
            },
        );
        // The counter survives re-collateralisation so inspection ids never repeat
        if storage.inspection_count(asset_id).is_none() {
            storage.set_inspection_count(asset_id, 0);
        }

        debug!("Asset {} pledged for loan {}", asset_id, loan_id);
        Ok(())
    }

    pub fn get_collateral<S: CollateralStorage + ?Sized>(
        &self,
        storage: &S,
        asset_id: AssetId,
    ) -> ContractResult<Collateral> {
        storage.get_collateral(asset_id).ok_or(ContractError::NotFound)
    }

    /// Record an inspection by the sender and return its id
    pub fn record_inspection<S: CollateralStorage + ?Sized>(
        &self,
        storage: &mut S,
        ctx: &TxContext,
        asset_id: AssetId,
        condition: &str,
        notes: &str,
    ) -> ContractResult<InspectionId> {
        let mut collateral = self.get_collateral(storage, asset_id)?;
        if collateral.status != CollateralStatus::Active {
            return Err(ContractError::InvalidState);
        }
        let inspector = ctx.sender()?.clone();

        let inspection_id = storage.inspection_count(asset_id).unwrap_or(0) + 1;
        storage.set_inspection(
            asset_id,
            inspection_id,
            Inspection {
                inspector,
                date: ctx.block_height,
                condition: condition.to_string(),
                notes: notes.to_string(),
            },
        );
        storage.set_inspection_count(asset_id, inspection_id);

        collateral.last_inspection_date = ctx.block_height;
        collateral.condition = condition.to_string();
        storage.set_collateral(asset_id, collateral);

        trace!(
            "Inspection {} recorded for asset {}: {}",
            inspection_id,
            asset_id,
            condition
        );
        Ok(inspection_id)
    }

    pub fn get_inspection<S: CollateralStorage + ?Sized>(
        &self,
        storage: &S,
        asset_id: AssetId,
        inspection_id: InspectionId,
    ) -> ContractResult<Inspection> {
        storage
            .get_inspection(asset_id, inspection_id)
            .ok_or(ContractError::NotFound)
    }

    /// Release the pledge on `asset_id`.
    /// Releasing an already released record is accepted and changes nothing.
    pub fn release_collateral<S: CollateralStorage + ?Sized>(
        &self,
        storage: &mut S,
        ctx: &TxContext,
        asset_id: AssetId,
    ) -> ContractResult<()> {
        self.require_manager(ctx)?;
        let mut collateral = self.get_collateral(storage, asset_id)?;

        collateral.status = CollateralStatus::Released;
        storage.set_collateral(asset_id, collateral);

        debug!("Collateral released for asset {}", asset_id);
        Ok(())
    }

    /// Never fails: assets without inspections report 0
    pub fn get_inspection_count<S: CollateralStorage + ?Sized>(
        &self,
        storage: &S,
        asset_id: AssetId,
    ) -> ContractResult<u64> {
        Ok(storage.inspection_count(asset_id).unwrap_or(0))
    }
}
