// Lender Verification contract
//
// Owner-curated registry of lenders. Only the contract owner can register,
// deactivate or reactivate a lender; anyone can query. `is_verified_lender`
// is a boolean gate: an unknown principal is simply not verified.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::context::{Principal, TxContext};
use crate::error::{ContractError, ContractResult};

/// Verified lender record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LenderRecord {
    pub name: String,
    pub license_id: String,
    /// Block height at (re-)registration
    pub verification_date: u64,
    pub is_active: bool,
}

/// Storage backing the lender registry
pub trait LenderStorage {
    fn get_lender(&self, lender: &Principal) -> Option<LenderRecord>;
    fn set_lender(&mut self, lender: &Principal, record: LenderRecord);
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LenderVerification;

impl LenderVerification {
    pub fn new() -> Self {
        Self
    }

    /// Register (or re-register, replacing the prior record) a lender as active
    pub fn register_lender<S: LenderStorage + ?Sized>(
        &self,
        storage: &mut S,
        ctx: &TxContext,
        lender: &Principal,
        name: &str,
        license_id: &str,
    ) -> ContractResult<()> {
        ctx.require_owner()?;

        storage.set_lender(
            lender,
            LenderRecord {
                name: name.to_string(),
                license_id: license_id.to_string(),
                verification_date: ctx.block_height,
                is_active: true,
            },
        );

        debug!("Lender {} verified at height {}", lender, ctx.block_height);
        Ok(())
    }

    pub fn get_lender_data<S: LenderStorage + ?Sized>(
        &self,
        storage: &S,
        lender: &Principal,
    ) -> ContractResult<LenderRecord> {
        storage.get_lender(lender).ok_or(ContractError::NotFound)
    }

    /// Never fails: unknown lenders are reported as not verified
    pub fn is_verified_lender<S: LenderStorage + ?Sized>(
        &self,
        storage: &S,
        lender: &Principal,
    ) -> ContractResult<bool> {
        Ok(storage
            .get_lender(lender)
            .map(|record| record.is_active)
            .unwrap_or(false))
    }

    pub fn deactivate_lender<S: LenderStorage + ?Sized>(
        &self,
        storage: &mut S,
        ctx: &TxContext,
        lender: &Principal,
    ) -> ContractResult<()> {
        self.set_active(storage, ctx, lender, false)
    }

    pub fn reactivate_lender<S: LenderStorage + ?Sized>(
        &self,
        storage: &mut S,
        ctx: &TxContext,
        lender: &Principal,
    ) -> ContractResult<()> {
        self.set_active(storage, ctx, lender, true)
    }

    fn set_active<S: LenderStorage + ?Sized>(
        &self,
        storage: &mut S,
        ctx: &TxContext,
        lender: &Principal,
        is_active: bool,
    ) -> ContractResult<()> {
        // Owner check comes before the existence check
        ctx.require_owner()?;
        let mut record = self.get_lender_data(storage, lender)?;

        record.is_active = is_active;
        storage.set_lender(lender, record);

        debug!("Lender {} active: {}", lender, is_active);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    const OWNER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";
    const LENDER: &str = "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG";
    const STRANGER: &str = "ST3NBRSFKX28FQ2ZJ1MAKX58HKHSDGNV5N7R21XCP";

    fn owner_ctx(height: u64) -> TxContext {
        TxContext::new(OWNER, height).with_owner(OWNER)
    }

    #[test]
    fn test_register_lender() {
        let contract = LenderVerification::new();
        let mut storage = MemoryStorage::new();
        let lender = Principal::from(LENDER);

        contract
            .register_lender(&mut storage, &owner_ctx(12), &lender, "Finance Corp", "FIN12345")
            .unwrap();

        let record = contract.get_lender_data(&storage, &lender).unwrap();
        assert_eq!(record.name, "Finance Corp");
        assert_eq!(record.license_id, "FIN12345");
        assert_eq!(record.verification_date, 12);
        assert!(record.is_active);
        assert_eq!(contract.is_verified_lender(&storage, &lender), Ok(true));
    }

    #[test]
    fn test_register_requires_owner() {
        let contract = LenderVerification::new();
        let mut storage = MemoryStorage::new();
        let lender = Principal::from(LENDER);
        let ctx = TxContext::new(STRANGER, 1).with_owner(OWNER);

        assert_eq!(
            contract.register_lender(&mut storage, &ctx, &lender, "Finance Corp", "FIN12345"),
            Err(ContractError::Unauthorized)
        );
        assert_eq!(
            contract.get_lender_data(&storage, &lender),
            Err(ContractError::NotFound)
        );
    }

    #[test]
    fn test_reregistration_replaces_record() {
        let contract = LenderVerification::new();
        let mut storage = MemoryStorage::new();
        let lender = Principal::from(LENDER);

        contract
            .register_lender(&mut storage, &owner_ctx(1), &lender, "Finance Corp", "FIN1")
            .unwrap();
        contract
            .deactivate_lender(&mut storage, &owner_ctx(2), &lender)
            .unwrap();
        contract
            .register_lender(&mut storage, &owner_ctx(5), &lender, "Finance Corp II", "FIN2")
            .unwrap();

        let record = contract.get_lender_data(&storage, &lender).unwrap();
        assert_eq!(record.name, "Finance Corp II");
        assert_eq!(record.license_id, "FIN2");
        assert_eq!(record.verification_date, 5);
        assert!(record.is_active);
    }

    #[test]
    fn test_unknown_lender_is_not_verified() {
        let contract = LenderVerification::new();
        let storage = MemoryStorage::new();
        assert_eq!(
            contract.is_verified_lender(&storage, &Principal::from(STRANGER)),
            Ok(false)
        );
    }

    #[test]
    fn test_deactivate_and_reactivate() {
        let contract = LenderVerification::new();
        let mut storage = MemoryStorage::new();
        let lender = Principal::from(LENDER);
        contract
            .register_lender(&mut storage, &owner_ctx(1), &lender, "Finance Corp", "FIN12345")
            .unwrap();

        contract
            .deactivate_lender(&mut storage, &owner_ctx(2), &lender)
            .unwrap();
        assert_eq!(contract.is_verified_lender(&storage, &lender), Ok(false));

        contract
            .reactivate_lender(&mut storage, &owner_ctx(3), &lender)
            .unwrap();
        assert_eq!(contract.is_verified_lender(&storage, &lender), Ok(true));
    }

    #[test]
    fn test_status_changes_check_owner_before_existence() {
        let contract = LenderVerification::new();
        let mut storage = MemoryStorage::new();
        let unknown = Principal::from("never-registered");
        let stranger = TxContext::new(STRANGER, 1).with_owner(OWNER);

        assert_eq!(
            contract.deactivate_lender(&mut storage, &stranger, &unknown),
            Err(ContractError::Unauthorized)
        );
        assert_eq!(
            contract.reactivate_lender(&mut storage, &stranger, &unknown),
            Err(ContractError::Unauthorized)
        );
        assert_eq!(
            contract.deactivate_lender(&mut storage, &owner_ctx(1), &unknown),
            Err(ContractError::NotFound)
        );
        assert_eq!(
            contract.reactivate_lender(&mut storage, &owner_ctx(1), &unknown),
            Err(ContractError::NotFound)
        );
    }
}
