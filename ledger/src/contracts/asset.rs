// Asset Registry contract
//
// Registers physical assets under sequential ids and tracks who owns them and
// whether they are currently pledged. Owners manage their own assets; the
// registry's custodian contract may move or re-status any asset through a
// nested call (this is how loan creation and closure take effect).

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::context::{Principal, TxContext};
use crate::error::{ContractError, ContractResult};

use super::ContractName;

/// Sequential asset identifier, starting at 1
pub type AssetId = u64;

/// Availability of an asset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetStatus {
    /// Free to be pledged
    Available,
    /// Pledged against an active loan
    Collateralized,
}

/// Registered asset record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// `None` when registered without a sender; only the custodian can act on it
    pub owner: Option<Principal>,
    pub name: String,
    pub description: String,
    pub serial_number: String,
    pub manufacturer: String,
    pub manufacture_date: u64,
    pub value: u64,
    pub status: AssetStatus,
}

/// Parameters for `register_asset`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    pub name: String,
    pub description: String,
    pub serial_number: String,
    pub manufacturer: String,
    pub manufacture_date: u64,
    pub value: u64,
}

/// Storage backing the asset registry
pub trait AssetStorage {
    /// Last allocated asset id, 0 when none was allocated yet
    fn last_asset_id(&self) -> AssetId;
    fn set_last_asset_id(&mut self, id: AssetId);

    fn get_asset(&self, id: AssetId) -> Option<Asset>;
    fn set_asset(&mut self, id: AssetId, asset: Asset);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetRegistry {
    custodian: ContractName,
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self::new(ContractName::LoanManagement)
    }
}

impl AssetRegistry {
    /// Create a registry that trusts nested calls from `custodian`
    pub fn new(custodian: ContractName) -> Self {
        Self { custodian }
    }

    fn authorize(&self, ctx: &TxContext, asset: &Asset) -> ContractResult<()> {
        let is_owner = asset
            .owner
            .as_ref()
            .is_some_and(|owner| ctx.is_sender(owner));
        if is_owner || ctx.is_called_by(self.custodian) {
            Ok(())
        } else {
            Err(ContractError::Unauthorized)
        }
    }

    /// Register a new asset owned by the sender and return its id.
    /// Never fails; without a sender the asset is recorded ownerless.
    pub fn register_asset<S: AssetStorage + ?Sized>(
        &self,
        storage: &mut S,
        ctx: &TxContext,
        params: NewAsset,
    ) -> ContractResult<AssetId> {
        let owner = ctx.sender.clone();

        let asset_id = storage.last_asset_id() + 1;
        storage.set_last_asset_id(asset_id);
        storage.set_asset(
            asset_id,
            Asset {
                owner,
                name: params.name,
                description: params.description,
                serial_number: params.serial_number,
                manufacturer: params.manufacturer,
                manufacture_date: params.manufacture_date,
                value: params.value,
                status: AssetStatus::Available,
            },
        );

        debug!("Registered asset {} at height {}", asset_id, ctx.block_height);
        Ok(asset_id)
    }

    pub fn get_asset<S: AssetStorage + ?Sized>(
        &self,
        storage: &S,
        asset_id: AssetId,
    ) -> ContractResult<Asset> {
        storage.get_asset(asset_id).ok_or(ContractError::NotFound)
    }

    pub fn update_asset_status<S: AssetStorage + ?Sized>(
        &self,
        storage: &mut S,
        ctx: &TxContext,
        asset_id: AssetId,
        status: AssetStatus,
    ) -> ContractResult<()> {
        let mut asset = self.get_asset(storage, asset_id)?;
        self.authorize(ctx, &asset)?;

        trace!("Asset {} status {:?} -> {:?}", asset_id, asset.status, status);
        asset.status = status;
        storage.set_asset(asset_id, asset);
        Ok(())
    }

    pub fn transfer_asset<S: AssetStorage + ?Sized>(
        &self,
        storage: &mut S,
        ctx: &TxContext,
        asset_id: AssetId,
        new_owner: &Principal,
    ) -> ContractResult<()> {
        let mut asset = self.get_asset(storage, asset_id)?;
        self.authorize(ctx, &asset)?;

        debug!(
            "Asset {} transferred from {:?} to {}",
            asset_id,
            asset.owner.as_ref().map(Principal::as_str),
            new_owner
        );
        asset.owner = Some(new_owner.clone());
        storage.set_asset(asset_id, asset);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn forklift() -> NewAsset {
        NewAsset {
            name: "Forklift".to_string(),
            description: "Electric forklift, 2t".to_string(),
            serial_number: "FL-2231".to_string(),
            manufacturer: "Lift Works".to_string(),
            manufacture_date: 20_190_301,
            value: 25_000,
        }
    }

    #[test]
    fn test_register_assigns_sequential_ids() {
        let registry = AssetRegistry::default();
        let mut storage = MemoryStorage::new();
        let ctx = TxContext::new("alice", 1);

        assert_eq!(registry.register_asset(&mut storage, &ctx, forklift()), Ok(1));
        assert_eq!(registry.register_asset(&mut storage, &ctx, forklift()), Ok(2));

        let asset = registry.get_asset(&storage, 2).unwrap();
        assert_eq!(asset.owner, Some(Principal::from("alice")));
        assert_eq!(asset.status, AssetStatus::Available);
        assert_eq!(asset.serial_number, "FL-2231");
    }

    #[test]
    fn test_register_without_sender_is_ownerless() {
        let registry = AssetRegistry::default();
        let mut storage = MemoryStorage::new();

        let id = registry
            .register_asset(&mut storage, &TxContext::default(), forklift())
            .unwrap();
        assert_eq!(id, 1);
        let asset = registry.get_asset(&storage, id).unwrap();
        assert_eq!(asset.owner, None);

        // Nobody owns it, so only the custodian can act on it
        assert_eq!(
            registry.update_asset_status(
                &mut storage,
                &TxContext::new("alice", 1),
                id,
                AssetStatus::Collateralized
            ),
            Err(ContractError::Unauthorized)
        );
        let custodian = TxContext::new("lender", 1).nested(ContractName::LoanManagement);
        registry
            .transfer_asset(&mut storage, &custodian, id, &Principal::from("bob"))
            .unwrap();
        assert_eq!(
            registry.get_asset(&storage, id).unwrap().owner,
            Some(Principal::from("bob"))
        );
    }

    #[test]
    fn test_get_missing_asset() {
        let registry = AssetRegistry::default();
        let storage = MemoryStorage::new();
        assert_eq!(registry.get_asset(&storage, 1), Err(ContractError::NotFound));
    }

    #[test]
    fn test_only_owner_updates_status() {
        let registry = AssetRegistry::default();
        let mut storage = MemoryStorage::new();
        let alice = TxContext::new("alice", 1);
        let bob = TxContext::new("bob", 1);
        let id = registry.register_asset(&mut storage, &alice, forklift()).unwrap();

        assert_eq!(
            registry.update_asset_status(&mut storage, &bob, id, AssetStatus::Collateralized),
            Err(ContractError::Unauthorized)
        );
        assert_eq!(
            registry.update_asset_status(&mut storage, &alice, 99, AssetStatus::Collateralized),
            Err(ContractError::NotFound)
        );

        registry
            .update_asset_status(&mut storage, &alice, id, AssetStatus::Collateralized)
            .unwrap();
        assert_eq!(
            registry.get_asset(&storage, id).unwrap().status,
            AssetStatus::Collateralized
        );
    }

    #[test]
    fn test_transfer_moves_ownership() {
        let registry = AssetRegistry::default();
        let mut storage = MemoryStorage::new();
        let alice = TxContext::new("alice", 1);
        let id = registry.register_asset(&mut storage, &alice, forklift()).unwrap();

        registry
            .transfer_asset(&mut storage, &alice, id, &Principal::from("bob"))
            .unwrap();
        assert_eq!(
            registry.get_asset(&storage, id).unwrap().owner,
            Some(Principal::from("bob"))
        );

        // Alice no longer owns it
        assert_eq!(
            registry.transfer_asset(&mut storage, &alice, id, &Principal::from("alice")),
            Err(ContractError::Unauthorized)
        );
    }

    #[test]
    fn test_custodian_may_act_on_any_asset() {
        let registry = AssetRegistry::default();
        let mut storage = MemoryStorage::new();
        let alice = TxContext::new("alice", 1);
        let id = registry.register_asset(&mut storage, &alice, forklift()).unwrap();

        let lender = TxContext::new("lender", 1).nested(ContractName::LoanManagement);
        registry
            .transfer_asset(&mut storage, &lender, id, &Principal::from("bob"))
            .unwrap();
        registry
            .update_asset_status(&mut storage, &lender, id, AssetStatus::Collateralized)
            .unwrap();

        let asset = registry.get_asset(&storage, id).unwrap();
        assert_eq!(asset.owner, Some(Principal::from("bob")));
        assert_eq!(asset.status, AssetStatus::Collateralized);

        let other = TxContext::new("lender", 1).nested(ContractName::CollateralMonitoring);
        assert_eq!(
            registry.update_asset_status(&mut storage, &other, id, AssetStatus::Available),
            Err(ContractError::Unauthorized)
        );
    }
}
