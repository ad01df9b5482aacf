// Simulation environment
//
// Owns the shared storage, the transaction context and the contract
// registry, and exposes the control surface test drivers use: identity and
// clock setters, contract linking and loading, and call execution.
//
// Execution is synchronous and single threaded: each call runs to
// completion, nested contract calls included, before the next one starts.

use log::{debug, warn};

use crate::context::{Principal, TxContext};
use crate::contracts::{
    AssetRegistry, CollateralMonitoring, Contract, ContractName, LenderVerification,
    LoanManagement,
};
use crate::dispatch::{Call, CallResponse};
use crate::error::{ContractError, ContractResult};
use crate::registry::ContractRegistry;
use crate::storage::MemoryStorage;

#[derive(Clone, Debug)]
pub struct Environment {
    storage: MemoryStorage,
    context: TxContext,
    registry: ContractRegistry,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Fresh environment with the four contracts linked
    pub fn new() -> Self {
        Self {
            storage: MemoryStorage::new(),
            context: TxContext::default(),
            registry: ContractRegistry::standard(),
        }
    }

    /// Clear all storage, unset every identity, rewind the clock to genesis
    /// and restore the standard contract links
    pub fn reset(&mut self) {
        debug!("Resetting environment");
        self.storage.clear();
        self.context = TxContext::default();
        self.registry = ContractRegistry::standard();
    }

    pub fn set_tx_sender(&mut self, principal: impl Into<Principal>) {
        self.context.sender = Some(principal.into());
    }

    pub fn set_contract_owner(&mut self, principal: impl Into<Principal>) {
        self.context.contract_owner = Some(principal.into());
    }

    /// Pretend the next calls are issued by contract `name`
    pub fn set_contract_caller(&mut self, name: impl Into<String>) {
        self.context.contract_caller = Some(name.into());
    }

    pub fn clear_contract_caller(&mut self) {
        self.context.contract_caller = None;
    }

    pub fn set_block_height(&mut self, height: u64) {
        self.context.block_height = height;
    }

    /// Move the clock forward by `blocks`, returning the new height
    pub fn advance_blocks(&mut self, blocks: u64) -> u64 {
        self.context.block_height = self.context.block_height.saturating_add(blocks);
        self.context.block_height
    }

    pub fn block_height(&self) -> u64 {
        self.context.block_height
    }

    pub fn context(&self) -> &TxContext {
        &self.context
    }

    /// Replace the whole context, returning the previous one
    pub fn replace_context(&mut self, context: TxContext) -> TxContext {
        std::mem::replace(&mut self.context, context)
    }

    pub fn storage(&self) -> &MemoryStorage {
        &self.storage
    }

    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    /// Whether the environment is in its post-reset state
    pub fn is_pristine(&self) -> bool {
        self.storage.is_empty()
            && self.context == TxContext::default()
            && self.registry == ContractRegistry::standard()
    }

    /// Merge contract handles into the registry (last write wins per name)
    pub fn link_contracts<I>(&mut self, contracts: I)
    where
        I: IntoIterator<Item = (ContractName, Contract)>,
    {
        self.registry.link(contracts);
        if log::log_enabled!(log::Level::Debug) {
            let names: Vec<String> =
                self.registry.names().map(|name| name.to_string()).collect();
            debug!("Linked contracts: {}", names.join(", "));
        }
    }

    /// Handle for the contract registered under `name`
    pub fn load_contract(&self, name: &str) -> ContractResult<Contract> {
        self.registry.resolve(name).cloned()
    }

    pub fn asset_registry(&self) -> ContractResult<AssetRegistry> {
        self.registry
            .get(ContractName::AssetRegistration)?
            .as_asset_registry()
            .cloned()
            .ok_or(ContractError::NotFound)
    }

    pub fn lender_verification(&self) -> ContractResult<LenderVerification> {
        self.registry
            .get(ContractName::LenderVerification)?
            .as_lender_verification()
            .cloned()
            .ok_or(ContractError::NotFound)
    }

    pub fn loan_management(&self) -> ContractResult<LoanManagement> {
        self.registry
            .get(ContractName::LoanManagement)?
            .as_loan_management()
            .cloned()
            .ok_or(ContractError::NotFound)
    }

    pub fn collateral_monitoring(&self) -> ContractResult<CollateralMonitoring> {
        self.registry
            .get(ContractName::CollateralMonitoring)?
            .as_collateral_monitoring()
            .cloned()
            .ok_or(ContractError::NotFound)
    }

    /// Run one typed operation against the shared storage under the current context
    pub fn transact<T, F>(&mut self, operation: F) -> ContractResult<T>
    where
        F: FnOnce(&mut MemoryStorage, &TxContext) -> ContractResult<T>,
    {
        let result = operation(&mut self.storage, &self.context);
        if let Err(error) = &result {
            debug!(
                "Call by {:?} at height {} failed: {} ({})",
                self.context.sender,
                self.context.block_height,
                error,
                error.code()
            );
        }
        result
    }

    /// Dispatch `call` to the contract registered under `contract`
    pub fn call(&mut self, contract: &str, call: Call) -> CallResponse {
        let handle = match self.load_contract(contract) {
            Ok(handle) => handle,
            Err(error) => {
                warn!("Call to unknown contract '{}'", contract);
                return CallResponse::err(error);
            }
        };

        let operation = call.operation();
        let result = handle.invoke(&mut self.storage, &self.context, call);
        if let Err(error) = &result {
            if log::log_enabled!(log::Level::Debug) {
                debug!(
                    "{}.{} rejected for {:?} at height {}: {}",
                    contract,
                    operation,
                    self.context.sender.as_ref().map(Principal::as_str),
                    self.context.block_height,
                    error.code()
                );
            }
        }
        CallResponse::from(result)
    }

    /// Dispatch `call` to the contract that exposes it
    pub fn submit(&mut self, call: Call) -> CallResponse {
        let contract = call.contract();
        self.call(contract.as_ref(), call)
    }
}
