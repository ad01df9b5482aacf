// Transaction context
//
// Every contract operation receives the context explicitly. Nested
// cross-contract calls receive a derived context (see `TxContext::nested`)
// so the callee can authorize on the calling contract's identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::GENESIS_BLOCK_HEIGHT;
use crate::contracts::ContractName;
use crate::error::{ContractError, ContractResult};

/// Opaque account identity, compared by equality only
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Principal {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Principal {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&Principal> for Principal {
    fn from(value: &Principal) -> Self {
        value.clone()
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller identities and logical time for one contract call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxContext {
    /// Acting principal (transaction signer)
    pub sender: Option<Principal>,
    /// Privileged principal for owner-only operations
    pub contract_owner: Option<Principal>,
    /// Name of the contract that issued the current call, `None` when called directly.
    /// Kept as free text so tests can impersonate arbitrary callers.
    pub contract_caller: Option<String>,
    /// Caller-controlled logical clock
    pub block_height: u64,
}

impl Default for TxContext {
    fn default() -> Self {
        Self {
            sender: None,
            contract_owner: None,
            contract_caller: None,
            block_height: GENESIS_BLOCK_HEIGHT,
        }
    }
}

impl TxContext {
    /// Create a direct-call context for `sender` at `block_height`
    pub fn new(sender: impl Into<Principal>, block_height: u64) -> Self {
        Self {
            sender: Some(sender.into()),
            block_height,
            ..Self::default()
        }
    }

    pub fn with_owner(mut self, owner: impl Into<Principal>) -> Self {
        self.contract_owner = Some(owner.into());
        self
    }

    pub fn with_caller(mut self, caller: impl Into<String>) -> Self {
        self.contract_caller = Some(caller.into());
        self
    }

    /// The acting principal, or `Unauthorized` when no sender is set
    pub fn sender(&self) -> ContractResult<&Principal> {
        self.sender.as_ref().ok_or(ContractError::Unauthorized)
    }

    /// Whether `principal` is the current sender
    pub fn is_sender(&self, principal: &Principal) -> bool {
        self.sender.as_ref() == Some(principal)
    }

    /// Require the sender to be the contract owner.
    /// An unset sender or unset owner never matches.
    pub fn require_owner(&self) -> ContractResult<()> {
        match (&self.sender, &self.contract_owner) {
            (Some(sender), Some(owner)) if sender == owner => Ok(()),
            _ => Err(ContractError::Unauthorized),
        }
    }

    /// Whether the current call was issued by `contract`
    pub fn is_called_by(&self, contract: ContractName) -> bool {
        self.contract_caller.as_deref() == Some(contract.as_ref())
    }

    /// Context seen by a contract called from `by`: same sender, owner and
    /// height, with `contract_caller` attributed to the issuing contract.
    pub fn nested(&self, by: ContractName) -> Self {
        Self {
            contract_caller: Some(by.to_string()),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context_is_genesis() {
        let ctx = TxContext::default();
        assert_eq!(ctx.block_height, GENESIS_BLOCK_HEIGHT);
        assert!(ctx.sender.is_none());
        assert!(ctx.contract_owner.is_none());
        assert!(ctx.contract_caller.is_none());
        assert_eq!(ctx.sender(), Err(ContractError::Unauthorized));
    }

    #[test]
    fn test_require_owner() {
        let ctx = TxContext::new("owner", 1).with_owner("owner");
        assert!(ctx.require_owner().is_ok());

        let ctx = TxContext::new("someone", 1).with_owner("owner");
        assert_eq!(ctx.require_owner(), Err(ContractError::Unauthorized));

        // Both unset must not count as a match
        assert_eq!(
            TxContext::default().require_owner(),
            Err(ContractError::Unauthorized)
        );
    }

    #[test]
    fn test_nested_context_attributes_caller() {
        let ctx = TxContext::new("lender", 7).with_owner("owner");
        let nested = ctx.nested(ContractName::LoanManagement);

        assert!(nested.is_called_by(ContractName::LoanManagement));
        assert!(!nested.is_called_by(ContractName::AssetRegistration));
        assert_eq!(nested.sender, ctx.sender);
        assert_eq!(nested.contract_owner, ctx.contract_owner);
        assert_eq!(nested.block_height, 7);
        assert!(!ctx.is_called_by(ContractName::LoanManagement));
    }

    #[test]
    fn test_impersonated_caller() {
        let ctx = TxContext::new("anyone", 1).with_caller("loan-management");
        assert!(ctx.is_called_by(ContractName::LoanManagement));

        let ctx = TxContext::new("anyone", 1).with_caller("other-contract");
        assert!(!ctx.is_called_by(ContractName::LoanManagement));
    }
}
