// Lending contracts
//
// Four contracts share one storage and one transaction context:
// - asset: asset registry (ownership and pledge status)
// - lender: lender verification (owner-curated registry)
// - loan: loan management (origination, repayment, closure)
// - collateral: collateral monitoring (pledges and inspections)
//
// Contracts are stateless handles. All state lives behind the storage
// traits, so operations can run against any backend implementing them.

pub mod asset;
pub mod collateral;
pub mod lender;
pub mod loan;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

pub use asset::{Asset, AssetId, AssetRegistry, AssetStatus, AssetStorage, NewAsset};
pub use collateral::{
    Collateral, CollateralMonitoring, CollateralStatus, CollateralStorage, Inspection,
    InspectionId,
};
pub use lender::{LenderRecord, LenderStorage, LenderVerification};
pub use loan::{
    Loan, LoanId, LoanManagement, LoanStatus, LoanStorage, LoanTerms, Payment, PaymentStatus,
};

use crate::error::{ContractError, ContractResult};

/// Names under which contracts are registered and attributed as callers
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ContractName {
    AssetRegistration,
    LenderVerification,
    LoanManagement,
    CollateralMonitoring,
}

impl ContractName {
    /// Parse a contract name, failing with `NotFound` for unknown contracts
    pub fn parse(name: &str) -> ContractResult<Self> {
        name.parse().map_err(|_| ContractError::NotFound)
    }
}

/// Storage able to back every contract
pub trait LedgerStorage: AssetStorage + LenderStorage + LoanStorage + CollateralStorage {}

impl<T> LedgerStorage for T where
    T: AssetStorage + LenderStorage + LoanStorage + CollateralStorage + ?Sized
{
}

/// Handle to one of the lending contracts
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Contract {
    AssetRegistry(AssetRegistry),
    LenderVerification(LenderVerification),
    LoanManagement(LoanManagement),
    CollateralMonitoring(CollateralMonitoring),
}

impl Contract {
    /// The contract with its default wiring
    pub fn standard(name: ContractName) -> Self {
        match name {
            ContractName::AssetRegistration => Self::AssetRegistry(AssetRegistry::default()),
            ContractName::LenderVerification => {
                Self::LenderVerification(LenderVerification::new())
            }
            ContractName::LoanManagement => Self::LoanManagement(LoanManagement::default()),
            ContractName::CollateralMonitoring => {
                Self::CollateralMonitoring(CollateralMonitoring::default())
            }
        }
    }

    pub fn name(&self) -> ContractName {
        match self {
            Self::AssetRegistry(_) => ContractName::AssetRegistration,
            Self::LenderVerification(_) => ContractName::LenderVerification,
            Self::LoanManagement(_) => ContractName::LoanManagement,
            Self::CollateralMonitoring(_) => ContractName::CollateralMonitoring,
        }
    }

    pub fn as_asset_registry(&self) -> Option<&AssetRegistry> {
        match self {
            Self::AssetRegistry(contract) => Some(contract),
            _ => None,
        }
    }

    pub fn as_lender_verification(&self) -> Option<&LenderVerification> {
        match self {
            Self::LenderVerification(contract) => Some(contract),
            _ => None,
        }
    }

    pub fn as_loan_management(&self) -> Option<&LoanManagement> {
        match self {
            Self::LoanManagement(contract) => Some(contract),
            _ => None,
        }
    }

    pub fn as_collateral_monitoring(&self) -> Option<&CollateralMonitoring> {
        match self {
            Self::CollateralMonitoring(contract) => Some(contract),
            _ => None,
        }
    }
}

impl From<AssetRegistry> for Contract {
    fn from(contract: AssetRegistry) -> Self {
        Self::AssetRegistry(contract)
    }
}

impl From<LenderVerification> for Contract {
    fn from(contract: LenderVerification) -> Self {
        Self::LenderVerification(contract)
    }
}

impl From<LoanManagement> for Contract {
    fn from(contract: LoanManagement) -> Self {
        Self::LoanManagement(contract)
    }
}

impl From<CollateralMonitoring> for Contract {
    fn from(contract: CollateralMonitoring) -> Self {
        Self::CollateralMonitoring(contract)
    }
}
