//! # Collateral Ledger
//!
//! Simulation of an asset-backed lending system built from four cooperating
//! contracts over one shared in-memory storage:
//!
//! - **asset-registration**: asset records, ownership and pledge status
//! - **lender-verification**: owner-curated registry of licensed lenders
//! - **loan-management**: loan origination, repayment and closure
//! - **collateral-monitoring**: pledge records and condition inspections
//!
//! Contracts are stateless handles; every operation receives the storage and
//! an explicit [`TxContext`] (sender, contract owner, calling contract, block
//! height). The [`Environment`] owns both and is the entry point for drivers.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use collateral_ledger::{Call, Environment, Principal};
//!
//! let mut env = Environment::new();
//! env.set_contract_owner("admin");
//! env.set_tx_sender("admin");
//! let response = env.call(
//!     "lender-verification",
//!     Call::RegisterLender {
//!         lender: Principal::from("bank"),
//!         name: "Bank".to_string(),
//!         license_id: "L-1".to_string(),
//!     },
//! );
//! assert!(response.success);
//! ```

pub mod config;
pub mod context;
pub mod contracts;
pub mod dispatch;
pub mod environment;
pub mod error;
pub mod fixtures;
pub mod invariants;
pub mod registry;
pub mod storage;

pub use context::{Principal, TxContext};
pub use contracts::{Contract, ContractName, LedgerStorage};
pub use dispatch::{Call, CallResponse};
pub use environment::Environment;
pub use error::{ContractError, ContractResult};
pub use invariants::{check_ledger, Violation};
pub use registry::ContractRegistry;
pub use storage::MemoryStorage;
