// Dynamic call surface
//
// `Call` names one contract operation with its arguments and is what
// fixtures and the replay tool speak. `Contract::invoke` routes it to the
// typed operation and `CallResponse` carries the tagged outcome:
//
//   { "success": true, "value": ... }   value omitted for operations without one
//   { "success": false, "error": 403 }

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::{Principal, TxContext};
use crate::contracts::{
    AssetId, AssetStatus, Contract, ContractName, InspectionId, LedgerStorage, LoanId, LoanTerms,
    NewAsset,
};
use crate::error::{ContractError, ContractResult};

/// One contract operation with its arguments
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "operation",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Call {
    // asset-registration
    RegisterAsset(NewAsset),
    GetAsset {
        asset_id: AssetId,
    },
    UpdateAssetStatus {
        asset_id: AssetId,
        new_status: AssetStatus,
    },
    TransferAsset {
        asset_id: AssetId,
        new_owner: Principal,
    },

    // lender-verification
    RegisterLender {
        lender: Principal,
        name: String,
        license_id: String,
    },
    GetLenderData {
        lender: Principal,
    },
    IsVerifiedLender {
        lender: Principal,
    },
    DeactivateLender {
        lender: Principal,
    },
    ReactivateLender {
        lender: Principal,
    },

    // loan-management
    CreateLoan(LoanTerms),
    GetLoan {
        loan_id: LoanId,
    },
    MakePayment {
        loan_id: LoanId,
        amount: u64,
    },
    GetPayment {
        loan_id: LoanId,
        payment_number: u64,
    },
    CloseLoan {
        loan_id: LoanId,
    },

    // collateral-monitoring
    RegisterCollateral {
        asset_id: AssetId,
        loan_id: LoanId,
    },
    GetCollateral {
        asset_id: AssetId,
    },
    RecordInspection {
        asset_id: AssetId,
        condition: String,
        notes: String,
    },
    GetInspection {
        asset_id: AssetId,
        inspection_id: InspectionId,
    },
    ReleaseCollateral {
        asset_id: AssetId,
    },
    GetInspectionCount {
        asset_id: AssetId,
    },
}

impl Call {
    /// The contract exposing this operation
    pub fn contract(&self) -> ContractName {
        match self {
            Self::RegisterAsset(_)
            | Self::GetAsset { .. }
            | Self::UpdateAssetStatus { .. }
            | Self::TransferAsset { .. } => ContractName::AssetRegistration,
            Self::RegisterLender { .. }
            | Self::GetLenderData { .. }
            | Self::IsVerifiedLender { .. }
            | Self::DeactivateLender { .. }
            | Self::ReactivateLender { .. } => ContractName::LenderVerification,
            Self::CreateLoan(_)
            | Self::GetLoan { .. }
            | Self::MakePayment { .. }
            | Self::GetPayment { .. }
            | Self::CloseLoan { .. } => ContractName::LoanManagement,
            Self::RegisterCollateral { .. }
            | Self::GetCollateral { .. }
            | Self::RecordInspection { .. }
            | Self::GetInspection { .. }
            | Self::ReleaseCollateral { .. }
            | Self::GetInspectionCount { .. } => ContractName::CollateralMonitoring,
        }
    }

    /// Operation name as it appears on the wire
    pub fn operation(&self) -> &'static str {
        match self {
            Self::RegisterAsset(_) => "registerAsset",
            Self::GetAsset { .. } => "getAsset",
            Self::UpdateAssetStatus { .. } => "updateAssetStatus",
            Self::TransferAsset { .. } => "transferAsset",
            Self::RegisterLender { .. } => "registerLender",
            Self::GetLenderData { .. } => "getLenderData",
            Self::IsVerifiedLender { .. } => "isVerifiedLender",
            Self::DeactivateLender { .. } => "deactivateLender",
            Self::ReactivateLender { .. } => "reactivateLender",
            Self::CreateLoan(_) => "createLoan",
            Self::GetLoan { .. } => "getLoan",
            Self::MakePayment { .. } => "makePayment",
            Self::GetPayment { .. } => "getPayment",
            Self::CloseLoan { .. } => "closeLoan",
            Self::RegisterCollateral { .. } => "registerCollateral",
            Self::GetCollateral { .. } => "getCollateral",
            Self::RecordInspection { .. } => "recordInspection",
            Self::GetInspection { .. } => "getInspection",
            Self::ReleaseCollateral { .. } => "releaseCollateral",
            Self::GetInspectionCount { .. } => "getInspectionCount",
        }
    }
}

/// Tagged outcome of a contract call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<u16>,
}

impl CallResponse {
    pub fn ok(value: Option<Value>) -> Self {
        Self {
            success: true,
            value,
            error: None,
        }
    }

    pub fn err(error: ContractError) -> Self {
        Self {
            success: false,
            value: None,
            error: Some(error.code()),
        }
    }

    /// The failure as a typed error, if this is a failure with a known code
    pub fn contract_error(&self) -> Option<ContractError> {
        self.error.and_then(ContractError::from_code)
    }
}

impl From<ContractResult<Option<Value>>> for CallResponse {
    fn from(result: ContractResult<Option<Value>>) -> Self {
        match result {
            Ok(value) => Self::ok(value),
            Err(error) => Self::err(error),
        }
    }
}

// Unit results carry no value
fn encode<T: Serialize>(value: T) -> Option<Value> {
    match serde_json::to_value(value) {
        Ok(Value::Null) | Err(_) => None,
        Ok(value) => Some(value),
    }
}

impl Contract {
    /// Route `call` to this contract's typed operation.
    /// Operations this contract does not expose fail with `NotFound`.
    pub fn invoke<S: LedgerStorage + ?Sized>(
        &self,
        storage: &mut S,
        ctx: &TxContext,
        call: Call,
    ) -> ContractResult<Option<Value>> {
        match self {
            Self::AssetRegistry(assets) => match call {
                Call::RegisterAsset(params) => {
                    assets.register_asset(storage, ctx, params).map(encode)
                }
                Call::GetAsset { asset_id } => assets.get_asset(storage, asset_id).map(encode),
                Call::UpdateAssetStatus {
                    asset_id,
                    new_status,
                } => assets
                    .update_asset_status(storage, ctx, asset_id, new_status)
                    .map(encode),
                Call::TransferAsset {
                    asset_id,
                    new_owner,
                } => assets
                    .transfer_asset(storage, ctx, asset_id, &new_owner)
                    .map(encode),
                _ => Err(ContractError::NotFound),
            },
            Self::LenderVerification(lenders) => match call {
                Call::RegisterLender {
                    lender,
                    name,
                    license_id,
                } => lenders
                    .register_lender(storage, ctx, &lender, &name, &license_id)
                    .map(encode),
                Call::GetLenderData { lender } => {
                    lenders.get_lender_data(storage, &lender).map(encode)
                }
                Call::IsVerifiedLender { lender } => {
                    lenders.is_verified_lender(storage, &lender).map(encode)
                }
                Call::DeactivateLender { lender } => lenders
                    .deactivate_lender(storage, ctx, &lender)
                    .map(encode),
                Call::ReactivateLender { lender } => lenders
                    .reactivate_lender(storage, ctx, &lender)
                    .map(encode),
                _ => Err(ContractError::NotFound),
            },
            Self::LoanManagement(loans) => match call {
                Call::CreateLoan(terms) => loans.create_loan(storage, ctx, terms).map(encode),
                Call::GetLoan { loan_id } => loans.get_loan(storage, loan_id).map(encode),
                Call::MakePayment { loan_id, amount } => loans
                    .make_payment(storage, ctx, loan_id, amount)
                    .map(encode),
                Call::GetPayment {
                    loan_id,
                    payment_number,
                } => loans
                    .get_payment(storage, loan_id, payment_number)
                    .map(encode),
                Call::CloseLoan { loan_id } => {
                    loans.close_loan(storage, ctx, loan_id).map(encode)
                }
                _ => Err(ContractError::NotFound),
            },
            Self::CollateralMonitoring(collateral) => match call {
                Call::RegisterCollateral { asset_id, loan_id } => collateral
                    .register_collateral(storage, ctx, asset_id, loan_id)
                    .map(encode),
                Call::GetCollateral { asset_id } => {
                    collateral.get_collateral(storage, asset_id).map(encode)
                }
                Call::RecordInspection {
                    asset_id,
                    condition,
                    notes,
                } => collateral
                    .record_inspection(storage, ctx, asset_id, &condition, &notes)
                    .map(encode),
                Call::GetInspection {
                    asset_id,
                    inspection_id,
                } => collateral
                    .get_inspection(storage, asset_id, inspection_id)
                    .map(encode),
                Call::ReleaseCollateral { asset_id } => collateral
                    .release_collateral(storage, ctx, asset_id)
                    .map(encode),
                Call::GetInspectionCount { asset_id } => collateral
                    .get_inspection_count(storage, asset_id)
                    .map(encode),
                _ => Err(ContractError::NotFound),
            },
        }
    }
}
