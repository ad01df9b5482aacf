// Lending contracts - Error Codes
//
// The numeric codes are part of the external contract surface and must stay
// stable:
// - 400: invalid state or sequence
// - 401: lender is not verified
// - 403: wrong identity or wrong calling contract
// - 404: record (or contract, or operation) not found

use thiserror::Error;

/// Contract operation result type
pub type ContractResult<T> = Result<T, ContractError>;

/// Contract error type with numeric code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[repr(u16)]
pub enum ContractError {
    #[error("Invalid state")]
    InvalidState = 400,

    #[error("Lender is not verified")]
    UnverifiedLender = 401,

    #[error("Unauthorized")]
    Unauthorized = 403,

    #[error("Not found")]
    NotFound = 404,
}

impl ContractError {
    /// Get the numeric error code
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Convert from a numeric error code
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            400 => Some(Self::InvalidState),
            401 => Some(Self::UnverifiedLender),
            403 => Some(Self::Unauthorized),
            404 => Some(Self::NotFound),
            _ => None,
        }
    }
}
