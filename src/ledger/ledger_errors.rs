use diesel::result::Error as DieselError;
use thiserror::Error;

/// Custom error type for ledger operations.
///
/// Validation variants are raised before any mutation begins; they describe
/// the offending field so callers can surface them as user-correctable.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("amount: {0}")]
    InvalidAmount(String),
    #[error("destination_account: {0}")]
    InvalidDestination(String),
    #[error("category: {0}")]
    CategoryMismatch(String),
    #[error("category: {0}")]
    CategoryNotVisible(String),
    #[error("line_items: {0}")]
    LineItemMismatch(String),
    #[error("Wager-managed entry: {0}")]
    WagerManaged(String),
}

impl From<DieselError> for LedgerError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => LedgerError::NotFound("Record not found".to_string()),
            _ => LedgerError::DatabaseError(err.to_string()),
        }
    }
}

impl From<LedgerError> for String {
    fn from(error: LedgerError) -> Self {
        error.to_string()
    }
}
