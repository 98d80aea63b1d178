pub mod db;

pub mod accounts;
pub mod budgets;
pub mod categories;
pub mod debts;
pub mod errors;
pub mod goals;
pub mod ledger;
pub mod recurring;
pub mod reports;
pub mod schema;
pub mod utils;
pub mod wagers;

#[cfg(test)]
mod test_utils;

pub use errors::Error;
pub use errors::Result;
